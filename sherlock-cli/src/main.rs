///! Sherlock CLI
///!
///! Command-line front end for checking Druid cluster descriptors

mod commands;
mod logging;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use output::OutputFormat;
use sherlock_common::{ClusterDescriptor, SherlockConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to $SHERLOCK_CONFIG, /etc/sherlock/config.toml, ./sherlock.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check Druid cluster descriptors
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ClusterCommands {
    /// Validate a descriptor and print its normalized form
    Validate(ClusterArgs),
    /// Print the base and broker URLs of a descriptor
    Urls(ClusterArgs),
    /// Probe the broker of a descriptor
    Status {
        #[command(flatten)]
        cluster: ClusterArgs,
        /// Probe timeout in milliseconds (defaults to the configured timeout)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Check whether a broker is in the configured allow-list
    Allowed {
        /// Broker host
        #[arg(long)]
        host: String,
        /// Broker port
        #[arg(short, long)]
        port: i32,
    },
    /// Fill in a descriptor interactively
    New,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print a sample configuration file
    Sample,
    /// Print the effective configuration
    Show,
    /// Validate the effective configuration
    Check,
}

/// Descriptor fields. Anything left out stays unset.
#[derive(Args, Debug, Clone, Default)]
struct ClusterArgs {
    /// Cluster ID
    #[arg(long)]
    id: Option<i32>,
    /// Cluster name
    #[arg(short, long)]
    name: Option<String>,
    /// Cluster description
    #[arg(short, long)]
    description: Option<String>,
    /// Broker host
    #[arg(long)]
    host: Option<String>,
    /// Broker port
    #[arg(short, long, allow_negative_numbers = true)]
    port: Option<i32>,
    /// Broker endpoint path, e.g. druid/v2
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Hours of lag applied to queries against this cluster
    #[arg(long, allow_negative_numbers = true)]
    hours_of_lag: Option<i32>,
    /// Authenticate with SSL
    #[arg(long)]
    ssl: bool,
    /// Principal used for SSL authentication
    #[arg(long)]
    principal: Option<String>,
}

impl ClusterArgs {
    fn into_descriptor(self) -> ClusterDescriptor {
        let mut cluster = ClusterDescriptor::default();
        cluster.set_id(self.id);
        if let Some(name) = self.name {
            cluster.set_name(name);
        }
        if let Some(description) = self.description {
            cluster.set_description(description);
        }
        if let Some(host) = self.host {
            cluster.set_broker_host(host);
        }
        if let Some(port) = self.port {
            cluster.set_broker_port(port);
        }
        if let Some(endpoint) = self.endpoint {
            cluster.set_broker_endpoint(endpoint);
        }
        if let Some(hours) = self.hours_of_lag {
            cluster.set_hours_of_lag(hours);
        }
        cluster.set_use_ssl_auth(self.ssl);
        if let Some(principal) = self.principal {
            cluster.set_principal_name(principal);
        }
        cluster
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, skipped) = match cli.config {
        Some(ref path) => (SherlockConfig::load_with_file(path)?, None),
        None => SherlockConfig::load(),
    };

    let _log_guard = logging::init(&config.logging)?;

    if let Some(e) = skipped {
        tracing::warn!(error = %e, "Ignoring config file, using defaults");
    }

    match cli.command {
        Commands::Cluster { command } => {
            commands::cluster::handle_cluster_command(command, &config, cli.output).await?
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(command, &config, cli.output)?
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
