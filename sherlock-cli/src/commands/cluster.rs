use crate::output::{self, OutputFormat};
use crate::{ClusterArgs, ClusterCommands};
use anyhow::Result;
use serde::Serialize;
use sherlock_common::{ClusterDescriptor, ClusterStatus, Error, SherlockConfig};
use std::time::Duration;
use tabled::Tabled;

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "BROKER")]
    broker_url: String,
    #[tabled(rename = "LAG (H)")]
    hours_of_lag: i32,
    #[tabled(rename = "SSL")]
    ssl: String,
    #[tabled(rename = "PRINCIPAL")]
    principal: String,
}

impl From<&ClusterDescriptor> for ClusterRow {
    fn from(c: &ClusterDescriptor) -> Self {
        Self {
            id: c.id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            name: c.name().to_string(),
            description: output::or_dash(c.description().unwrap_or_default()),
            broker_url: c.broker_url(),
            hours_of_lag: c.hours_of_lag(),
            ssl: if c.use_ssl_auth() { "yes" } else { "no" }.to_string(),
            principal: output::or_dash(c.principal_name()),
        }
    }
}

#[derive(Serialize, Tabled)]
struct UrlsRow {
    #[tabled(rename = "BASE URL")]
    base_url: String,
    #[tabled(rename = "BROKER URL")]
    broker_url: String,
}

#[derive(Serialize, Tabled)]
struct StatusRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "STATUS")]
    status: ClusterStatus,
}

#[derive(Serialize, Tabled)]
struct AllowedRow {
    #[tabled(rename = "BROKER")]
    broker: String,
    #[tabled(rename = "ALLOWED")]
    allowed: bool,
}

pub async fn handle_cluster_command(
    command: ClusterCommands,
    config: &SherlockConfig,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ClusterCommands::Validate(args) => {
            let cluster = validated(args)?;
            print_cluster(&cluster, format)?;
            if format == OutputFormat::Table {
                output::print_success(&format!("Cluster '{}' is valid", cluster.name()));
            }
        }
        ClusterCommands::Urls(args) => {
            let cluster = validated(args)?;
            let row = UrlsRow {
                base_url: cluster.base_url(),
                broker_url: cluster.broker_url(),
            };
            output::print_single(row, format)?;
        }
        ClusterCommands::Status { cluster, timeout_ms } => {
            let cluster = validated(cluster)?;
            let timeout = timeout_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.probe_timeout());
            let status = probe_with_spinner(&cluster, timeout, format).await;

            let row = StatusRow {
                name: cluster.name().to_string(),
                url: cluster.base_url(),
                status,
            };
            output::print_single(row, format)?;
        }
        ClusterCommands::Allowed { host, port } => {
            config.validate()?;
            let allow_list = config.allow_list();
            if allow_list.is_empty() && format == OutputFormat::Table {
                output::print_warning("No valid brokers configured (set druid.valid_brokers)");
            }

            let mut cluster = ClusterDescriptor::default();
            cluster.set_broker_host(host.as_str());
            cluster.set_broker_port(port);

            let row = AllowedRow {
                broker: format!("{}:{}", host, port),
                allowed: cluster.is_allowed_broker(&allow_list),
            };
            output::print_single(row, format)?;
        }
        ClusterCommands::New => {
            let cluster = prompt_cluster()?;
            print_cluster(&cluster, format)?;

            let check = dialoguer::Confirm::new()
                .with_prompt("Check broker status now?")
                .default(true)
                .interact()?;
            if check {
                let status = probe_with_spinner(&cluster, config.probe_timeout(), format).await;
                match status {
                    ClusterStatus::Ok => output::print_success(&format!("Broker {} is reachable", cluster.base_url())),
                    ClusterStatus::Error => output::print_error(&format!("Broker {} is unreachable", cluster.base_url())),
                }
            }
        }
    }

    Ok(())
}

fn validated(args: ClusterArgs) -> Result<ClusterDescriptor, Error> {
    let mut cluster = args.into_descriptor();
    cluster.validate()?;
    Ok(cluster)
}

fn print_cluster(cluster: &ClusterDescriptor, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => output::print_table(vec![ClusterRow::from(cluster)]),
        OutputFormat::Json => output::print_json(cluster)?,
        OutputFormat::Yaml => output::print_yaml(cluster)?,
    }
    Ok(())
}

async fn probe_with_spinner(
    cluster: &ClusterDescriptor,
    timeout: Duration,
    format: OutputFormat,
) -> ClusterStatus {
    if format != OutputFormat::Table {
        return cluster.status_with_timeout(timeout).await;
    }

    use indicatif::{ProgressBar, ProgressStyle};
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Probing {}...", cluster.base_url()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let status = cluster.status_with_timeout(timeout).await;

    spinner.finish_and_clear();
    status
}

/// Prompt for every field, re-prompting with the previous answers until the
/// descriptor validates.
fn prompt_cluster() -> Result<ClusterDescriptor> {
    use dialoguer::{Confirm, Input};

    let mut cluster = ClusterDescriptor::default();
    loop {
        let name: String = Input::new()
            .with_prompt("Cluster name")
            .with_initial_text(cluster.name())
            .allow_empty(true)
            .interact_text()?;
        cluster.set_name(name);

        let description: String = Input::new()
            .with_prompt("Description")
            .with_initial_text(cluster.description().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        cluster.set_description(description);

        let host: String = Input::new()
            .with_prompt("Broker host")
            .with_initial_text(cluster.broker_host())
            .allow_empty(true)
            .interact_text()?;
        cluster.set_broker_host(host);

        let port: i32 = Input::new()
            .with_prompt("Broker port")
            .default(cluster.broker_port().unwrap_or(8082))
            .interact_text()?;
        cluster.set_broker_port(port);

        let endpoint: String = Input::new()
            .with_prompt("Broker endpoint")
            .with_initial_text(if cluster.broker_endpoint().is_empty() {
                "druid/v2"
            } else {
                cluster.broker_endpoint()
            })
            .allow_empty(true)
            .interact_text()?;
        cluster.set_broker_endpoint(endpoint);

        let hours: i32 = Input::new()
            .with_prompt("Hours of lag")
            .default(cluster.hours_of_lag())
            .interact_text()?;
        cluster.set_hours_of_lag(hours);

        let ssl = Confirm::new()
            .with_prompt("Use SSL authentication?")
            .default(cluster.use_ssl_auth())
            .interact()?;
        cluster.set_use_ssl_auth(ssl);

        if ssl {
            let principal: String = Input::new()
                .with_prompt("Principal name")
                .with_initial_text(cluster.principal_name())
                .allow_empty(true)
                .interact_text()?;
            cluster.set_principal_name(principal);
        }

        match cluster.validate() {
            Ok(()) => return Ok(cluster),
            Err(e) => output::print_error(&e.to_string()),
        }
    }
}
