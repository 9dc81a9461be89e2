use crate::output::{self, OutputFormat};
use crate::ConfigCommands;
use anyhow::Result;
use sherlock_common::SherlockConfig;

pub fn handle_config_command(
    command: ConfigCommands,
    config: &SherlockConfig,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Sample => {
            print!("{}", SherlockConfig::generate_sample());
        }
        ConfigCommands::Show => match format {
            OutputFormat::Table => print!("{}", toml::to_string_pretty(config)?),
            OutputFormat::Json => output::print_json(config)?,
            OutputFormat::Yaml => output::print_yaml(config)?,
        },
        ConfigCommands::Check => {
            config.validate()?;
            output::print_success(&format!(
                "Configuration is valid ({} allowed broker(s))",
                config.druid.valid_brokers.len()
            ));
            if config.druid.valid_brokers.is_empty() {
                output::print_info("No brokers are allowed until druid.valid_brokers is set");
            }
        }
    }

    Ok(())
}
