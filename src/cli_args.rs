use clap::Parser;

#[derive(Parser)]
#[command(author, about, version)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[clap(long, env = "CONFIG_FILE", default_value = "config.yaml")]
    pub config_file: String,

    /// Overrides `dev_logger.enabled` from the configuration file.
    #[clap(long, env = "DEV_LOGGER_ENABLED")]
    pub dev_logger_enabled: Option<bool>,

    /// Overrides `dev_logger.warn_threshold` from the configuration file.
    #[clap(long, env = "DEV_LOGGER_WARN_THRESHOLD")]
    pub warn_threshold: Option<usize>,
}
