use anyhow::Context;
use clap::Parser;
use middleware_dev_logger::{
    cli_args::CliArgs,
    server::{Server, ServerConfig},
};

fn init_tracing() -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .finish(),
    )
    .context("Failed to set global tracing subscriber")?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var(
            "RUST_LOG",
            "server=trace,middleware_dev_logger=debug,tower_http=info",
        );
    }

    init_tracing()?;

    let cli_args = CliArgs::parse();

    tracing::info!(config_file = %cli_args.config_file, "Starting ...");

    let mut server_config = ServerConfig::from_config_file(&cli_args.config_file)
        .await
        .context("Failed to load config file")?;

    if let Some(enabled) = cli_args.dev_logger_enabled {
        server_config.dev_logger = server_config.dev_logger.with_enabled(enabled);
    }

    if let Some(warn_threshold) = cli_args.warn_threshold {
        server_config.dev_logger = server_config.dev_logger.with_warn_threshold(warn_threshold);
    }
    let server = Server::new(server_config);

    server.run().await?;

    Ok(())
}
