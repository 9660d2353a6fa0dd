use std::{net::SocketAddr, path::Path};

use anyhow::Context;
use axum::{extract::Request, middleware, ServiceExt};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

use crate::{
    config::DevLoggerConfig,
    error::ConfigError,
    middleware::dev_logger::DevLoggerLayer,
    route::demo::{app, demo_middleware},
};

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub socket_address: SocketAddr,
    #[serde(default)]
    pub dev_logger: DevLoggerConfig,
}

impl ServerConfig {
    pub fn new(socket_address: SocketAddr, dev_logger: DevLoggerConfig) -> Self {
        Self {
            socket_address,
            dev_logger,
        }
    }

    pub async fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path).await?;

        Ok(serde_yaml::from_str(&contents)?)
    }
}

pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let router = app().layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );

        // Outside the router so the demo middleware can rewrite before routing.
        let app = DevLoggerLayer::new(self.config.dev_logger)
            .layer(middleware::from_fn(demo_middleware).layer(router));

        tracing::info!(addr = %self.config.socket_address, "Starting server");

        let listener = TcpListener::bind(&self.config.socket_address)
            .await
            .context("Bind failed")?;

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server failed")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");

        tracing::info!("CTRL+C received");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;

        tracing::info!("SIGTERM received");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
