// src/main.rs
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};

use apolo_air_gateway::api;
use apolo_air_gateway::config::Config;
use apolo_air_gateway::gateway::{spawn_stats_reporter, AirGateway};
use apolo_air_gateway::provider::StaticNodeProvider;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("🚀 Starting Apolo AIR Gateway (Rust)");

    // Load configuration
    let config = Config::from_env()?;

    info!("Environment: {}", config.environment);

    let provider = Arc::new(StaticNodeProvider::new(config.air_nodes.clone()));
    let gateway = Arc::new(AirGateway::new(config.gateway_settings(), provider));

    // Sin nodos el servicio arranca igual y responde 503 hasta un /admin/reload
    if let Err(e) = gateway.initialize().await {
        error!("AIR gateway initialization failed: {}", e);
    }

    let reporter = config
        .stats_report_interval()
        .map(|every| spawn_stats_reporter(gateway.clone(), every));

    if reporter.is_some() {
        info!("✅ Stats reporter started");
    } else {
        info!("⚠️  Stats reporter disabled");
    }

    // HTTP Server
    let bind_address = config.bind_address();
    info!("🌐 Starting HTTP server on {}", bind_address);

    let app_gateway = gateway.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(web::Data::new(app_gateway.clone()))
            .configure(api::routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    if let Some(handle) = reporter {
        handle.abort();
    }
    gateway.shutdown().await;

    Ok(())
}
