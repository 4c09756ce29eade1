use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use media_backend::{
    constants::START_TIME,
    graceful_shutdown::shutdown_signal,
    handlers::upload::multipart_config,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let production = std::env::var("APP_ENV")
        .map(|env| env.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    if production {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    once_cell::sync::Lazy::force(&START_TIME);

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tokio::fs::create_dir_all(&config.storage_root)
        .await
        .with_context(|| format!("creating storage root {}", config.storage_root.display()))?;

    let app_state = web::Data::new(AppState::new(&config));
    if config.is_production() && app_state.access_guard.allows_all() {
        tracing::warn!("Referer check is disabled (*) in production");
    }

    let upload_limit = config.max_upload_bytes;
    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {} (storage: {})",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.storage_root.display()
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(multipart_config(upload_limit))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count.max(1))
    .bind(&server_addr)
    .with_context(|| format!("binding {}", server_addr))?
    .run();

    tokio::select! {
        res = server => res.context("server terminated with an error")?,
        _ = shutdown_signal() => {}
    }

    tracing::info!("Server stopped");
    Ok(())
}
