use std::path::Path;

use gapcert_core::config::GapcertConfig;
use gapcert_server::{http, state};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match GapcertConfig::load(Path::new(".")) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("STARTUP_ERROR {err}");
            std::process::exit(1);
        }
    };

    let app_state = match state::AppState::new(&config) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("STARTUP_ERROR {err}");
            std::process::exit(1);
        }
    };

    let app = http::router(app_state);

    let listener = match tokio::net::TcpListener::bind(config.server.bind_addr()).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("STARTUP_ERROR failed to bind {}: {err}", config.server.bind_addr());
            std::process::exit(1);
        }
    };

    tracing::info!(bind_addr = config.server.bind_addr(), "gapcert-server listening");

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("STARTUP_ERROR server failed: {err}");
        std::process::exit(1);
    }
}
