mod config;
mod engine;
mod errors;
mod models;
mod server;
mod state;

use crate::state::{AppState, EngineEvent};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("greeks_surface starting");

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        spot = cfg.defaults.spot,
        strike = cfg.defaults.strike,
        rate = cfg.defaults.risk_free_rate,
        ttm = cfg.defaults.time_to_maturity,
        vol = cfg.defaults.volatility,
        "default parameters"
    );

    let (engine_tx, engine_rx) = mpsc::channel::<EngineEvent>(256);
    let app_state = AppState::new(cfg.clone(), engine_tx.clone());

    // Engine task: sole owner of the current parameter set
    let engine_state = app_state.clone();
    let engine_handle = tokio::spawn(async move {
        engine::run_engine(engine_state, engine_rx).await;
    });

    let app = server::router(app_state);
    let addr = format!("0.0.0.0:{}", cfg.server_port);
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("signal handler error: {e}");
        }
        tracing::info!("ctrl-c received");
    };

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        tracing::error!("server error: {e}");
    }

    let _ = engine_tx.send(EngineEvent::Shutdown).await;
    let _ = engine_handle.await;
}
