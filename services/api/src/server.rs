use crate::cli::ServeArgs;
use crate::infra::{load_verifier, register_principals, AppState};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobboard::config::AppConfig;
use jobboard::notifications::spawn_dispatcher;
use jobboard::telemetry;
use jobboard::{AppError, Board, MemoryStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(accounts) = args.accounts.take() {
        config.auth.accounts_file = Some(accounts);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryStore::new());
    let verifier = load_verifier(config.auth.accounts_file.as_deref())?;
    let principals = register_principals(&store, &verifier)?;

    let (notifier, dispatcher) = spawn_dispatcher(store.clone(), &config.notifications);
    let board = Board::new(store, Arc::new(notifier));

    let app = with_board_routes(&board, Arc::new(verifier))
        .layer(Extension(app_state))
        .layer(prometheus_layer);
    drop(board);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, principals, "job board api ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match dispatcher.await {
        Ok(totals) => info!(
            delivered = totals.delivered,
            failed = totals.failed,
            dropped = totals.dropped,
            "notification dispatcher drained"
        ),
        Err(err) => warn!(error = %err, "notification dispatcher did not shut down cleanly"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
