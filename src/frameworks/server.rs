// Framework bootstrap for the room server runtime.

use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::frameworks::config;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{
    AppState, InMemoryRoomRegistry, PreferredCellSelector, SolutionListJudge, SystemClock,
};
use crate::use_cases::{EngineSettings, SessionEngine};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();
    let app = routes::app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking.
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling.
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    let settings = EngineSettings {
        countdown: config::countdown(),
        sync_tolerance_ms: config::sync_tolerance_ms(),
        reveal_delay: config::reveal_delay(),
        retry_delay: config::retry_delay(),
        opponent_delay: config::opponent_delay(),
        auto_advance_delay: config::auto_advance_delay(),
        chat_capacity: config::chat_capacity(),
        chat_max_len: config::chat_max_len(),
    };
    let solutions = config::solutions();
    tracing::debug!(
        rounds = solutions.len(),
        countdown_ms = settings.countdown.as_millis(),
        sync_tolerance_ms = settings.sync_tolerance_ms,
        "engine configured"
    );

    let engine = SessionEngine::new(
        Arc::new(InMemoryRoomRegistry::new(settings.chat_capacity)),
        Arc::new(SystemClock),
        Arc::new(SolutionListJudge::new(solutions)),
        Arc::new(PreferredCellSelector),
        settings,
    );

    Arc::new(AppState { engine })
}
