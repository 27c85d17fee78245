//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use voxline_calendar::CalendarClient;
use voxline_core::VoxlineConfig;
use voxline_relay::{MeetingScheduler, SchedulingGate, SessionStore};

/// Shared state for the gateway server.
pub struct AppState {
    pub gate: SchedulingGate,
    /// Shared secret expected in `x-vapi-secret`. Empty disables the check.
    pub webhook_secret: String,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(super::routes::banner))
        .route("/health", get(super::routes::health_check))
        .route("/webhook", post(super::routes::webhook))
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers(Any)
                .max_age(Duration::from_secs(3600));

            // Restrict CORS origins in production via env var
            // Example: VOXLINE_CORS_ORIGINS=https://relay.example.com
            if let Ok(origins_str) = std::env::var("VOXLINE_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(config: &VoxlineConfig) -> anyhow::Result<()> {
    let sessions = Arc::new(SessionStore::new());
    let scheduler: Arc<dyn MeetingScheduler> =
        Arc::new(CalendarClient::new(config.calendar.clone())?);
    let gate = SchedulingGate::new(&config.gate, sessions.clone(), scheduler);

    // Background sweep drops sessions for calls that went silent without a
    // terminal event.
    let ttl = Duration::from_secs(config.gate.session_ttl_secs);
    let sweep_every = Duration::from_secs(config.gate.sweep_secs.max(1));
    let sweep_sessions = sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = sweep_sessions.evict_stale(ttl);
            if evicted > 0 {
                tracing::info!("🧹 Evicted {} stale session(s)", evicted);
            }
        }
    });

    let state = Arc::new(AppState {
        gate,
        webhook_secret: config.server.webhook_secret.clone(),
    });
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Voxline relay listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
