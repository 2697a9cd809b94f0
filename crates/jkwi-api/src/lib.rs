//! # jkwi-api: HTTP API for JKWI Records
//!
//! A thin Axum layer over [`RecordEngine`](jkwi_records::RecordEngine).
//! Every handler checks the caller's role, parses path segments into
//! validated identifiers, and runs the engine call on the blocking pool.
//!
//! ## API Surface
//!
//! | Prefix                  | Module                   | Minimum role |
//! |-------------------------|--------------------------|--------------|
//! | `/v1/partitions*`       | [`routes::partitions`]   | member / director / admin |
//! | `/v1/import`            | [`routes::partitions`]   | admin        |
//! | `/v1/records/*`         | [`routes::records`]      | member / director / admin |
//! | `/v1/search`            | [`routes::search`]       | member       |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → AuthMiddleware → BodyLimit → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Maximum accepted request body. Import bundles carry whole partitions.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::partitions::router())
        .merge(routes::records::router())
        .merge(routes::search::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new()
        .merge(health)
        .merge(api)
        .layer(CorsLayer::permissive())
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the store can be scanned for partitions.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match routes::run_engine(&state, |engine| engine.partitions()).await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "not ready")
        }
    }
}
