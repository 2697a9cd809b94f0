//! # Search API
//!
//! **POST `/v1/search`** (member). The body maps dotted field paths to
//! expected values:
//!
//! ```json
//! {"jkwi_info.status": "Active", "member_info.full_name": "smith"}
//! ```
//!
//! String values match by case-insensitive substring, all others by
//! equality. An empty object returns every live record.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use jkwi_records::SearchQuery;
use serde_json::Value;

use super::run_engine;
use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Build the search router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/search", post(search))
}

/// POST /v1/search
async fn search(
    caller: CallerIdentity,
    State(state): State<AppState>,
    body: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    require_role(&caller, Role::Member)?;
    let query = extract_json(body)?;
    let results = run_engine(&state, move |engine| engine.search(&query)).await?;
    Ok(Json(results))
}
