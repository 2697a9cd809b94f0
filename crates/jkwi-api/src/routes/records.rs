//! # Record API
//!
//! - **GET `/v1/records/{id}`**: read a live record (member)
//! - **PUT `/v1/records/{id}`**: deep-merge a partial update (director)
//! - **PUT `/v1/records/{id}/status`**: change lifecycle status (director)
//! - **DELETE `/v1/records/{id}`**: soft delete into the archive (admin)
//! - **GET `/v1/records/{id}/backups`**: list pre-update snapshots (member)
//!
//! The partition is resolved from the identifier's location code.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use jkwi_core::RecordStatus;
use jkwi_records::{BackupSummary, RecordError};
use serde::Deserialize;
use serde_json::Value;

use super::run_engine;
use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_json, parse_record_id};
use crate::state::AppState;

/// Request to change a record's status.
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    /// `Pending`, `Active`, `Inactive` or `Deleted` (case-insensitive).
    pub status: String,
}

/// Build the records router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/records/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/v1/records/{id}/status", put(change_status))
        .route("/v1/records/{id}/backups", get(list_backups))
}

/// GET /v1/records/{id}
async fn get_record(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller, Role::Member)?;
    let id = parse_record_id(&id)?;
    let record = run_engine(&state, move |engine| {
        engine
            .read(&id)?
            .ok_or_else(|| RecordError::RecordNotFound(id.to_string()))
    })
    .await?;
    Ok(Json(record))
}

/// PUT /v1/records/{id}
async fn update_record(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller, Role::Director)?;
    let id = parse_record_id(&id)?;
    let update = extract_json(body)?;
    let record =
        run_engine(&state, move |engine| engine.apply_update(&id, &update, &caller.actor)).await?;
    Ok(Json(record))
}

/// PUT /v1/records/{id}/status
async fn change_status(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller, Role::Director)?;
    let id = parse_record_id(&id)?;
    let req = extract_json(body)?;
    let status: RecordStatus = req.status.parse()?;
    if status == RecordStatus::Deleted {
        require_role(&caller, Role::Admin)?;
    }
    let record =
        run_engine(&state, move |engine| engine.set_status(&id, status, &caller.actor)).await?;
    Ok(Json(record))
}

/// DELETE /v1/records/{id}: returns the archived record.
async fn delete_record(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller, Role::Admin)?;
    let id = parse_record_id(&id)?;
    let archived = run_engine(&state, move |engine| engine.soft_delete(&id, &caller.actor)).await?;
    Ok(Json(archived))
}

/// GET /v1/records/{id}/backups
async fn list_backups(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BackupSummary>>, AppError> {
    require_role(&caller, Role::Member)?;
    let id = parse_record_id(&id)?;
    let backups = run_engine(&state, move |engine| engine.backups(&id)).await?;
    Ok(Json(backups))
}
