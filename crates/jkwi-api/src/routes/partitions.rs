//! # Partition API
//!
//! - **GET `/v1/partitions`**: list partitions (member)
//! - **POST `/v1/partitions`**: provision a partition with a template (admin)
//! - **GET `/v1/partitions/{code}/stats`**: status and division counts (member)
//! - **GET `/v1/partitions/{code}/records`**: every live record (member)
//! - **POST `/v1/partitions/{code}/records`**: create a record from the template (director)
//! - **GET `/v1/partitions/{code}/export`**: export bundle (director)
//! - **POST `/v1/import`**: import an export bundle (admin)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use jkwi_core::{LocationCode, RecordId};
use jkwi_records::{ExportBundle, ImportReport, Partition, PartitionStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::run_engine;
use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, parse_location_code, Validate};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to provision a partition.
#[derive(Debug, Deserialize)]
pub struct CreatePartitionRequest {
    /// Top-level grouping folder (e.g. a country code).
    pub group: String,
    /// Location code. Must not be a prefix of, or prefixed by, an existing code.
    pub code: String,
    /// Human-readable partition name; becomes part of the folder name.
    pub name: String,
    /// Template for new records. Defaults to the member template.
    #[serde(default)]
    pub template: Option<Value>,
}

impl Validate for CreatePartitionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.group.trim().is_empty() {
            return Err("group must not be empty".into());
        }
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        if matches!(&self.template, Some(t) if !t.is_object()) {
            return Err("template must be a JSON object".into());
        }
        Ok(())
    }
}

/// A newly created record.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedRecord {
    pub id: RecordId,
    pub record: Value,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the partitions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/partitions", get(list_partitions).post(create_partition))
        .route("/v1/partitions/{code}/stats", get(partition_stats))
        .route(
            "/v1/partitions/{code}/records",
            get(list_records).post(create_record),
        )
        .route("/v1/partitions/{code}/export", get(export_partition))
        .route("/v1/import", post(import_bundle))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /v1/partitions
async fn list_partitions(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<Partition>>, AppError> {
    require_role(&caller, Role::Member)?;
    let partitions = run_engine(&state, |engine| engine.partitions()).await?;
    Ok(Json(partitions))
}

/// POST /v1/partitions
async fn create_partition(
    caller: CallerIdentity,
    State(state): State<AppState>,
    body: Result<Json<CreatePartitionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Partition>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;
    let code = LocationCode::new(req.code.trim())?;
    let partition = run_engine(&state, move |engine| {
        engine.create_partition(
            req.group.trim(),
            &code,
            req.name.trim(),
            req.template,
            &caller.actor,
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(partition)))
}

/// GET /v1/partitions/{code}/stats
async fn partition_stats(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PartitionStats>, AppError> {
    require_role(&caller, Role::Member)?;
    let code = parse_location_code(&code)?;
    let stats = run_engine(&state, move |engine| engine.stats(&code)).await?;
    Ok(Json(stats))
}

/// GET /v1/partitions/{code}/records
async fn list_records(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    require_role(&caller, Role::Member)?;
    let code = parse_location_code(&code)?;
    let records = run_engine(&state, move |engine| engine.list(&code)).await?;
    Ok(Json(records))
}

/// POST /v1/partitions/{code}/records: body is the seed merged into the template.
async fn create_record(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedRecord>), AppError> {
    require_role(&caller, Role::Director)?;
    let code = parse_location_code(&code)?;
    let seed = extract_json(body)?;
    let created = run_engine(&state, move |engine| {
        let id = engine.create(&code, &seed, &caller.actor)?;
        let record = engine
            .read(&id)?
            .ok_or_else(|| jkwi_records::RecordError::RecordNotFound(id.to_string()))?;
        Ok(CreatedRecord { id, record })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /v1/partitions/{code}/export
async fn export_partition(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ExportBundle>, AppError> {
    require_role(&caller, Role::Director)?;
    let code = parse_location_code(&code)?;
    let bundle = run_engine(&state, move |engine| engine.export(&code)).await?;
    Ok(Json(bundle))
}

/// POST /v1/import
async fn import_bundle(
    caller: CallerIdentity,
    State(state): State<AppState>,
    body: Result<Json<ExportBundle>, JsonRejection>,
) -> Result<Json<ImportReport>, AppError> {
    require_role(&caller, Role::Admin)?;
    let bundle = extract_json(body)?;
    let report = run_engine(&state, move |engine| engine.import(&bundle, &caller.actor)).await?;
    Ok(Json(report))
}
