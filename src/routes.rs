//! HTTP routes for submitting transactions and reading the chain.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::catalog::Service;
use crate::error::AppError;
use crate::ledger::SubmitReceipt;
use crate::model::{timestamp_now, Block, Transaction};
use crate::AppState;

/// Header naming the caller; falls back to the configured default submitter.
pub const SUBMITTER_HEADER: &str = "x-submitter";

/// Body of `POST /`. Only the service reference is taken from the client;
/// `user`, `checkoutDate` and `isGenesis` are accepted and overwritten.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TxInput {
    #[serde(rename = "serviceID", alias = "serviceReference")]
    pub service_id: String,
}

/// GET /
pub async fn get_chain(State(state): State<AppState>) -> Json<Vec<Block>> {
    let guard = state.ledger.lock();
    Json(guard.chain().blocks().to_vec())
}

/// POST /
pub async fn submit_tx(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitReceipt>), AppError> {
    let input: TxInput = object_body(payload)?;
    let submitter = submitter(&headers, &state.config.default_submitter)?;
    debug!(service_id = %input.service_id, %submitter, "transaction submitted");

    let receipt = state.ledger.lock().submit(input.service_id, submitter);
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// POST /flush — seal whatever is pending, even nothing.
pub async fn flush(State(state): State<AppState>) -> (StatusCode, Json<SubmitReceipt>) {
    let receipt = state.ledger.lock().flush();
    (StatusCode::CREATED, Json(receipt))
}

/// GET /pending
pub async fn pending(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    let guard = state.ledger.lock();
    Json(guard.pool().pending().to_vec())
}

/// POST /new — stamp a catalog item; nothing is stored.
pub async fn new_service(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Service>, AppError> {
    let service: Service = object_body(payload)?;
    let service = service.register(timestamp_now());
    debug!(id = %service.id, isbn = %service.isbn, "catalog item registered");
    Ok(Json(service))
}

/// GET /validate — re-derive every block; returns { ok, errors[] }
#[derive(Debug, Serialize)]
pub struct ValidateResp {
    pub ok: bool,
    pub errors: Vec<String>,
}

pub async fn validate_chain(State(state): State<AppState>) -> Json<ValidateResp> {
    let errors = state.ledger.lock().chain().audit();
    Json(ValidateResp {
        ok: errors.is_empty(),
        errors,
    })
}

/// GET /health
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub blocks: usize,
    pub pending: usize,
    pub rejected: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let guard = state.ledger.lock();
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        blocks: guard.chain().len(),
        pending: guard.pool().len(),
        rejected: guard.chain().rejected(),
    })
}

/// Decode a JSON body that must be an object; derived struct decoding would
/// otherwise also take arrays, matching elements to fields by position.
fn object_body<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = payload?;
    if !value.is_object() {
        return Err(AppError::BadRequest("expected a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn submitter(headers: &HeaderMap, default: &str) -> Result<String, AppError> {
    let Some(value) = headers.get(SUBMITTER_HEADER) else {
        return Ok(default.to_string());
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::BadRequest(format!("{SUBMITTER_HEADER} must be visible ASCII")))?
        .trim();
    if value.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(value.to_string())
    }
}
