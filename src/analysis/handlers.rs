use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::API_KEY_KEY;

use super::client::{Analysis, BarcodeProduct};
use super::dto::{AnalyzeRequest, ApiKeyRequest, ApiKeyResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analysis", post(analyze_text))
        .route("/barcode/:code", get(lookup_barcode))
        .route("/settings/analysis-key", get(get_api_key).put(put_api_key))
}

/// Refuses before any I/O when no credential is stored.
#[instrument(skip(state, body))]
async fn analyze_text(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<Analysis>, AppError> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidEntry(
            "food description must not be empty".into(),
        ));
    }

    let api_key = state
        .store
        .get(API_KEY_KEY)
        .await?
        .filter(|k| !k.trim().is_empty())
        .ok_or(AppError::MissingApiKey)?;

    let analysis = state.nutrition.analyze(text, &api_key).await?;
    Ok(Json(analysis))
}

#[instrument(skip(state))]
async fn lookup_barcode(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<BarcodeProduct>, AppError> {
    let product = state.nutrition.lookup_barcode(&code).await?;
    Ok(Json(product))
}

#[instrument(skip(state))]
async fn get_api_key(State(state): State<AppState>) -> Result<Json<ApiKeyResponse>, AppError> {
    let api_key = state.store.get(API_KEY_KEY).await?;
    Ok(Json(ApiKeyResponse { api_key }))
}

#[instrument(skip(state, body))]
async fn put_api_key(
    State(state): State<AppState>,
    Json(body): Json<ApiKeyRequest>,
) -> Result<StatusCode, AppError> {
    state.store.put(API_KEY_KEY, body.api_key.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}
