use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chunk_core::{ChunkError, ChunkService, ListQuery};
use chunk_models::NormalizedItem;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

pub fn router(service: Arc<ChunkService>) -> Router {
    Router::new()
        .route("/list/{list_id}", get(list_chunk))
        .with_state(service)
}

/// `ChunkError` rendered as `{"error": message}` with its mapped status.
pub struct ApiError(ChunkError);

impl From<ChunkError> for ApiError {
    fn from(e: ChunkError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[tracing::instrument(skip_all, fields(list_id = %list_id))]
async fn list_chunk(
    Path(list_id): Path<String>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
    State(service): State<Arc<ChunkService>>,
) -> Result<Json<Vec<NormalizedItem>>, ApiError> {
    let Query(params) = params.map_err(|e| ChunkError::InvalidParameter(e.body_text()))?;

    let query = ListQuery::from_params(&list_id, &params).inspect_err(|e| {
        warn!(error = %e, "rejected list request");
    })?;

    match service.list_chunk(&query).await {
        Ok(items) => {
            info!(returned = items.len(), "served list chunk");
            Ok(Json(items))
        }
        Err(e) => {
            error!(status = e.status_code(), error = %e, "list request failed");
            Err(e.into())
        }
    }
}
