use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use coverdesk_core::Record;

use crate::state::AppState;

use super::common::{internal_error, ApiResult};
use super::ErrorResponse;

/// GET /api/categories -- list all categories.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Object>),
        (status = 500, description = "Store error", body = ErrorResponse)
    )
)]
pub async fn categories_list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Record>>> {
    let categories = state.stores.categories.list().await.map_err(internal_error)?;
    Ok(Json(categories))
}
