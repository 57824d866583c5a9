//! Package endpoints: list, get, search, create, delete.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use coverdesk_core::{business_key, strip_storage_key, Record};
use coverdesk_storage::StorageError;

use crate::state::AppState;

use super::common::{bad_request, conflict, internal_error, not_found, ApiError, ApiResult};
use super::ErrorResponse;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring of the package name. Empty matches every named package.
    #[serde(default)]
    pub query: String,
}

/// GET /api/packages -- list all packages in upload order.
#[utoipa::path(
    get,
    path = "/api/packages",
    tag = "Packages",
    responses(
        (status = 200, description = "All packages", body = Vec<Object>),
        (status = 500, description = "Store error", body = ErrorResponse)
    )
)]
pub async fn packages_list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Record>>> {
    let packages = state.stores.packages.list().await.map_err(internal_error)?;
    Ok(Json(packages))
}

/// GET /api/packages/{id} -- get one package by business id.
#[utoipa::path(
    get,
    path = "/api/packages/{id}",
    tag = "Packages",
    params(("id" = String, Path, description = "Package business id")),
    responses(
        (status = 200, description = "The package", body = Object),
        (status = 404, description = "No such package", body = ErrorResponse)
    )
)]
pub async fn packages_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Record>> {
    state
        .stores
        .packages
        .find_by_key(&id)
        .await
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Package", &id))
}

/// GET /api/search?query= -- packages whose name contains the query.
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "Packages",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching packages", body = Vec<Object>),
        (status = 500, description = "Store error", body = ErrorResponse)
    )
)]
pub async fn packages_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Record>>> {
    let hits = state
        .stores
        .packages
        .search_by_name(params.query.trim())
        .await
        .map_err(internal_error)?;
    Ok(Json(hits))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePackageResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub package: Record,
}

fn age_from(tier: &Value) -> i64 {
    match tier.get("ageFrom") {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Order a package's `pricing` tiers by `ageFrom`, ascending. Ties keep their order.
fn sort_pricing(package: &mut Record) {
    if let Some(Value::Array(tiers)) = package.get_mut("pricing") {
        tiers.sort_by_key(age_from);
    }
}

fn create_error(e: StorageError) -> ApiError {
    match e {
        StorageError::DuplicateKey(id) => conflict(format!("Package already exists: {}", id)),
        StorageError::MissingKey => bad_request("Package needs a non-empty string 'id'"),
        other => internal_error(other),
    }
}

/// POST /api/packages -- create one package.
#[utoipa::path(
    post,
    path = "/api/packages",
    tag = "Packages",
    request_body = Object,
    responses(
        (status = 201, description = "Package created", body = CreatePackageResponse),
        (status = 400, description = "Missing or empty id", body = ErrorResponse),
        (status = 409, description = "Id already taken", body = ErrorResponse)
    )
)]
pub async fn packages_create(
    State(state): State<Arc<AppState>>,
    Json(mut package): Json<Record>,
) -> ApiResult<(StatusCode, Json<CreatePackageResponse>)> {
    strip_storage_key(&mut package);
    let id = business_key(&package)
        .map(str::to_string)
        .ok_or_else(|| bad_request("Package needs a non-empty string 'id'"))?;
    sort_pricing(&mut package);

    let store = &state.stores.packages;
    store
        .insert_many(std::slice::from_ref(&package))
        .await
        .map_err(create_error)?;

    let stored = store
        .find_by_key(&id)
        .await
        .map_err(internal_error)?
        .unwrap_or(package);
    info!(id = %id, "Package created");

    Ok((
        StatusCode::CREATED,
        Json(CreatePackageResponse {
            message: "Package created".to_string(),
            package: stored,
        }),
    ))
}

/// DELETE /api/packages/{id} -- delete a package by business id.
#[utoipa::path(
    delete,
    path = "/api/packages/{id}",
    tag = "Packages",
    params(("id" = String, Path, description = "Package business id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such package", body = ErrorResponse)
    )
)]
pub async fn packages_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let deleted = state
        .stores
        .packages
        .delete_by_key(&id)
        .await
        .map_err(internal_error)?;
    if !deleted {
        return Err(not_found("Package", &id));
    }
    info!(id = %id, "Package deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pricing_sorted_by_age_from() {
        let mut package = json!({
            "id": "pkg1",
            "pricing": [
                {"ageFrom": 41, "price": 3000},
                {"ageFrom": "6", "price": 1200},
                {"ageFrom": 16, "price": 1800},
                {"price": 900},
            ]
        })
        .as_object()
        .cloned()
        .unwrap();

        sort_pricing(&mut package);
        let prices: Vec<i64> = package["pricing"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tier| tier["price"].as_i64().unwrap())
            .collect();
        assert_eq!(prices, vec![900, 1200, 1800, 3000]);
    }

    #[test]
    fn package_without_pricing_untouched() {
        let mut package = json!({"id": "pkg1", "pricing": "n/a"}).as_object().cloned().unwrap();
        sort_pricing(&mut package);
        assert_eq!(package["pricing"], json!("n/a"));
    }

    #[test]
    fn storage_errors_map_to_status() {
        assert_eq!(create_error(StorageError::DuplicateKey("pkg1".into())).0, StatusCode::CONFLICT);
        assert_eq!(create_error(StorageError::MissingKey).0, StatusCode::BAD_REQUEST);
        assert_eq!(
            create_error(StorageError::Other("down".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
