//! Package file upload and reconciliation.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use coverdesk_reconcile::{Conflict, Reconciler, SkippedRecord, UploadResult};

use crate::state::AppState;

use super::common::{bad_request, error, internal_error, ApiError, ApiResult};
use super::ErrorResponse;

const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadParams {
    /// `true` overwrites stored packages that differ instead of reporting conflicts.
    pub force: Option<String>,
}

impl UploadParams {
    fn force(&self) -> bool {
        self.force
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    #[schema(value_type = Vec<Object>)]
    pub conflicts: Vec<Conflict>,
    #[schema(value_type = Vec<Object>)]
    pub skipped: Vec<SkippedRecord>,
}

impl From<UploadResult> for UploadResponse {
    fn from(result: UploadResult) -> Self {
        let message = if result.conflicts.is_empty() {
            "Upload processed".to_string()
        } else {
            format!("Upload processed with {} conflicts", result.conflicts.len())
        };
        Self {
            message,
            inserted: result.inserted,
            updated: result.updated,
            unchanged: result.unchanged,
            conflicts: result.conflicts,
            skipped: result.skipped,
        }
    }
}

/// Bodies over the route's `DefaultBodyLimit` surface here as 413.
fn multipart_error(e: MultipartError) -> ApiError {
    error(e.status(), format!("Multipart error: {}", e.body_text()))
}

/// Pull the `file` field out of the form, skipping any other fields.
async fn read_file_field(multipart: &mut Multipart) -> ApiResult<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(bad_request("No file provided"))
}

/// POST /api/upload -- reconcile a JSON / CSV / XLSX file of packages.
///
/// New ids are inserted in one batch. Changed ids are reported as conflicts,
/// or overwritten when `force=true`. Conflicts are part of a 200 response.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Upload",
    params(UploadParams),
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field (.json, .csv or .xlsx)"),
    responses(
        (status = 200, description = "Upload reconciled", body = UploadResponse),
        (status = 400, description = "Missing file, unsupported format or unreadable content", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Batch insert failed", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let upload_id = Uuid::new_v4();
    process_upload(state, multipart, params.force())
        .instrument(info_span!("upload", %upload_id))
        .await
}

async fn process_upload(
    state: Arc<AppState>,
    mut multipart: Multipart,
    force: bool,
) -> ApiResult<Json<UploadResponse>> {
    let (filename, bytes) = read_file_field(&mut multipart).await?;
    info!(filename = %filename, bytes = bytes.len(), force, "Upload received");

    let parse_state = state.clone();
    let records = tokio::task::spawn_blocking(move || {
        parse_state.parsers.parse_upload(&filename, &bytes)
    })
    .await
    .map_err(internal_error)?
    .map_err(|e| {
        if e.is_unsupported_format() {
            bad_request(e.to_string())
        } else {
            bad_request(format!("Failed to read file: {}", e))
        }
    })?;

    let result = Reconciler::new(state.stores.packages.as_ref())
        .force(force)
        .insert_timeout(state.upload.insert_timeout())
        .run(records)
        .await
        .map_err(internal_error)?;

    Ok(Json(UploadResponse::from(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverdesk_reconcile::{FieldDiff, SkipReason};
    use serde_json::{json, Value};

    #[test]
    fn force_only_for_true() {
        let p = |v: Option<&str>| UploadParams { force: v.map(str::to_string) };
        assert!(p(Some("true")).force());
        assert!(p(Some("TRUE")).force());
        assert!(!p(Some("1")).force());
        assert!(!p(Some("false")).force());
        assert!(!p(None).force());
    }

    #[test]
    fn response_shape() {
        let result = UploadResult {
            inserted: 1,
            conflicts: vec![Conflict {
                id: "pkg1".into(),
                diffs: vec![FieldDiff {
                    field: "name".into(),
                    old: json!("Basic"),
                    new: json!("Premium"),
                }],
                old: json!({"id": "pkg1", "name": "Basic"}).as_object().cloned().unwrap(),
                new: json!({"id": "pkg1", "name": "Premium"}).as_object().cloned().unwrap(),
            }],
            skipped: vec![SkippedRecord {
                index: 2,
                id: None,
                reason: SkipReason::MissingId,
                error: None,
            }],
            ..Default::default()
        };

        let body: Value = serde_json::to_value(UploadResponse::from(result)).unwrap();
        assert_eq!(body["message"], json!("Upload processed with 1 conflicts"));
        assert_eq!(body["inserted"], json!(1));
        assert_eq!(body["conflicts"][0]["diffs"][0]["field"], json!("name"));
        assert_eq!(body["skipped"][0]["reason"], json!("missing_id"));
    }
}
