//! Content import endpoint
//!
//! POST /api/admin/import takes a multipart form with an XML `file` and an
//! optional `target` (`auto`, `posts` or `pages`) and answers with the
//! import report.

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use press_common::auth::AuthUser;
use tracing::{error, info, warn};

use crate::db::SqliteContentStore;
use crate::error::{ApiError, ApiResult};
use crate::import::{run_import, ImportReport, ImportTarget};
use crate::AppState;

/// Uploaded feed file
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Parsed import form
#[derive(Debug, Default)]
pub struct ImportForm {
    pub file: Option<UploadedFile>,
    pub target: Option<String>,
}

/// Message shown for failures outside the per-item loop
const IMPORT_FAILED: &str = "Failed to import";

fn multipart_failure(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected upload: {}", e);
        return ApiError::PayloadTooLarge("File is too large".to_string());
    }

    error!("Import failed: {}", e);
    ApiError::Internal(IMPORT_FAILED.to_string())
}

async fn read_file(field: Field<'_>) -> ApiResult<UploadedFile> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let bytes = field.bytes().await.map_err(multipart_failure)?;
    Ok(UploadedFile {
        file_name,
        bytes: bytes.to_vec(),
    })
}

async fn read_form(mut multipart: Multipart) -> ApiResult<ImportForm> {
    let mut form = ImportForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_failure)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => form.file = Some(read_file(field).await?),
            Some("target") => form.target = Some(field.text().await.map_err(multipart_failure)?),
            _ => {}
        }
    }

    Ok(form)
}

/// Check the upload and decode it as UTF-8 XML text
pub fn validate_upload(file: Option<UploadedFile>) -> ApiResult<(String, String)> {
    let file = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    if !file.file_name.to_lowercase().ends_with(".xml") {
        return Err(ApiError::BadRequest(
            "Only .xml files are allowed".to_string(),
        ));
    }

    let xml = String::from_utf8(file.bytes)
        .map_err(|_| ApiError::BadRequest("File is not valid UTF-8 text".to_string()))?;

    Ok((file.file_name, xml))
}

/// POST /api/admin/import
pub async fn import_feed(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Json<ImportReport>> {
    let form = read_form(multipart).await?;
    let target = ImportTarget::parse(form.target.as_deref());
    let (file_name, xml) = validate_upload(form.file)?;

    info!(
        file = %file_name,
        bytes = xml.len(),
        target = target.as_str(),
        user = %user.email,
        "Import requested"
    );

    let store = SqliteContentStore::new(state.db.clone());
    let report = run_import(&xml, target, &store, &user.id).await?;

    Ok(Json(report))
}

/// Build import routes
///
/// Callers add the authentication layer.
pub fn import_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/admin/import", post(import_feed))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
