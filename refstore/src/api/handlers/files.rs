use crate::AppState;
use crate::api::models::files::{DownloadParams, UploadParams, UploadRequest, UploadResponse};
use crate::config::{Config, Disposition};
use crate::errors::{Error, Result};
use axum::{
    Json,
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::Path;

#[utoipa::path(
    post,
    path = "/v1/files",
    tag = "files",
    summary = "Upload file",
    description = "Store a raw image body under the configured storage root and return its reference path.",
    params(
        ("type" = String, Query, description = "File type; only 'image' is supported"),
        ("featureId" = String, Query, description = "Feature the file belongs to")
    ),
    request_body(content_type = "image/*", description = "Raw file bytes"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    // An empty query string is the same as no query string at all
    let params = query.as_deref().filter(|q| !q.is_empty()).map(UploadParams::from_query);
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());

    let request = UploadRequest::validate(params, content_type, body)?;
    let stored = state.store.store(&request).await?;

    let file_path = compose_reference(&state.config, &stored.path);
    Ok((StatusCode::CREATED, Json(UploadResponse { file_path })))
}

/// Build the reference returned to the caller: a full retrieval URL when a
/// demo base URL is configured, otherwise the raw stored path.
fn compose_reference(config: &Config, stored_path: &Path) -> String {
    let raw_path = stored_path.display().to_string();
    match &config.demo.base_url {
        Some(base) => {
            let mut url = base.clone();
            url.set_path(&format!("{}/v1/files", config.demo_base_path));
            url.query_pairs_mut().clear().append_pair("filePath", &raw_path);
            url.to_string()
        }
        None => raw_path,
    }
}

#[utoipa::path(
    get,
    path = "/v1/files",
    tag = "files",
    summary = "Download file",
    description = "Demo-only retrieval of a previously stored file by its path. No access control.",
    params(
        ("filePath" = String, Query, description = "Path returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Missing filePath", body = crate::errors::ErrorBody),
        (status = 404, description = "File does not exist", body = crate::errors::ErrorBody)
    )
)]
pub async fn download_file(State(state): State<AppState>, RawQuery(query): RawQuery) -> Result<Response> {
    let params = query.as_deref().map(DownloadParams::from_query).unwrap_or_default();
    let file_path = params
        .file_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::bad_request("filePath is required query param"))?;

    let path = Path::new(file_path);
    let content = state.store.read(path).await?;

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let disposition = match state.config.demo.disposition {
        Disposition::Open => "inline".to_string(),
        Disposition::Attachment => {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("download");
            format!("attachment; filename=\"{file_name}\"")
        }
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(axum::body::Body::from(content))
        .map_err(|e| Error::Internal(e.into()))?;

    Ok(response.into_response())
}
