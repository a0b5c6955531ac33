//! Upload and retrieval request/response types, including the upload
//! validation pipeline.
//!
//! Validation runs as a fixed sequence of checks and stops at the first
//! failure, so callers always get exactly one error message and the message
//! for a given malformed request never depends on what else is wrong with it.

use crate::errors::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Query parameters accepted by the upload endpoint, parsed leniently so the
/// validation pipeline controls every error message.
#[derive(Debug, Default, Clone)]
pub struct UploadParams {
    pub file_type: Option<String>,
    pub feature_id: Option<String>,
}

impl UploadParams {
    /// Parse from a raw query string. Unknown keys are ignored; repeated keys
    /// keep the last value, matching common query-string semantics.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "type" => params.file_type = Some(value.into_owned()),
                "featureId" => params.feature_id = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// A fully validated upload, ready to be written to disk.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Normalized file type (currently always "image")
    pub file_type: String,
    /// Caller-supplied opaque feature identifier, trimmed
    pub feature_id: String,
    /// Content-Type header value as received
    pub content_type: String,
    /// Raw file bytes
    pub body: Bytes,
}

/// The single file type this service accepts.
const SUPPORTED_TYPE: &str = "image";

impl UploadRequest {
    /// Validate an incoming upload.
    ///
    /// Checks run in a fixed order and short-circuit on the first failure:
    /// query string present, `type` present and supported, `featureId`
    /// present, Content-Type header present and `image/*`, body non-empty.
    /// Content-Type is checked before the body so a request that is wrong in
    /// both ways reports the header problem.
    pub fn validate(params: Option<UploadParams>, content_type: Option<&str>, body: Bytes) -> Result<Self> {
        let params = params.ok_or_else(|| Error::bad_request("Required query params: type, featureId"))?;

        let file_type = params
            .file_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::bad_request("type is required query param"))?;
        let file_type = file_type.to_lowercase();
        if file_type != SUPPORTED_TYPE {
            return Err(Error::bad_request(format!("Supported values for 'type': {SUPPORTED_TYPE}")));
        }

        let feature_id = params
            .feature_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::bad_request("featureId is required query param"))?;

        let content_type = content_type.ok_or_else(|| Error::bad_request("Content-Type header is required"))?;
        if !is_image_content_type(content_type) {
            return Err(Error::bad_request(format!(
                "Content-Type '{content_type}' not supported. Supported content types: image/*"
            )));
        }

        if body.is_empty() {
            return Err(Error::bad_request("No file found"));
        }

        Ok(Self {
            file_type,
            feature_id: feature_id.to_string(),
            content_type: content_type.to_string(),
            body,
        })
    }
}

/// Accept any `image/<subtype>` media type; only the primary type matters.
fn is_image_content_type(content_type: &str) -> bool {
    let primary = content_type.split('/').next().unwrap_or("");
    primary.trim().eq_ignore_ascii_case("image") && content_type.contains('/')
}

/// Successful upload response: the reference callers use to fetch the file.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Stored path, or a full retrieval URL when a demo base URL is configured
    pub file_path: String,
}

/// Query parameters accepted by the demo retrieval endpoint.
#[derive(Debug, Default, Clone)]
pub struct DownloadParams {
    pub file_path: Option<String>,
}

impl DownloadParams {
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key.as_ref() == "filePath" {
                params.file_path = Some(value.into_owned());
            }
        }
        params
    }
}
