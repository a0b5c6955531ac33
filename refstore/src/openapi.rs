//! OpenAPI document for the service, served via Scalar at `/docs`.

use crate::api::handlers::{files, status};
use crate::api::models::{files::UploadResponse, status::StatusResponse};
use crate::errors::ErrorBody;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reference Storage Service",
        description = "Minimal HTTP file-storage service: upload feature-linked images, retrieve them by path."
    ),
    paths(status::service_status, files::upload_file, files::download_file),
    components(schemas(StatusResponse, UploadResponse, ErrorBody)),
    tags(
        (name = "status", description = "Service health"),
        (name = "files", description = "File upload and demo retrieval")
    )
)]
pub struct ApiDoc;
