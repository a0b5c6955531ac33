use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health/status payload returned by `GET /v1/status`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Configured service name
    pub name: String,
    /// Always "Running" while the service is able to respond
    pub status: String,
}
