use crate::AppState;
use crate::api::models::status::StatusResponse;
use axum::{Json, extract::State};

#[utoipa::path(
    get,
    path = "/v1/status",
    tag = "status",
    summary = "Service status",
    description = "Report the configured service name and a static running indicator.",
    responses(
        (status = 200, description = "Service is running", body = StatusResponse)
    )
)]
pub async fn service_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        name: state.config.metadata.name.clone(),
        status: "Running".to_string(),
    })
}
