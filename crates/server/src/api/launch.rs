//! Vendor launch (generic framework) handlers.
//!
//! The launch endpoint speaks XML; the session endpoints used by the pop-up
//! page speak JSON.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use docbridge_core::{
    HandshakeError, LaunchOutcome, SessionError, SessionStart, SessionSummary,
};

use super::integration::orchestrator_error_response;
use crate::state::AppState;

/// Error response for the pop-up session endpoints
#[derive(Debug, Serialize)]
pub struct SessionErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

fn session_error_response(error: HandshakeError) -> Response {
    let (status, error, hint) = match error {
        HandshakeError::Session(SessionError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            "Session not found or expired",
            Some("Sessions expire after 30 minutes"),
        ),
        HandshakeError::Session(SessionError::Expired(_)) => (
            StatusCode::GONE,
            "Session has expired",
            Some("The launch ticket is only valid for 30 minutes"),
        ),
        HandshakeError::Orchestrator(e) => return orchestrator_error_response(e).into_response(),
        other => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SessionErrorResponse {
                    error: other.to_string(),
                    hint: None,
                }),
            )
                .into_response()
        }
    };

    (
        status,
        Json(SessionErrorResponse {
            error: error.to_string(),
            hint: hint.map(str::to_string),
        }),
    )
        .into_response()
}

/// Accept a launch request and answer with a pop-up window or an error, in XML
pub async fn launch(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let reply = state.handshake().handle_launch_bytes(&body);

    let status = match reply.outcome {
        LaunchOutcome::Accepted => StatusCode::OK,
        LaunchOutcome::Rejected => StatusCode::BAD_REQUEST,
        LaunchOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, [(header::CONTENT_TYPE, "application/xml")], reply.xml).into_response()
}

/// Session details for the pop-up page
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>, Response> {
    state
        .handshake()
        .resolve_session(&session_id)
        .map(Json)
        .map_err(session_error_response)
}

/// Start the pipeline for a session; progress is reported by the status endpoint
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStart>, Response> {
    state
        .handshake()
        .start_session(&session_id)
        .await
        .map(Json)
        .map_err(session_error_response)
}
