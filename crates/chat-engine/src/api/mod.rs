//! HTTP transport for the chat engine
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | `POST` | `/api/chat` | create a session (503 when refused) |
//! | `POST` | `/api/chat/:session_id/poll` | keep-alive (404 when inactive or unknown) |
//! | `GET` | `/api/chat/status` | capacity snapshot |

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::debug;

use crate::orchestrator::{ChatCoordinator, CreateChatResponse, PollResponse, StatusSnapshot};
use crate::session::{ChatSessionStatus, SessionId};

/// Body returned for malformed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the router over a shared coordinator
pub fn router(coordinator: Arc<ChatCoordinator>) -> Router {
    Router::new()
        .route("/api/chat", post(create_chat))
        .route("/api/chat/status", get(status))
        .route("/api/chat/:session_id/poll", post(poll))
        .with_state(coordinator)
}

async fn create_chat(
    State(coordinator): State<Arc<ChatCoordinator>>,
) -> (StatusCode, Json<CreateChatResponse>) {
    let response = coordinator.create_chat_session();
    let code = if response.is_refused() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(response))
}

async fn poll(
    State(coordinator): State<Arc<ChatCoordinator>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session_id = match SessionId::from_str(&session_id) {
        Ok(id) => id,
        Err(e) => {
            debug!("Rejecting poll for malformed session id {:?}: {}", session_id, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("invalid session id: {}", e),
                }),
            )
                .into_response();
        }
    };

    let response: PollResponse = coordinator.poll(&session_id);
    let code = if response.status == ChatSessionStatus::Inactive {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    (code, Json(response)).into_response()
}

async fn status(State(coordinator): State<Arc<ChatCoordinator>>) -> Json<StatusSnapshot> {
    let now = coordinator.now();
    Json(coordinator.status(now))
}
