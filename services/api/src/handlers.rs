//! Axum Handlers for the REST API
//!
//! This module maps HTTP requests onto the coach's session lifecycle.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use lango_core::{CoachError, SessionState};
use std::sync::Arc;
use tracing::{error, warn};

use crate::{
    models::{
        CoachLine, ErrorResponse, ItemView, SessionStatus, SessionView, StartSessionResponse,
        TurnPayload, TurnResponse,
    },
    state::AppState,
};

pub enum ApiError {
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(ErrorResponse { message })).into_response()
            }
            ApiError::BadGateway(message) => {
                warn!("Upstream failure: {}", message);
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl From<CoachError> for ApiError {
    fn from(err: CoachError) -> Self {
        match err {
            CoachError::State(message) => Self::Conflict(message),
            upstream @ CoachError::Upstream(_) => Self::BadGateway(upstream.to_string()),
            other => Self::InternalServerError(other.into()),
        }
    }
}

fn no_session() -> ApiError {
    ApiError::NotFound("No session has been started".to_string())
}

/// Start a new coaching session and get the coach's first line.
#[utoipa::path(
    post,
    path = "/session",
    responses(
        (status = 201, description = "Session started", body = StartSessionResponse),
        (status = 409, description = "A session is already active", body = ErrorResponse),
        (status = 502, description = "Dialogue generation failed; the session stays active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn start_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut slot = state.session.lock().await;
    if let SessionState::Active(session) = &*slot {
        return Err(ApiError::Conflict(format!(
            "Session '{}' is already active",
            session.session_id
        )));
    }

    let session = state.coach.start_session().await?;
    *slot = SessionState::Active(session);

    let reply = state.coach.coach_dialogue(&mut slot).await?;
    let session = SessionView::from_state(&slot).ok_or_else(no_session)?;

    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            session,
            dialogue: reply.into(),
        }),
    ))
}

/// Get the current session.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Session details", body = SessionView),
        (status = 404, description = "No session has been started", body = ErrorResponse)
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionView>, ApiError> {
    let slot = state.session.lock().await;
    SessionView::from_state(&slot).map(Json).ok_or_else(no_session)
}

/// Submit what the learner said and get the coach's reply.
#[utoipa::path(
    post,
    path = "/session/turns",
    request_body = TurnPayload,
    responses(
        (status = 200, description = "Turn processed", body = TurnResponse),
        (status = 409, description = "No active session", body = ErrorResponse),
        (status = 502, description = "Dialogue generation failed; the turn was recorded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn submit_turn(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TurnPayload>,
) -> Result<Json<TurnResponse>, ApiError> {
    let mut slot = state.session.lock().await;

    let outcome = state.coach.process_turn(&mut slot, &payload.text).await?;
    let dialogue = state.coach.coach_dialogue(&mut slot).await?;
    let session = SessionView::from_state(&slot).ok_or_else(no_session)?;

    let status = if outcome.is_completed() {
        SessionStatus::Completed
    } else {
        SessionStatus::Active
    };

    Ok(Json(TurnResponse {
        status,
        mastered: outcome.effect().mastered().map(ItemView::from),
        session,
        dialogue: dialogue.into(),
    }))
}

/// Ask the coach for its next line without a learner turn.
#[utoipa::path(
    post,
    path = "/session/dialogue",
    responses(
        (status = 200, description = "Coach line", body = CoachLine),
        (status = 409, description = "No session has been started", body = ErrorResponse),
        (status = 502, description = "Dialogue generation failed", body = ErrorResponse)
    )
)]
pub async fn next_dialogue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CoachLine>, ApiError> {
    let mut slot = state.session.lock().await;
    let reply = state.coach.coach_dialogue(&mut slot).await?;
    Ok(Json(reply.into()))
}

/// Persist the learner's progress and close the session.
#[utoipa::path(
    post,
    path = "/session/end",
    responses(
        (status = 200, description = "Session ended; returns its final state", body = SessionView),
        (status = 409, description = "No session has been started", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn end_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionView>, ApiError> {
    let mut slot = state.session.lock().await;
    match &*slot {
        SessionState::NotStarted => return Err(CoachError::not_started().into()),
        SessionState::Active(session) => state.coach.end_session(&session.queues).await?,
        SessionState::Completed { .. } => {}
    }

    let view = SessionView::from_state(&slot).ok_or_else(no_session)?;
    *slot = SessionState::NotStarted;
    Ok(Json(view))
}
