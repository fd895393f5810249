//! Axum Router Configuration
//!
//! This module defines the HTTP routing for the coaching session API and its
//! OpenAPI documentation.

use crate::{
    handlers,
    models::{
        CoachLine, ErrorResponse, ItemView, SessionStatus, SessionView, StartSessionResponse,
        TurnPayload, TurnResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::start_session,
        handlers::get_session,
        handlers::submit_turn,
        handlers::next_dialogue,
        handlers::end_session,
    ),
    components(
        schemas(SessionView, SessionStatus, ItemView, CoachLine, StartSessionResponse, TurnPayload, TurnResponse, ErrorResponse)
    ),
    tags(
        (name = "Lango API", description = "Voice-first vocabulary coaching sessions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route(
            "/session",
            get(handlers::get_session).post(handlers::start_session),
        )
        .route("/session/turns", post(handlers::submit_turn))
        .route("/session/dialogue", post(handlers::next_dialogue))
        .route("/session/end", post(handlers::end_session))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
