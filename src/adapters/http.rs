//! HTTP surface: `POST /api/contact`.

use crate::core::intake::{IntakeError, IntakeService};
use crate::domain::model::ContactMessage;
use crate::utils::error::{ValidationError, ValidationErrors};
use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

pub const CONTACT_ROUTE: &str = "/api/contact";

pub const SUCCESS_MESSAGE: &str = "Message sent successfully";
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";
pub const SERVER_FAILURE_MESSAGE: &str = "An error occurred while processing your message";

#[derive(Clone)]
pub struct AppState {
    pub intake: IntakeService,
}

impl AppState {
    pub fn new(intake: IntakeService) -> Self {
        Self { intake }
    }
}

#[derive(Debug, Serialize)]
struct CreatedBody<'a> {
    message: &'static str,
    data: &'a ContactMessage,
}

#[derive(Debug, Serialize)]
struct ValidationFailedBody<'a> {
    message: &'static str,
    errors: &'a ValidationErrors,
}

#[derive(Debug, Serialize)]
struct FailureBody {
    message: &'static str,
}

pub fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route(CONTACT_ROUTE, post(create_contact_message))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(middleware::from_fn(request_tracing_middleware))
        .with_state(state)
}

async fn create_contact_message(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("rejecting unparseable contact body: {}", e);
            let errors = ValidationErrors(vec![ValidationError::new(
                "body",
                "Request body must be valid JSON.",
            )]);
            return IntakeError::Validation(errors).into_response();
        }
    };

    match state.intake.submit(&payload).await {
        Ok(stored) => (
            StatusCode::CREATED,
            Json(CreatedBody {
                message: SUCCESS_MESSAGE,
                data: &stored,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        match self {
            IntakeError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationFailedBody {
                    message: VALIDATION_FAILED_MESSAGE,
                    errors: &errors,
                }),
            )
                .into_response(),
            IntakeError::Store(e) => {
                tracing::error!("❌ Error handling contact form submission: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(FailureBody {
                        message: SERVER_FAILURE_MESSAGE,
                    }),
                )
                    .into_response()
            }
        }
    }
}

async fn request_tracing_middleware(request: Request<Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        route = %request.uri().path(),
    );

    async move {
        let response = next.run(request).await;
        tracing::debug!(status = response.status().as_u16(), "request finished");
        response
    }
    .instrument(span)
    .await
}
