//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! endpoint requires an `x-actor-id` header naming the caller; it is logged
//! but not verified.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        FromRequestParts, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{AdjustmentWrite, WorkerId};
use crate::service::{ClockRequest, PayrollRunRequest};

use super::request::{AdjustmentQueryRequest, AdjustmentUpsertRequest, IntervalsQuery, WeeklyHoursBody};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Header carrying the caller identity.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/workers/:worker_id/clock-in", post(clock_in_handler))
        .route("/workers/:worker_id/clock-out", post(clock_out_handler))
        .route("/workers/:worker_id/session", get(session_handler))
        .route("/workers/:worker_id/intervals", get(intervals_handler))
        .route("/weekly-hours", post(weekly_hours_handler))
        .route("/adjustments", put(upsert_adjustment_handler))
        .route("/adjustments/query", post(query_adjustments_handler))
        .route("/payroll/summaries", post(payroll_handler))
        .with_state(state)
}

/// The caller named by the `x-actor-id` header.
#[derive(Debug, Clone)]
pub struct Actor(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Actor(value.to_string()))
            .ok_or_else(|| {
                ApiErrorResponse::new(
                    StatusCode::UNAUTHORIZED,
                    ApiError::auth_required(format!("{} header is required", ACTOR_HEADER)),
                )
            })
    }
}

/// Handler for POST /workers/:worker_id/clock-in.
async fn clock_in_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(worker_id): Path<String>,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_optional_body::<ClockRequest>(&body, correlation_id) {
        Ok(request) => request,
        Err(error) => return error.into_response(),
    };

    let worker_id = WorkerId::new(worker_id);
    info!(correlation_id = %correlation_id, actor_id = %actor, worker_id = %worker_id, "Processing clock-in");
    match state.clock().clock_in(&worker_id, request).await {
        Ok(event) => json_response(StatusCode::CREATED, &event),
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for POST /workers/:worker_id/clock-out.
async fn clock_out_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(worker_id): Path<String>,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_optional_body::<ClockRequest>(&body, correlation_id) {
        Ok(request) => request,
        Err(error) => return error.into_response(),
    };

    let worker_id = WorkerId::new(worker_id);
    info!(correlation_id = %correlation_id, actor_id = %actor, worker_id = %worker_id, "Processing clock-out");
    match state.clock().clock_out(&worker_id, request).await {
        Ok(event) => json_response(StatusCode::CREATED, &event),
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for GET /workers/:worker_id/session.
async fn session_handler(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(worker_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.clock().open_session(&WorkerId::new(worker_id)).await {
        Ok(session) => json_response(StatusCode::OK, &session),
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for GET /workers/:worker_id/intervals.
async fn intervals_handler(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    Path(worker_id): Path<String>,
    query: Result<Query<IntervalsQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
            return ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            )
            .into_response();
        }
    };

    match state
        .clock()
        .intervals(&WorkerId::new(worker_id), query.into())
        .await
    {
        Ok(reconstruction) => json_response(StatusCode::OK, &reconstruction),
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for POST /weekly-hours.
async fn weekly_hours_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<WeeklyHoursBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return json_rejection(rejection, correlation_id).into_response(),
    };

    info!(correlation_id = %correlation_id, actor_id = %actor, entries = body.entries.len(), "Processing weekly hours request");
    match state.weekly().accumulate(&body.entries).await {
        Ok(report) => json_response(StatusCode::OK, &report),
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for PUT /adjustments.
///
/// Returns the stored row, or 204 when a zero amount cleared it.
async fn upsert_adjustment_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<AdjustmentUpsertRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(rejection, correlation_id).into_response(),
    };

    info!(
        correlation_id = %correlation_id,
        actor_id = %actor,
        work_event_id = %request.work_event_id,
        worker_id = %request.worker_id,
        "Processing adjustment"
    );
    match state
        .adjustments()
        .upsert(
            &request.work_event_id,
            &request.worker_id,
            request.amount,
            request.note,
        )
        .await
    {
        Ok(AdjustmentWrite::Stored { adjustment }) => json_response(StatusCode::OK, &adjustment),
        Ok(AdjustmentWrite::Cleared { .. }) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for POST /adjustments/query.
async fn query_adjustments_handler(
    State(state): State<AppState>,
    Actor(_actor): Actor,
    payload: Result<Json<AdjustmentQueryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(rejection, correlation_id).into_response(),
    };

    match state.adjustments().fetch(&request.work_event_ids).await {
        Ok(map) => json_response(StatusCode::OK, &map),
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for POST /payroll/summaries.
async fn payroll_handler(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<PayrollRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(rejection, correlation_id).into_response(),
    };

    info!(correlation_id = %correlation_id, actor_id = %actor, "Processing payroll run");
    match state.payroll().run(request).await {
        Ok(run) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %run.run_id,
                payments = run.payments.len(),
                "Payroll run returned"
            );
            json_response(StatusCode::OK, &run)
        }
        Err(err) => engine_error(err, correlation_id),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error(err: crate::error::EngineError, correlation_id: Uuid) -> Response {
    if err.is_expected() {
        info!(correlation_id = %correlation_id, error = %err, "Request rejected");
    } else {
        warn!(correlation_id = %correlation_id, error = %err, "Request failed");
    }
    ApiErrorResponse::from(err).into_response()
}

/// Parses a body that may be empty, in which case the default is used.
fn parse_optional_body<T: DeserializeOwned + Default>(
    body: &Bytes,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        warn!(correlation_id = %correlation_id, error = %err, "JSON body error");
        let error = if err.is_data() {
            ApiError::validation_error(err.to_string())
        } else {
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        };
        ApiErrorResponse::new(StatusCode::BAD_REQUEST, error)
    })
}

fn json_rejection(rejection: JsonRejection, correlation_id: Uuid) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of what was wrong
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::validation_error(body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, error)
}
