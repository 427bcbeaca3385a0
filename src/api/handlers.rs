//! HTTP request handlers for the attendance API.
//!
//! This module contains the handler functions for all API endpoints. Each
//! request gets a correlation id that is attached to every log line it
//! produces.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::{DailyReportRow, build_daily_report};
use crate::config::{PolicyConfig, update_policy};
use crate::error::EngineError;
use crate::models::{Identity, LeaveBalance, LeaveRequest, PunchEvent};
use crate::store::LeaveFilter;

use super::request::{
    DailyReportQuery, DecisionRequest, LeaveApplicationRequest, LeaveListQuery, PunchRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/punches", post(record_punch_handler))
        .route("/attendance/daily", get(daily_report_handler))
        .route("/leaves", post(apply_leave_handler).get(list_leaves_handler))
        .route("/leaves/:id/decision", post(decide_leave_handler))
        .route("/balances/:user_id", get(balance_handler))
        .route("/policy", get(get_policy_handler).put(update_policy_handler))
        .with_state(state)
}

/// Maps a JSON body rejection to a 400 response.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the problem.
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            ApiError::validation_error(body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error)
}

fn query_rejection(correlation_id: Uuid, rejection: QueryRejection) -> ApiErrorResponse {
    warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
    ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
}

fn path_rejection(correlation_id: Uuid, rejection: PathRejection) -> ApiErrorResponse {
    warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path parameter");
    ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
}

/// Logs an engine error against the request and converts it.
fn engine_error(correlation_id: Uuid, operation: &str, error: EngineError) -> ApiErrorResponse {
    warn!(correlation_id = %correlation_id, operation, error = %error, "Request failed");
    error.into()
}

/// Handler for `POST /punches`.
///
/// Records a punch for the caller at the current instant.
async fn record_punch_handler(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<PunchRequest>, JsonRejection>,
) -> ApiResult<PunchEvent> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, user_id = %identity.user_id, "Processing punch");

    let Json(request) = payload.map_err(|r| json_rejection(correlation_id, r))?;
    let location = request.location().map_err(ApiErrorResponse::bad_request)?;

    let event = state
        .recorder()
        .record(&identity.user_id, request.kind, location)
        .map_err(|e| engine_error(correlation_id, "record_punch", e))?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Handler for `GET /attendance/daily`.
///
/// Admins may report on anyone; staff only on themselves.
async fn daily_report_handler(
    State(state): State<AppState>,
    identity: Identity,
    query: Result<Query<DailyReportQuery>, QueryRejection>,
) -> ApiResult<Vec<DailyReportRow>> {
    let correlation_id = Uuid::new_v4();
    let Query(mut query) = query.map_err(|r| query_rejection(correlation_id, r))?;

    if !identity.is_admin() {
        if let Some(user_id) = &query.user_id {
            identity
                .require_self_or_admin(user_id)
                .map_err(|e| engine_error(correlation_id, "daily_report", e))?;
        }
        query.user_id = Some(identity.user_id.clone());
    }
    let filter = query.into_filter().map_err(ApiErrorResponse::bad_request)?;

    let start_time = Instant::now();
    let punches = state
        .store()
        .punches(&filter)
        .map_err(|e| engine_error(correlation_id, "daily_report", e))?;
    let policy = state
        .store()
        .policy()
        .map_err(|e| engine_error(correlation_id, "daily_report", e))?;

    let now = state.clock().now();
    let today = match policy.as_deref() {
        Some(policy) => policy.local_date(now),
        None => now.date_naive(),
    };
    let punch_count = punches.len();
    let rows = build_daily_report(punches, policy.as_deref(), today);

    info!(
        correlation_id = %correlation_id,
        punches = punch_count,
        rows = rows.len(),
        duration_us = start_time.elapsed().as_micros() as u64,
        "Daily report built"
    );
    Ok((StatusCode::OK, Json(rows)))
}

/// Handler for `POST /leaves`.
///
/// Submits a leave application for the caller.
async fn apply_leave_handler(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<LeaveApplicationRequest>, JsonRejection>,
) -> ApiResult<LeaveRequest> {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        user_id = %identity.user_id,
        "Processing leave application"
    );

    let Json(request) = payload.map_err(|r| json_rejection(correlation_id, r))?;
    let request = request
        .into_application(&identity.user_id)
        .and_then(|application| state.ledger().apply(application))
        .map_err(|e| engine_error(correlation_id, "apply_leave", e))?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// Handler for `GET /leaves`.
///
/// Admins may filter freely; staff only see their own requests.
async fn list_leaves_handler(
    State(state): State<AppState>,
    identity: Identity,
    query: Result<Query<LeaveListQuery>, QueryRejection>,
) -> ApiResult<Vec<LeaveRequest>> {
    let correlation_id = Uuid::new_v4();
    let Query(mut query) = query.map_err(|r| query_rejection(correlation_id, r))?;

    if !identity.is_admin() {
        if let Some(user_id) = &query.user_id {
            identity
                .require_self_or_admin(user_id)
                .map_err(|e| engine_error(correlation_id, "list_leaves", e))?;
        }
        query.user_id = Some(identity.user_id.clone());
    }

    let requests = state
        .ledger()
        .requests(&LeaveFilter::from(query))
        .map_err(|e| engine_error(correlation_id, "list_leaves", e))?;

    Ok((StatusCode::OK, Json(requests)))
}

/// Handler for `POST /leaves/:id/decision`.
///
/// Approves or rejects a pending request. Admin only.
async fn decide_leave_handler(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> ApiResult<LeaveRequest> {
    let correlation_id = Uuid::new_v4();
    let Path(id) = id.map_err(|r| path_rejection(correlation_id, r))?;
    info!(
        correlation_id = %correlation_id,
        request_id = %id,
        actor = %identity.user_id,
        "Processing leave decision"
    );

    identity
        .require_admin()
        .map_err(|e| engine_error(correlation_id, "decide_leave", e))?;
    let Json(request) = payload.map_err(|r| json_rejection(correlation_id, r))?;

    let decided = state
        .ledger()
        .decide(id, request.decision, &identity.user_id)
        .map_err(|e| engine_error(correlation_id, "decide_leave", e))?;

    Ok((StatusCode::OK, Json(decided)))
}

/// Handler for `GET /balances/:user_id`.
async fn balance_handler(
    State(state): State<AppState>,
    identity: Identity,
    Path(user_id): Path<String>,
) -> ApiResult<LeaveBalance> {
    let correlation_id = Uuid::new_v4();

    identity
        .require_self_or_admin(&user_id)
        .map_err(|e| engine_error(correlation_id, "balance", e))?;
    let balance = state
        .ledger()
        .balance(&user_id)
        .map_err(|e| engine_error(correlation_id, "balance", e))?;

    Ok((StatusCode::OK, Json(balance)))
}

/// Handler for `GET /policy`.
async fn get_policy_handler(
    State(state): State<AppState>,
    _identity: Identity,
) -> ApiResult<PolicyConfig> {
    let correlation_id = Uuid::new_v4();

    let policy = state
        .store()
        .policy()
        .map_err(|e| engine_error(correlation_id, "get_policy", e))?
        .ok_or_else(|| ApiErrorResponse::not_found("No policy has been configured"))?;

    Ok((StatusCode::OK, Json(PolicyConfig::clone(&policy))))
}

/// Handler for `PUT /policy`.
///
/// Replaces the policy snapshot. Admin only.
async fn update_policy_handler(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<PolicyConfig>, JsonRejection>,
) -> ApiResult<PolicyConfig> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, actor = %identity.user_id, "Processing policy update");

    identity
        .require_admin()
        .map_err(|e| engine_error(correlation_id, "update_policy", e))?;
    let Json(policy) = payload.map_err(|r| json_rejection(correlation_id, r))?;

    let snapshot = update_policy(state.store(), &identity, policy)
        .map_err(|e| engine_error(correlation_id, "update_policy", e))?;

    Ok((StatusCode::OK, Json(PolicyConfig::clone(&snapshot))))
}
