// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::clear_session_cookie;
use crate::models::run::estimate_duration;
use crate::models::{NewWeight, Session, User, WeightRecord};
use crate::routes::folders::SuccessResponse;
use crate::services::{group_by_date, DateGroup, PurgeReport};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/weights", get(list_weights).post(add_weight))
        .route("/api/weights/{record_id}", delete(delete_weight))
        .route("/api/runs/estimate", get(estimate_run))
        .route("/api/account", delete(delete_account))
}

// ─── User Profile ────────────────────────────────────────────

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<User>> {
    Ok(Json(state.sessions.profile(&session).await?))
}

// ─── Weight Log ──────────────────────────────────────────────

/// Weight records as stored (oldest first) and grouped for display (newest first).
#[derive(Serialize)]
pub struct WeightsResponse {
    pub records: Vec<WeightRecord>,
    pub groups: Vec<DateGroup<WeightRecord>>,
}

async fn list_weights(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<WeightsResponse>> {
    let records = state.weights.list_weights(&session).await?;
    let groups = group_by_date(records.clone());
    Ok(Json(WeightsResponse { records, groups }))
}

async fn add_weight(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(weight): Json<NewWeight>,
) -> Result<(StatusCode, Json<WeightRecord>)> {
    let record = state.weights.add_weight(&session, weight).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_weight(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(record_id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.weights.delete_weight(&session, &record_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ─── Run Estimate ────────────────────────────────────────────

#[derive(Deserialize)]
struct EstimateQuery {
    /// Kilometers
    distance: f64,
    /// Minutes and seconds per km
    pace: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EstimateResponse {
    pub duration: String,
}

/// Elapsed time for a distance at a pace, as shown on the run share card.
async fn estimate_run(Query(query): Query<EstimateQuery>) -> Result<Json<EstimateResponse>> {
    let duration = estimate_duration(query.distance, &query.pace).ok_or_else(|| {
        AppError::Validation("Distance must be non-negative and pace in x:xx format.".to_string())
    })?;
    Ok(Json(EstimateResponse { duration }))
}

// ─── Account Deletion ────────────────────────────────────────

#[derive(Deserialize)]
struct DeleteAccountRequest {
    #[serde(default)]
    password: String,
}

/// Response for account deletion.
#[derive(Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
    pub deleted: PurgeReport,
}

/// Re-authenticate, then delete every folder, weight record, the user
/// document and the identity. The session cookie is cleared on success.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<(CookieJar, Json<DeleteAccountResponse>)> {
    tracing::info!(user_id = %session.user_id, "User-initiated account deletion");

    let report = state
        .purge
        .delete_account(Some(&session), &request.password)
        .await?;

    Ok((
        clear_session_cookie(jar, state.config.secure_cookies()),
        Json(DeleteAccountResponse {
            success: true,
            message: "Your account and all data have been deleted.".to_string(),
            deleted: report,
        }),
    ))
}
