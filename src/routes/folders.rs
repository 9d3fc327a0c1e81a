// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run and lift folder routes: folder CRUD, appends and edits.

use crate::error::{AppError, Result};
use crate::models::{
    Exercise, ExercisePatch, FolderKind, FolderSummary, LiftDay, NewRun, RunEntry, RunPatch,
    Session,
};
use crate::services::{group_by_date, DateGroup, ExerciseAddress, RunAddress};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Folder routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/run-folders",
            get(list_run_folders).post(create_run_folder),
        )
        .route(
            "/api/run-folders/{folder_id}",
            get(get_run_folder).delete(delete_run_folder),
        )
        .route(
            "/api/run-folders/{folder_id}/runs",
            post(append_run).patch(update_run_at),
        )
        .route(
            "/api/run-folders/{folder_id}/runs/{run_id}",
            patch(update_run_by_id),
        )
        .route(
            "/api/lift-folders",
            get(list_lift_folders).post(create_lift_folder),
        )
        .route(
            "/api/lift-folders/{folder_id}",
            get(get_lift_folder).delete(delete_lift_folder),
        )
        .route(
            "/api/lift-folders/{folder_id}/workouts",
            post(append_lift).patch(update_lift_at),
        )
        .route(
            "/api/lift-folders/{folder_id}/exercises/{exercise_id}",
            patch(update_lift_by_id),
        )
}

// ─── Shared Shapes ───────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolderRequest {
    #[serde(default)]
    folder_name: String,
}

/// Plain acknowledgement.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Result of an edit: `{success: true, entry}` or `{success: false, message}`.
#[derive(Serialize)]
pub struct EditResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<T>,
}

fn edit_response<T: Serialize>(result: Result<T>, fallback: &str) -> Response {
    match result {
        Ok(entry) => Json(EditResponse {
            success: true,
            message: None,
            entry: Some(entry),
        })
        .into_response(),
        Err(err) => {
            let (status, _) = err.status_and_code();
            let message = err.user_message().unwrap_or_else(|| fallback.to_string());
            (
                status,
                Json(EditResponse::<T> {
                    success: false,
                    message: Some(message),
                    entry: None,
                }),
            )
                .into_response()
        }
    }
}

/// Unwrap an edit body, turning a malformed one into a validation error.
fn edit_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected edit body");
        AppError::Validation(rejection.body_text())
    })
}

/// A folder with its entries grouped by date, newest first.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDetailResponse<T> {
    pub id: String,
    pub folder_name: String,
    pub created_at: String,
    pub revision: u64,
    pub groups: Vec<DateGroup<T>>,
}

async fn create_folder(
    state: &AppState,
    session: &Session,
    kind: FolderKind,
    request: CreateFolderRequest,
) -> Result<(StatusCode, Json<FolderSummary>)> {
    let folder = state
        .folders
        .create_folder(session, kind, &request.folder_name)
        .await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

// ─── Run Folders ─────────────────────────────────────────────

async fn list_run_folders(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<FolderSummary>>> {
    Ok(Json(
        state.folders.list_folders(&session, FolderKind::Run).await?,
    ))
}

async fn create_run_folder(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderSummary>)> {
    create_folder(&state, &session, FolderKind::Run, request).await
}

async fn get_run_folder(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(folder_id): Path<String>,
) -> Result<Json<FolderDetailResponse<RunEntry>>> {
    let folder = state.folders.get_run_folder(&session, &folder_id).await?;
    Ok(Json(FolderDetailResponse {
        id: folder.id,
        folder_name: folder.folder_name,
        created_at: folder.created_at,
        revision: folder.revision,
        groups: group_by_date(folder.runs),
    }))
}

async fn delete_run_folder(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(folder_id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state
        .folders
        .delete_folder(&session, FolderKind::Run, &folder_id)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn append_run(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(folder_id): Path<String>,
    Json(run): Json<NewRun>,
) -> Result<(StatusCode, Json<RunEntry>)> {
    let entry = state.appender.append_run(&session, &folder_id, run).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Edit addressed by the run's position among runs on the same date.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionalRunEdit {
    run_date: String,
    run_index: usize,
    #[serde(default)]
    updated_run_data: RunPatch,
}

async fn update_run_at(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(folder_id): Path<String>,
    body: std::result::Result<Json<PositionalRunEdit>, JsonRejection>,
) -> Response {
    let edit = match edit_body(body) {
        Ok(edit) => edit,
        Err(err) => return edit_response::<RunEntry>(Err(err), "Error updating run."),
    };
    let address = RunAddress::Occurrence {
        run_date: edit.run_date,
        run_index: edit.run_index,
    };
    let result = state
        .editor
        .update_run(&session, &folder_id, &address, edit.updated_run_data)
        .await;
    edit_response(result, "Error updating run.")
}

async fn update_run_by_id(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((folder_id, run_id)): Path<(String, String)>,
    body: std::result::Result<Json<RunPatch>, JsonRejection>,
) -> Response {
    let patch = match edit_body(body) {
        Ok(patch) => patch,
        Err(err) => return edit_response::<RunEntry>(Err(err), "Error updating run."),
    };
    let result = state
        .editor
        .update_run(&session, &folder_id, &RunAddress::Id(run_id), patch)
        .await;
    edit_response(result, "Error updating run.")
}

// ─── Lift Folders ────────────────────────────────────────────

async fn list_lift_folders(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<FolderSummary>>> {
    Ok(Json(
        state.folders.list_folders(&session, FolderKind::Lift).await?,
    ))
}

async fn create_lift_folder(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderSummary>)> {
    create_folder(&state, &session, FolderKind::Lift, request).await
}

async fn get_lift_folder(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(folder_id): Path<String>,
) -> Result<Json<FolderDetailResponse<Exercise>>> {
    let folder = state.folders.get_lift_folder(&session, &folder_id).await?;
    Ok(Json(FolderDetailResponse {
        id: folder.id,
        folder_name: folder.folder_name,
        created_at: folder.created_at,
        revision: folder.revision,
        groups: group_by_date(folder.exercises),
    }))
}

async fn delete_lift_folder(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(folder_id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state
        .folders
        .delete_folder(&session, FolderKind::Lift, &folder_id)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn append_lift(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(folder_id): Path<String>,
    Json(day): Json<LiftDay>,
) -> Result<(StatusCode, Json<LiftDay>)> {
    let day = state.appender.append_lift(&session, &folder_id, day).await?;
    Ok((StatusCode::CREATED, Json(day)))
}

/// Edit addressed by date group and position within it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionalLiftEdit {
    lift_date: String,
    lift_index: usize,
    #[serde(default)]
    updated_lift_data: ExercisePatch,
}

async fn update_lift_at(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(folder_id): Path<String>,
    body: std::result::Result<Json<PositionalLiftEdit>, JsonRejection>,
) -> Response {
    let edit = match edit_body(body) {
        Ok(edit) => edit,
        Err(err) => return edit_response::<Exercise>(Err(err), "Error updating lift."),
    };
    let address = ExerciseAddress::Position {
        lift_date: edit.lift_date,
        lift_index: edit.lift_index,
    };
    let result = state
        .editor
        .update_lift(&session, &folder_id, &address, edit.updated_lift_data)
        .await;
    edit_response(result, "Error updating lift.")
}

async fn update_lift_by_id(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((folder_id, exercise_id)): Path<(String, String)>,
    body: std::result::Result<Json<ExercisePatch>, JsonRejection>,
) -> Response {
    let patch = match edit_body(body) {
        Ok(patch) => patch,
        Err(err) => return edit_response::<Exercise>(Err(err), "Error updating lift."),
    };
    let result = state
        .editor
        .update_lift(
            &session,
            &folder_id,
            &ExerciseAddress::Id(exercise_id),
            patch,
        )
        .await;
    edit_response(result, "Error updating lift.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_edit_hides_store_details() {
        let response = edit_response::<RunEntry>(
            Err(AppError::Database("deadline exceeded".into())),
            "Error updating run.",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rejected_edit_is_a_validation_error() {
        let response = edit_response::<RunEntry>(
            Err(AppError::Validation("missing field `runIndex`".into())),
            "Error updating run.",
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_positional_edit_body() {
        let edit: PositionalRunEdit = serde_json::from_value(serde_json::json!({
            "runDate": "2024-05-01",
            "runIndex": 1,
            "updatedRunData": { "notes": "hills" }
        }))
        .unwrap();
        assert_eq!(edit.run_index, 1);
        assert_eq!(edit.updated_run_data.notes.as_deref(), Some("hills"));
    }
}
