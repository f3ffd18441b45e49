use crate::api::{ApiResponse, AppError, AppState};
use crate::core::{
    backup::{self, BackupDetails, BackupFilter},
    pagination::PageRequest,
    restore::{self, RestoreOutcome},
};
use crate::entities::booking_backup::{BackupType, Model as Backup};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BookingBackupRequest {
    booking_id: i64,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TourBackupRequest {
    tour_id: i64,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AutoBackupRequest {
    booking_id: i64,
}

#[derive(Debug, Default, Deserialize)]
struct BackupQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    #[serde(rename = "type", alias = "backup_type")]
    backup_type: Option<BackupType>,
    booking_id: Option<i64>,
    tour_id: Option<i64>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

/// Backup management routes, all admin-only
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/backups", get(list_backups))
        .route("/backups/booking", post(create_booking_backup))
        .route("/backups/tour", post(create_tour_backup))
        .route("/backups/auto-backup", post(auto_backup))
        .route("/backups/{id}", get(show_backup).delete(delete_backup))
        .route("/backups/{id}/restore", post(restore_backup))
}

async fn create_booking_backup(
    State(state): State<AppState>,
    Json(request): Json<BookingBackupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Backup>>), AppError> {
    let backup =
        backup::create_booking_backup(&state.db, request.booking_id, request.reason.as_deref())
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Backup created successfully", backup)),
    ))
}

async fn create_tour_backup(
    State(state): State<AppState>,
    Json(request): Json<TourBackupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Backup>>), AppError> {
    let backup =
        backup::create_tour_backup(&state.db, request.tour_id, request.reason.as_deref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Tour backup created successfully",
            backup,
        )),
    ))
}

async fn auto_backup(
    State(state): State<AppState>,
    Json(request): Json<AutoBackupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Backup>>), AppError> {
    let backup = backup::create_auto_backup(&state.db, request.booking_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Auto-backup created before update",
            backup,
        )),
    ))
}

async fn list_backups(
    State(state): State<AppState>,
    Query(query): Query<BackupQuery>,
) -> Result<Json<ApiResponse<Vec<Backup>>>, AppError> {
    let filter = BackupFilter {
        backup_type: query.backup_type,
        booking_id: query.booking_id,
        tour_id: query.tour_id,
        date_from: query.date_from,
        date_to: query.date_to,
    };
    let page = backup::list_backups(
        &state.db,
        &filter,
        PageRequest::new(query.page, query.per_page),
    )
    .await?;
    Ok(Json(ApiResponse::page(page)))
}

async fn show_backup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<BackupDetails>>, AppError> {
    let details = backup::get_backup_details(&state.db, id).await?;
    Ok(Json(ApiResponse::data(details)))
}

async fn restore_backup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RestoreOutcome>>, AppError> {
    let outcome = restore::restore_backup(&state.db, id).await?;
    Ok(Json(ApiResponse::with_message(
        "Backup restored successfully",
        outcome,
    )))
}

async fn delete_backup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    backup::delete_backup(&state.db, id).await?;
    Ok(Json(ApiResponse::message("Backup deleted successfully")))
}
