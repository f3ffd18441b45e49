use crate::api::{ApiResponse, AppError, AppState, auth};
use crate::core::{
    pagination::PageRequest,
    tour::{self, NewTour, TourChanges, TourFilter},
};
use crate::entities::tour::Model as Tour;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
};
use serde::Deserialize;

/// Query string of `GET /tours`
#[derive(Debug, Default, Deserialize)]
struct TourQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    featured: Option<bool>,
    tour_type: Option<String>,
    location: Option<String>,
    search: Option<String>,
}

/// `GET /tours`, `GET /tours/{id}`
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/tours", get(list_tours))
        .route("/tours/{id}", get(show_tour))
}

/// `POST /tours`, `PUT /tours/{id}`, `DELETE /tours/{id}`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/tours", post(create_tour))
        .route("/tours/{id}", put(update_tour).delete(delete_tour))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn list_tours(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TourQuery>,
) -> Result<Json<ApiResponse<Vec<Tour>>>, AppError> {
    let filter = TourFilter {
        featured: query.featured.unwrap_or(false),
        tour_type: non_blank(query.tour_type),
        location: non_blank(query.location),
        search: non_blank(query.search),
        include_inactive: auth::is_admin(&state, &headers),
    };
    let page = tour::list_tours(
        &state.db,
        &filter,
        PageRequest::new(query.page, query.per_page),
    )
    .await?;
    Ok(Json(ApiResponse::page(page)))
}

async fn show_tour(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Tour>>, AppError> {
    let include_inactive = auth::is_admin(&state, &headers);
    let tour = tour::get_tour(&state.db, id, include_inactive).await?;
    Ok(Json(ApiResponse::data(tour)))
}

async fn create_tour(
    State(state): State<AppState>,
    Json(input): Json<NewTour>,
) -> Result<(StatusCode, Json<ApiResponse<Tour>>), AppError> {
    let tour = tour::create_tour(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Tour created successfully", tour)),
    ))
}

async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<TourChanges>,
) -> Result<Json<ApiResponse<Tour>>, AppError> {
    let tour = tour::update_tour(&state.db, id, changes).await?;
    Ok(Json(ApiResponse::with_message("Tour updated successfully", tour)))
}

async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    tour::delete_tour(&state.db, id).await?;
    Ok(Json(ApiResponse::message("Tour deleted successfully")))
}
