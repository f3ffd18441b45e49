use crate::api::{ApiResponse, AppError, AppState};
use crate::core::{
    pagination::PageRequest,
    review::{self, NewReview, RatingSummary, ReviewChanges},
};
use crate::entities::review::Model as Review;
use crate::errors::Error;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

const DEFAULT_REVIEWS_PER_PAGE: u64 = 10;

/// Query string of `GET /reviews`
#[derive(Debug, Default, Deserialize)]
struct ReviewQuery {
    tour_id: Option<i64>,
    page: Option<u64>,
    per_page: Option<u64>,
}

/// `GET|POST /reviews`, `GET /reviews/{id}`, `GET /tours/{id}/rating-summary`
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/{id}", get(show_review))
        .route("/tours/{id}/rating-summary", get(rating_summary))
}

/// `PUT /reviews/{id}`, `DELETE /reviews/{id}`
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/reviews/{id}", put(update_review).delete(delete_review))
}

async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let tour_id = query
        .tour_id
        .ok_or_else(|| Error::validation("tour_id is required"))?;
    let request = PageRequest::new(
        query.page,
        Some(query.per_page.unwrap_or(DEFAULT_REVIEWS_PER_PAGE)),
    );
    let page = review::list_reviews(&state.db, tour_id, request).await?;
    Ok(Json(ApiResponse::page(page)))
}

async fn create_review(
    State(state): State<AppState>,
    Json(input): Json<NewReview>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), AppError> {
    let review = review::create_review(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Review submitted successfully. It will be published after approval.",
            review,
        )),
    ))
}

async fn show_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = review::get_review(&state.db, id).await?;
    Ok(Json(ApiResponse::data(review)))
}

async fn rating_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RatingSummary>>, AppError> {
    let summary = review::rating_summary(&state.db, id).await?;
    Ok(Json(ApiResponse::data(summary)))
}

async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<ReviewChanges>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = review::update_review(&state.db, id, changes).await?;
    Ok(Json(ApiResponse::with_message(
        "Review updated successfully",
        review,
    )))
}

async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    review::delete_review(&state.db, id).await?;
    Ok(Json(ApiResponse::message("Review deleted successfully")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::*;
    use crate::errors::Result;
    use crate::test_utils::{create_test_review, create_test_tour, setup_test_db};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_review_lifecycle_over_http() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_test_tour(&db, "Safari", 100).await?;
        let app = test_app(db);

        let body = expect(
            send(
                &app,
                Method::POST,
                "/api/reviews",
                None,
                Some(json!({
                    "tour_id": tour.id,
                    "author": "Amina",
                    "email": "amina@example.com",
                    "rating": 4,
                    "comment": "Saw the big five on day two"
                })),
            )
            .await,
            StatusCode::CREATED,
        )
        .await;
        assert_eq!(
            body["message"],
            "Review submitted successfully. It will be published after approval."
        );
        assert_eq!(body["data"]["is_verified"], false);
        assert!(body["data"].get("email").is_none());
        let id = body["data"]["id"].as_i64().unwrap();

        let body = expect(
            send(&app, Method::GET, &format!("/api/tours/{}", tour.id), None, None).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["data"]["rating"], 4.0);
        assert_eq!(body["data"]["reviews_count"], 1);

        let uri = format!("/api/reviews/{id}");
        let response = send(&app, Method::PUT, &uri, None, Some(json!({"is_approved": false}))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = expect(
            send(
                &app,
                Method::PUT,
                &uri,
                Some(ADMIN_TOKEN),
                Some(json!({"is_approved": false})),
            )
            .await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["message"], "Review updated successfully");
        assert_eq!(body["data"]["is_approved"], false);

        let body = expect(
            send(
                &app,
                Method::GET,
                &format!("/api/reviews?tour_id={}", tour.id),
                None,
                None,
            )
            .await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["pagination"]["total"], 0);
        assert_eq!(body["pagination"]["per_page"], 10);

        let body = expect(
            send(&app, Method::DELETE, &uri, Some(ADMIN_TOKEN), None).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["message"], "Review deleted successfully");
        let response = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_rating_summary_over_http() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_test_tour(&db, "Safari", 100).await?;
        for stars in [5, 4, 4] {
            create_test_review(&db, tour.id, stars).await?;
        }
        let app = test_app(db);

        let body = expect(
            send(
                &app,
                Method::GET,
                &format!("/api/tours/{}/rating-summary", tour.id),
                None,
                None,
            )
            .await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["data"]["tour_id"], tour.id);
        assert_eq!(body["data"]["average_rating"], 4.3);
        assert_eq!(body["data"]["total_reviews"], 3);
        assert_eq!(
            body["data"]["rating_distribution"],
            json!({"1": 0, "2": 0, "3": 0, "4": 2, "5": 1})
        );

        let response = send(&app, Method::GET, "/api/tours/4040/rating-summary", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_review_input_is_validated() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_test_tour(&db, "Safari", 100).await?;
        let app = test_app(db);

        let response = send(&app, Method::GET, "/api/reviews", None, None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = expect(
            send(
                &app,
                Method::POST,
                "/api/reviews",
                None,
                Some(json!({
                    "tour_id": tour.id,
                    "author": "Amina",
                    "email": "amina@example.com",
                    "rating": 6,
                    "comment": "Saw the big five on day two"
                })),
            )
            .await,
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .await;
        assert_eq!(body["success"], false);
        Ok(())
    }
}
