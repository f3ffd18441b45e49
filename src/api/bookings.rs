use crate::api::{ApiResponse, AppError, AppState};
use crate::core::{
    booking::{self, BookingChanges, BookingCreated, BookingFilter, NewBooking},
    pagination::PageRequest,
};
use crate::entities::{booking::BookingStatus, booking::Model as Booking, tour::Model as Tour};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

const CREATED_MESSAGE: &str =
    "Booking created successfully. A confirmation email has been sent to your email address.";
const CREATED_WITHOUT_EMAIL_MESSAGE: &str = "Booking created successfully, but we encountered an issue sending the confirmation email. Please contact support for assistance.";

#[derive(Debug, Default, Deserialize)]
struct BookingQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    status: Option<BookingStatus>,
    tour_id: Option<i64>,
    email: Option<String>,
}

/// A booking with its tour, as returned by `GET /bookings/{id}`
#[derive(Debug, Serialize)]
struct BookingWithTour {
    #[serde(flatten)]
    booking: Booking,
    tour: Option<Tour>,
}

/// `POST /bookings`
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/bookings", post(create_booking))
}

/// `GET /bookings`, `GET|PUT|DELETE /bookings/{id}`
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/bookings", get(list_bookings)).route(
        "/bookings/{id}",
        get(show_booking).put(update_booking).delete(delete_booking),
    )
}

async fn create_booking(
    State(state): State<AppState>,
    Json(input): Json<NewBooking>,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreated>>), AppError> {
    let created =
        booking::create_booking(&state.db, state.notifier.as_ref(), state.delivery, input).await?;
    let message = if created.notification_sent {
        CREATED_MESSAGE
    } else {
        CREATED_WITHOUT_EMAIL_MESSAGE
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(message, created)),
    ))
}

async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let filter = BookingFilter {
        status: query.status,
        tour_id: query.tour_id,
        email: query.email.filter(|email| !email.trim().is_empty()),
    };
    let page = booking::list_bookings(
        &state.db,
        &filter,
        PageRequest::new(query.page, query.per_page),
    )
    .await?;
    Ok(Json(ApiResponse::page(page)))
}

async fn show_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<BookingWithTour>>, AppError> {
    let (booking, tour) = booking::get_booking_with_tour(&state.db, id).await?;
    Ok(Json(ApiResponse::data(BookingWithTour { booking, tour })))
}

async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<BookingChanges>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let booking = booking::update_booking(&state.db, id, changes).await?;
    Ok(Json(ApiResponse::with_message(
        "Booking updated successfully",
        booking,
    )))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    booking::delete_booking(&state.db, id).await?;
    Ok(Json(ApiResponse::message("Booking deleted successfully")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::*;
    use crate::errors::Result;
    use crate::test_utils::{create_test_tour, setup_test_db};
    use axum::http::{Method, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn booking_body(tour_id: i64) -> serde_json::Value {
        json!({
            "tour_id": tour_id,
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "+255 700 000 000",
            "booking_date": (Utc::now().date_naive() + Duration::days(14)).to_string(),
            "adults": 2,
            "children": 1
        })
    }

    #[tokio::test]
    async fn test_public_booking_then_admin_edit() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_test_tour(&db, "Safari", 100).await?;
        let app = test_app(db);

        let body = expect(
            send(&app, Method::POST, "/api/bookings", None, Some(booking_body(tour.id))).await,
            StatusCode::CREATED,
        )
        .await;
        assert!(body["message"].as_str().unwrap().contains("confirmation email has been sent"));
        assert_eq!(body["data"]["notification_sent"], true);
        assert_eq!(body["data"]["booking"]["total_amount"], 250.0);
        assert_eq!(body["data"]["booking"]["status"], "confirmed");
        let id = body["data"]["booking"]["id"].as_i64().unwrap();

        let body = expect(
            send(
                &app,
                Method::PUT,
                &format!("/api/bookings/{id}"),
                Some(ADMIN_TOKEN),
                Some(json!({"adults": 3})),
            )
            .await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["data"]["total_amount"], 350.0);

        let body = expect(
            send(&app, Method::GET, &format!("/api/bookings/{id}"), Some(ADMIN_TOKEN), None).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["data"]["adults"], 3);
        assert_eq!(body["data"]["tour"]["id"], tour.id);

        let body = expect(
            send(&app, Method::GET, "/api/bookings?status=confirmed", Some(ADMIN_TOKEN), None)
                .await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["pagination"]["total"], 1);

        expect(
            send(&app, Method::DELETE, &format!("/api/bookings/{id}"), Some(ADMIN_TOKEN), None)
                .await,
            StatusCode::OK,
        )
        .await;
        let response =
            send(&app, Method::GET, &format!("/api/bookings/{id}"), Some(ADMIN_TOKEN), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_booking_validation_over_http() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_test_tour(&db, "Safari", 100).await?;
        let app = test_app(db);

        let mut body = booking_body(tour.id);
        body["adults"] = json!(0);
        let response = send(&app, Method::POST, "/api/bookings", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = send(&app, Method::POST, "/api/bookings", None, Some(booking_body(999))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
