use crate::api::{ApiResponse, AppError, AppState};
use crate::core::{
    contact::{self, ContactFilter, ContactSortField, NewContactSubmission},
    pagination::PageRequest,
};
use crate::entities::contact_submission::Model as ContactSubmission;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string of `GET /contact-submissions`
#[derive(Debug, Default, Deserialize)]
struct ContactQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    search: Option<String>,
    sort_by: Option<ContactSortField>,
    #[serde(default)]
    sort_order: SortOrder,
}

/// `POST /contact-submissions`
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/contact-submissions", post(create_submission))
}

/// `GET /contact-submissions`, `GET /contact-submissions/{id}`,
/// `POST /contact-submissions/{id}/mark-as-read`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/contact-submissions", get(list_submissions))
        .route("/contact-submissions/{id}", get(show_submission))
        .route("/contact-submissions/{id}/mark-as-read", post(mark_as_read))
}

async fn create_submission(
    State(state): State<AppState>,
    Json(input): Json<NewContactSubmission>,
) -> Result<(StatusCode, Json<ApiResponse<ContactSubmission>>), AppError> {
    let submission = contact::create_submission(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Thank you for your message. We will get back to you soon!",
            submission,
        )),
    ))
}

async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ContactQuery>,
) -> Result<Json<ApiResponse<Vec<ContactSubmission>>>, AppError> {
    let filter = ContactFilter {
        search: query.search,
        sort_by: query.sort_by,
        descending: query.sort_order == SortOrder::Desc,
    };
    let page = contact::list_submissions(
        &state.db,
        &filter,
        PageRequest::new(query.page, query.per_page),
    )
    .await?;
    Ok(Json(ApiResponse::page(page)))
}

async fn show_submission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ContactSubmission>>, AppError> {
    let submission = contact::get_submission(&state.db, id).await?;
    Ok(Json(ApiResponse::data(submission)))
}

async fn mark_as_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ContactSubmission>>, AppError> {
    let submission = contact::mark_as_read(&state.db, id).await?;
    Ok(Json(ApiResponse::with_message(
        "Submission marked as read",
        submission,
    )))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::*;
    use crate::errors::Result;
    use crate::test_utils::setup_test_db;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_contact_submission_over_http() -> Result<()> {
        let app = test_app(setup_test_db().await?);

        let body = expect(
            send(
                &app,
                Method::POST,
                "/api/contact-submissions",
                None,
                Some(json!({
                    "name": "Jane Doe",
                    "email": "jane@example.com",
                    "message": "Do you have a Zanzibar extension?"
                })),
            )
            .await,
            StatusCode::CREATED,
        )
        .await;
        assert_eq!(
            body["message"],
            "Thank you for your message. We will get back to you soon!"
        );
        assert!(body["data"]["read_at"].is_null());
        let id = body["data"]["id"].as_i64().unwrap();

        let response = send(&app, Method::GET, "/api/contact-submissions", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = expect(
            send(
                &app,
                Method::GET,
                "/api/contact-submissions?search=zanzibar&sort_by=name&sort_order=desc",
                Some(ADMIN_TOKEN),
                None,
            )
            .await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["pagination"]["total"], 1);

        let body = expect(
            send(
                &app,
                Method::POST,
                &format!("/api/contact-submissions/{id}/mark-as-read"),
                Some(ADMIN_TOKEN),
                None,
            )
            .await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["message"], "Submission marked as read");
        assert!(body["data"]["read_at"].is_string());

        let body = expect(
            send(
                &app,
                Method::GET,
                &format!("/api/contact-submissions/{id}"),
                Some(ADMIN_TOKEN),
                None,
            )
            .await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["data"]["name"], "Jane Doe");
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_contact_message_is_422() -> Result<()> {
        let app = test_app(setup_test_db().await?);
        let response = send(
            &app,
            Method::POST,
            "/api/contact-submissions",
            None,
            Some(json!({"name": "Jane", "email": "jane@example.com", "message": " "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }
}
