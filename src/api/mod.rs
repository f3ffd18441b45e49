//! HTTP interface - axum router over the core operations.
//!
//! Everything lives under `/api`. Catalogue reads, booking creation, review submission,
//! the contact form and the health check are public. Every other route sits behind
//! [`auth::admin_auth_middleware`].
//! Responses use the JSON envelope `{success, message?, data?, pagination?}`.

pub mod auth;
pub mod backups;
pub mod bookings;
pub mod contact;
pub mod error;
pub mod reviews;
pub mod state;
pub mod tours;

pub use error::AppError;
pub use state::AppState;

use crate::core::pagination::Page;
use axum::{
    Json, Router,
    http::{Method, header},
    middleware,
    routing::get,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Pagination block of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number
    pub current_page: u64,
    /// Last page number
    pub last_page: u64,
    /// Page size
    pub per_page: u64,
    /// Total matching rows
    pub total: u64,
}

/// JSON envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Human-readable outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Present on list responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub const fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    /// Successful response carrying a message and `data`.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            pagination: None,
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Successful list response.
    pub fn page(page: Page<T>) -> Self {
        Self {
            success: true,
            message: None,
            pagination: Some(Pagination {
                current_page: page.current_page,
                last_page: page.last_page,
                per_page: page.per_page,
                total: page.total,
            }),
            data: Some(page.items),
        }
    }
}

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .nest("/api", api_routes(&state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .merge(tours::admin_routes())
        .merge(bookings::admin_routes())
        .merge(reviews::admin_routes())
        .merge(contact::admin_routes())
        .merge(backups::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(tours::public_routes())
        .merge(bookings::public_routes())
        .merge(reviews::public_routes())
        .merge(contact::public_routes())
        .merge(admin)
}

async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("ok"))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use crate::errors::Result;
    use crate::test_utils::setup_test_db;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let app = test_app(setup_test_db().await?);
        let body = expect(send(&app, Method::GET, "/api/health", None, None).await, StatusCode::OK).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() -> Result<()> {
        let app = test_app(setup_test_db().await?);
        let response = send(&app, Method::GET, "/api/nowhere", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
