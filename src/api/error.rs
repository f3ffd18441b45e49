use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Error returned by handlers and middleware
#[derive(Debug)]
pub enum AppError {
    /// Missing or rejected admin token
    Unauthenticated(&'static str),
    /// Failure from the core layer
    Core(Error),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self::Core(err)
    }
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            Self::Unauthenticated(message) => (StatusCode::UNAUTHORIZED, message.to_string()),
            Self::Core(err) => match err {
                Error::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                Error::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
                Error::AlreadyRestored { .. } | Error::MissingSnapshotData { .. } => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                other => {
                    error!("Internal Server Error: {other}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(json!({
            "success": false,
            "message": message,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::from(Error::NotFound {
                    entity: "Booking",
                    id: 3,
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(Error::validation("adults must be at least 1")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(Error::AlreadyRestored { id: 1 }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(Error::MissingSnapshotData { id: 1 }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(Error::Database(DbErr::Custom("disk full".to_string()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Unauthenticated("Invalid authentication token."),
                StatusCode::UNAUTHORIZED,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let (_, message) =
            AppError::from(Error::Database(DbErr::Custom("secret path".to_string())))
                .status_and_message();
        assert_eq!(message, "Internal Server Error");
    }
}
