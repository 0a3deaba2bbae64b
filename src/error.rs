use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const REORDER_IMPOSSIBLE: &str = "Cannot reorder lesson";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot reorder lesson")]
    ReorderImpossible,

    #[error("Unauthorized")]
    Unauthorized,
}

impl AppError {
    /// Maps a unique-index violation onto `Conflict`, leaving every other
    /// storage failure untouched.
    pub fn from_write(err: sqlx::Error, conflict_message: impl FnOnce() -> String) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(conflict_message())
            }
            _ => AppError::Database(err),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::ReorderImpossible => {
                (StatusCode::BAD_REQUEST, REORDER_IMPOSSIBLE.to_string())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("taken".into()), StatusCode::CONFLICT),
            (AppError::ReorderImpossible, StatusCode::BAD_REQUEST),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_from_write_keeps_non_unique_errors() {
        let err = AppError::from_write(sqlx::Error::RowNotFound, || "taken".to_string());
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_from_write_turns_unique_violation_into_conflict() {
        use crate::config::DatabaseConfig;
        use crate::db::{self, UnitOfWork};
        use crate::models::{Course, Lesson};
        use crate::models::lesson::order_taken_message;

        let pool = db::connect(&DatabaseConfig::in_memory())
            .await
            .expect("Failed to create test db");
        let course = Course::new("Operating Systems".to_string());

        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        uow.courses().add(&course).await.unwrap();
        uow.lessons()
            .add(&Lesson::new(course.id, "Processes".to_string(), 1))
            .await
            .unwrap();
        uow.save_changes().await.unwrap();

        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        let raw = uow
            .lessons()
            .add(&Lesson::new(course.id, "Threads".to_string(), 1))
            .await
            .unwrap_err();

        let err = AppError::from_write(raw, || order_taken_message(1));
        assert!(
            matches!(err, AppError::Conflict(ref msg) if msg == "Order 1 already exists in this course")
        );
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
