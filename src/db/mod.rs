pub mod course_repository;
pub mod lesson_repository;
pub mod unit_of_work;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::AppError;

pub use course_repository::CourseRepository;
pub use lesson_repository::LessonRepository;
pub use unit_of_work::UnitOfWork;

/// Soft-delete predicate applied explicitly by every read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Active,
    IncludeDeleted,
}

impl Visibility {
    pub(crate) fn filter(self) -> &'static str {
        match self {
            Visibility::Active => " AND is_deleted = 0",
            Visibility::IncludeDeleted => "",
        }
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Opens the pool and brings the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if is_in_memory(&config.url) {
        // an in-memory database lives and dies with its connection
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database ready at {}", config.url);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://:memory:"));
        assert!(is_in_memory("sqlite://file.db?mode=memory"));
        assert!(!is_in_memory("sqlite://courseplatform.db"));
    }

    #[tokio::test]
    async fn test_connect_runs_migrations() {
        let pool = connect(&DatabaseConfig::in_memory())
            .await
            .expect("Failed to create test db");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('courses', 'lessons') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("Failed to list tables");

        assert_eq!(tables, vec!["courses".to_string(), "lessons".to_string()]);
    }
}
