use std::sync::Arc;

use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(db: SqlitePool, api_token: Option<String>) -> Self {
        Self {
            db,
            api_token: api_token.map(Arc::from),
        }
    }
}
