use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::{CourseRepository, LessonRepository};

/// A batch of staged writes committed together by `save_changes`.
///
/// Every write made through `courses()` or `lessons()` runs inside one
/// transaction. Dropping the unit of work without saving rolls all of them
/// back, so an early return or `?` never leaves a partial change behind.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    affected: u64,
}

impl UnitOfWork {
    /// Starts a unit of work that will write.
    ///
    /// The write lock is taken up front. A deferred transaction that reads
    /// first cannot upgrade a stale WAL snapshot and fails with SQLITE_BUSY
    /// without waiting, whereas `BEGIN IMMEDIATE` queues on the busy timeout.
    pub async fn begin(db: &SqlitePool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: db.begin_with("BEGIN IMMEDIATE").await?,
            affected: 0,
        })
    }

    /// Starts a read-only unit of work that never blocks writers.
    pub async fn read(db: &SqlitePool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: db.begin().await?,
            affected: 0,
        })
    }

    pub fn courses(&mut self) -> CourseRepository<'_> {
        CourseRepository::new(&mut self.tx, &mut self.affected)
    }

    pub fn lessons(&mut self) -> LessonRepository<'_> {
        LessonRepository::new(&mut self.tx, &mut self.affected)
    }

    /// Commits the staged writes and returns the number of rows they touched.
    pub async fn save_changes(self) -> Result<u64, sqlx::Error> {
        self.tx.commit().await?;
        Ok(self.affected)
    }
}
