use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::Visibility;
use crate::models::Lesson;

pub(crate) const LESSON_COLUMNS: &str = "id, course_id, title, sort_order, is_deleted, created_at, updated_at";

pub struct LessonRepository<'a> {
    conn: &'a mut SqliteConnection,
    affected: &'a mut u64,
}

impl<'a> LessonRepository<'a> {
    pub(crate) fn new(conn: &'a mut SqliteConnection, affected: &'a mut u64) -> Self {
        Self { conn, affected }
    }

    pub async fn get_by_id(
        &mut self,
        id: Uuid,
        visibility: Visibility,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM lessons WHERE id = ?{}",
            LESSON_COLUMNS,
            visibility.filter()
        );
        sqlx::query_as::<_, Lesson>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
    }

    pub async fn get_by_course(
        &mut self,
        course_id: Uuid,
        visibility: Visibility,
    ) -> Result<Vec<Lesson>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM lessons WHERE course_id = ?{} ORDER BY sort_order, created_at",
            LESSON_COLUMNS,
            visibility.filter()
        );
        sqlx::query_as::<_, Lesson>(&sql)
            .bind(course_id)
            .fetch_all(&mut *self.conn)
            .await
    }

    /// Whether an active lesson of the course already sits at `order`,
    /// optionally ignoring the lesson being edited.
    pub async fn order_exists(
        &mut self,
        course_id: Uuid,
        order: i32,
        excluding: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let taken: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM lessons
            WHERE course_id = ?1
              AND sort_order = ?2
              AND is_deleted = 0
              AND (?3 IS NULL OR id != ?3)
            LIMIT 1
            "#,
        )
        .bind(course_id)
        .bind(order)
        .bind(excluding)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(taken.is_some())
    }

    pub async fn get_by_order(
        &mut self,
        course_id: Uuid,
        order: i32,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM lessons WHERE course_id = ? AND sort_order = ?{}",
            LESSON_COLUMNS,
            Visibility::Active.filter()
        );
        sqlx::query_as::<_, Lesson>(&sql)
            .bind(course_id)
            .bind(order)
            .fetch_optional(&mut *self.conn)
            .await
    }

    pub async fn add(&mut self, lesson: &Lesson) -> Result<(), sqlx::Error> {
        let result = sqlx::query!(
            "INSERT INTO lessons (id, course_id, title, sort_order, is_deleted, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            lesson.id,
            lesson.course_id,
            lesson.title,
            lesson.order,
            lesson.is_deleted,
            lesson.created_at,
            lesson.updated_at
        )
        .execute(&mut *self.conn)
        .await?;

        *self.affected += result.rows_affected();
        Ok(())
    }

    pub async fn update(&mut self, lesson: &Lesson) -> Result<(), sqlx::Error> {
        let result = sqlx::query!(
            "UPDATE lessons SET title = ?, sort_order = ?, is_deleted = ?, updated_at = ? WHERE id = ?",
            lesson.title,
            lesson.order,
            lesson.is_deleted,
            lesson.updated_at,
            lesson.id
        )
        .execute(&mut *self.conn)
        .await?;

        *self.affected += result.rows_affected();
        Ok(())
    }

    /// Persists two lessons whose orders were exchanged in memory.
    ///
    /// SQLite checks the unique index row by row, so `first` is parked on a
    /// negative slot before `second` moves into the position it vacated.
    pub async fn swap_orders(&mut self, first: &Lesson, second: &Lesson) -> Result<(), sqlx::Error> {
        sqlx::query!("UPDATE lessons SET sort_order = -sort_order WHERE id = ?", first.id)
            .execute(&mut *self.conn)
            .await?;

        self.write_order(second).await?;
        self.write_order(first).await?;
        Ok(())
    }

    async fn write_order(&mut self, lesson: &Lesson) -> Result<(), sqlx::Error> {
        let result = sqlx::query!(
            "UPDATE lessons SET sort_order = ?, updated_at = ? WHERE id = ?",
            lesson.order,
            lesson.updated_at,
            lesson.id
        )
        .execute(&mut *self.conn)
        .await?;

        *self.affected += result.rows_affected();
        Ok(())
    }

    /// Soft-deletes every active lesson of a course; returns how many were hit.
    pub async fn soft_delete_by_course(
        &mut self,
        course_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query!(
            "UPDATE lessons SET is_deleted = 1, updated_at = ? WHERE course_id = ? AND is_deleted = 0",
            at,
            course_id
        )
        .execute(&mut *self.conn)
        .await?;

        let rows = result.rows_affected();
        *self.affected += rows;
        Ok(rows)
    }
}
