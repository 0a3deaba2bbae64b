use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::db::Visibility;
use crate::db::lesson_repository::LESSON_COLUMNS;
use crate::models::{Course, CourseQuery, Lesson};

const COURSE_COLUMNS: &str = "id, title, status, is_deleted, created_at, updated_at";

pub struct CourseRepository<'a> {
    conn: &'a mut SqliteConnection,
    affected: &'a mut u64,
}

impl<'a> CourseRepository<'a> {
    pub(crate) fn new(conn: &'a mut SqliteConnection, affected: &'a mut u64) -> Self {
        Self { conn, affected }
    }

    pub async fn get_by_id(
        &mut self,
        id: Uuid,
        visibility: Visibility,
    ) -> Result<Option<Course>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM courses WHERE id = ?{}",
            COURSE_COLUMNS,
            visibility.filter()
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
    }

    /// Loads the course together with its lessons, ordered by position. The
    /// same visibility applies to the course and to the lessons.
    pub async fn get_with_lessons(
        &mut self,
        id: Uuid,
        visibility: Visibility,
    ) -> Result<Option<Course>, sqlx::Error> {
        let Some(mut course) = self.get_by_id(id, visibility).await? else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {} FROM lessons WHERE course_id = ?{} ORDER BY sort_order",
            LESSON_COLUMNS,
            visibility.filter()
        );
        course.lessons = sqlx::query_as::<_, Lesson>(&sql)
            .bind(id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(Some(course))
    }

    /// Every course under the given visibility, most recently updated first.
    pub async fn get_all(&mut self, visibility: Visibility) -> Result<Vec<Course>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM courses WHERE 1 = 1{} ORDER BY updated_at DESC, id",
            COURSE_COLUMNS,
            visibility.filter()
        );
        sqlx::query_as::<_, Course>(&sql)
            .fetch_all(&mut *self.conn)
            .await
    }

    /// Active courses only, most recently updated first.
    pub async fn search(&mut self, query: &CourseQuery) -> Result<(Vec<Course>, i64), sqlx::Error> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM courses");
        push_search_filters(&mut count, query);
        let total_count: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM courses", COURSE_COLUMNS));
        push_search_filters(&mut select, query);
        select
            .push(" ORDER BY updated_at DESC, id LIMIT ")
            .push_bind(query.page_size)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let items = select
            .build_query_as::<Course>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok((items, total_count))
    }

    pub async fn add(&mut self, course: &Course) -> Result<(), sqlx::Error> {
        let result = sqlx::query!(
            "INSERT INTO courses (id, title, status, is_deleted, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            course.id,
            course.title,
            course.status,
            course.is_deleted,
            course.created_at,
            course.updated_at
        )
        .execute(&mut *self.conn)
        .await?;

        *self.affected += result.rows_affected();
        Ok(())
    }

    pub async fn update(&mut self, course: &Course) -> Result<(), sqlx::Error> {
        let result = sqlx::query!(
            "UPDATE courses SET title = ?, status = ?, is_deleted = ?, updated_at = ? WHERE id = ?",
            course.title,
            course.status,
            course.is_deleted,
            course.updated_at,
            course.id
        )
        .execute(&mut *self.conn)
        .await?;

        *self.affected += result.rows_affected();
        Ok(())
    }
}

fn push_search_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &CourseQuery) {
    builder.push(" WHERE is_deleted = 0");
    if let Some(term) = query.term() {
        // instr keeps the match a plain case-sensitive substring test
        builder
            .push(" AND instr(title, ")
            .push_bind(term.trim().to_string())
            .push(") > 0");
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
}
