use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{UnitOfWork, Visibility};
use crate::error::AppError;
use crate::models::{Course, CourseQuery, CourseSummary, Page, normalize_title};

pub struct CourseService {
    db: SqlitePool,
}

impl CourseService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn search(&self, query: &CourseQuery) -> Result<Page<Course>, AppError> {
        query.validate()?;
        let mut uow = UnitOfWork::read(&self.db).await?;
        let (items, total_count) = uow.courses().search(query).await?;
        Ok(Page::new(items, total_count, query.page, query.page_size))
    }

    pub async fn get(&self, id: Uuid) -> Result<Course, AppError> {
        let mut uow = UnitOfWork::read(&self.db).await?;
        uow.courses()
            .get_by_id(id, Visibility::Active)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn summary(&self, id: Uuid) -> Result<CourseSummary, AppError> {
        let mut uow = UnitOfWork::read(&self.db).await?;
        let course = uow
            .courses()
            .get_with_lessons(id, Visibility::Active)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(course.summary())
    }

    pub async fn create(&self, title: &str) -> Result<Course, AppError> {
        let course = Course::new(normalize_title(title)?);

        let mut uow = UnitOfWork::begin(&self.db).await?;
        uow.courses().add(&course).await?;
        uow.save_changes().await?;

        info!("course created: {} ({})", course.title, course.id);
        Ok(course)
    }

    pub async fn update(&self, id: Uuid, title: &str) -> Result<Course, AppError> {
        let title = normalize_title(title)?;

        let mut uow = UnitOfWork::begin(&self.db).await?;
        let mut course = uow
            .courses()
            .get_by_id(id, Visibility::Active)
            .await?
            .ok_or(AppError::NotFound)?;

        course.rename(title);
        uow.courses().update(&course).await?;
        uow.save_changes().await?;

        info!("course updated: {}", course.id);
        Ok(course)
    }

    /// Soft-deletes the course and, in the same unit of work, its lessons.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut uow = UnitOfWork::begin(&self.db).await?;
        let mut course = uow
            .courses()
            .get_by_id(id, Visibility::Active)
            .await?
            .ok_or(AppError::NotFound)?;

        course.soft_delete();
        uow.courses().update(&course).await?;
        let lessons = uow
            .lessons()
            .soft_delete_by_course(course.id, course.updated_at)
            .await?;
        uow.save_changes().await?;

        info!("course deleted: {} ({} lessons)", course.id, lessons);
        Ok(())
    }

    pub async fn publish(&self, id: Uuid) -> Result<Course, AppError> {
        let mut uow = UnitOfWork::begin(&self.db).await?;
        let mut course = uow
            .courses()
            .get_with_lessons(id, Visibility::Active)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Err(e) = course.publish() {
            warn!("publish rejected for course {}: {}", course.id, e);
            return Err(e);
        }
        uow.courses().update(&course).await?;
        uow.save_changes().await?;

        info!("course published: {}", course.id);
        Ok(course)
    }

    pub async fn unpublish(&self, id: Uuid) -> Result<Course, AppError> {
        let mut uow = UnitOfWork::begin(&self.db).await?;
        let mut course = uow
            .courses()
            .get_by_id(id, Visibility::Active)
            .await?
            .ok_or(AppError::NotFound)?;

        course.unpublish();
        uow.courses().update(&course).await?;
        uow.save_changes().await?;

        info!("course unpublished: {}", course.id);
        Ok(course)
    }
}
