use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{LessonRepository, UnitOfWork, Visibility};
use crate::error::AppError;
use crate::models::lesson::{order_taken_message, validate_order};
use crate::models::{Lesson, normalize_title};

pub struct LessonService {
    db: SqlitePool,
}

impl LessonService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Active lessons of an active course, by position.
    pub async fn list(&self, course_id: Uuid) -> Result<Vec<Lesson>, AppError> {
        let mut uow = UnitOfWork::read(&self.db).await?;
        ensure_course(&mut uow, course_id).await?;
        Ok(uow
            .lessons()
            .get_by_course(course_id, Visibility::Active)
            .await?)
    }

    pub async fn get(&self, course_id: Uuid, id: Uuid) -> Result<Lesson, AppError> {
        let mut uow = UnitOfWork::read(&self.db).await?;
        let mut lessons = uow.lessons();
        find_in_course(&mut lessons, course_id, id).await
    }

    pub async fn create(&self, course_id: Uuid, title: &str, order: i32) -> Result<Lesson, AppError> {
        let title = normalize_title(title)?;
        let order = validate_order(order)?;

        let mut uow = UnitOfWork::begin(&self.db).await?;
        ensure_course(&mut uow, course_id).await?;

        let mut lessons = uow.lessons();
        if lessons.order_exists(course_id, order, None).await? {
            warn!("lesson order {} already taken in course {}", order, course_id);
            return Err(AppError::Validation(order_taken_message(order)));
        }

        let lesson = Lesson::new(course_id, title, order);
        lessons
            .add(&lesson)
            .await
            .map_err(|e| AppError::from_write(e, || order_taken_message(order)))?;
        uow.save_changes().await?;

        info!("lesson created: {} at {} in course {}", lesson.id, order, course_id);
        Ok(lesson)
    }

    pub async fn update(
        &self,
        course_id: Uuid,
        id: Uuid,
        title: &str,
        order: i32,
    ) -> Result<Lesson, AppError> {
        let title = normalize_title(title)?;
        let order = validate_order(order)?;

        let mut uow = UnitOfWork::begin(&self.db).await?;
        let mut lessons = uow.lessons();
        let mut lesson = find_in_course(&mut lessons, course_id, id).await?;

        if lessons.order_exists(course_id, order, Some(id)).await? {
            warn!("lesson order {} already taken in course {}", order, course_id);
            return Err(AppError::Validation(order_taken_message(order)));
        }

        lesson.edit(title, order);
        lessons
            .update(&lesson)
            .await
            .map_err(|e| AppError::from_write(e, || order_taken_message(order)))?;
        uow.save_changes().await?;

        info!("lesson updated: {}", lesson.id);
        Ok(lesson)
    }

    /// Leaves a gap in the ordering; remaining lessons keep their positions.
    pub async fn delete(&self, course_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut uow = UnitOfWork::begin(&self.db).await?;
        let mut lessons = uow.lessons();
        let mut lesson = find_in_course(&mut lessons, course_id, id).await?;

        lesson.soft_delete();
        lessons.update(&lesson).await?;
        uow.save_changes().await?;

        info!("lesson deleted: {}", lesson.id);
        Ok(())
    }

    /// Swaps the lesson with whichever lesson holds the adjacent slot.
    ///
    /// Only the exact neighbouring order is considered: when it is empty,
    /// either at the edge of the range or across a gap left by a deletion,
    /// nothing moves and `ReorderImpossible` is returned.
    pub async fn reorder(&self, course_id: Uuid, id: Uuid, move_up: bool) -> Result<Lesson, AppError> {
        let mut uow = UnitOfWork::begin(&self.db).await?;
        let mut lessons = uow.lessons();
        let mut lesson = find_in_course(&mut lessons, course_id, id).await?;

        let Some(target) = lesson.adjacent_order(move_up) else {
            return Err(AppError::ReorderImpossible);
        };
        let Some(mut neighbour) = lessons.get_by_order(course_id, target).await? else {
            warn!("no lesson at order {} in course {}, cannot reorder", target, course_id);
            return Err(AppError::ReorderImpossible);
        };

        lesson.swap_order_with(&mut neighbour);
        lessons
            .swap_orders(&lesson, &neighbour)
            .await
            .map_err(|e| AppError::from_write(e, || order_taken_message(lesson.order)))?;
        uow.save_changes().await?;

        info!(
            "lesson {} moved to {}, lesson {} moved to {}",
            lesson.id, lesson.order, neighbour.id, neighbour.order
        );
        Ok(lesson)
    }
}

async fn ensure_course(uow: &mut UnitOfWork, course_id: Uuid) -> Result<(), AppError> {
    uow.courses()
        .get_by_id(course_id, Visibility::Active)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound)
}

/// An active lesson that belongs to `course_id`; anything else is NotFound.
async fn find_in_course(
    lessons: &mut LessonRepository<'_>,
    course_id: Uuid,
    id: Uuid,
) -> Result<Lesson, AppError> {
    lessons
        .get_by_id(id, Visibility::Active)
        .await?
        .filter(|lesson| lesson.course_id == course_id)
        .ok_or(AppError::NotFound)
}
