pub mod course;
pub mod lesson;
pub mod page;

pub use course::{Course, CourseQuery, CourseRequest, CourseStatus, CourseSummary};
pub use lesson::{Lesson, LessonRequest, ReorderLessonRequest};
pub use page::Page;

use crate::error::AppError;

pub const MAX_TITLE_LEN: usize = 200;

/// Trims a course or lesson title and checks it is non-empty and within
/// `MAX_TITLE_LEN` characters.
pub fn normalize_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}
