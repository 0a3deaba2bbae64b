pub mod course_service;
pub mod lesson_service;

pub use course_service::CourseService;
pub use lesson_service::LessonService;
