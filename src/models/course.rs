use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Lesson;

pub const PUBLISH_WITHOUT_LESSONS: &str = "Cannot publish a course without active lessons";

/// Stored as its name, sent over JSON as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
}

impl CourseStatus {
    pub fn code(self) -> u8 {
        match self {
            CourseStatus::Draft => 0,
            CourseStatus::Published => 1,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(CourseStatus::Draft),
            1 => Some(CourseStatus::Published),
            _ => None,
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseStatus::Draft => write!(f, "Draft"),
            CourseStatus::Published => write!(f, "Published"),
        }
    }
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u64>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown course status: {}", code));
        }
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            other => Err(format!("unknown course status: {}", other)),
        }
    }
}

impl Serialize for CourseStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

// Query strings carry text, JSON bodies carry the numeric code.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Code(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for CourseStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawStatus::deserialize(deserializer)? {
            RawStatus::Code(code) => Self::from_code(code)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown course status: {}", code))),
            RawStatus::Text(raw) => raw.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub status: CourseStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Only populated by the eager-loading read path.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lessons: Vec<Lesson>,
}

impl Course {
    pub fn new(title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            status: CourseStatus::Draft,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            lessons: Vec::new(),
        }
    }

    pub fn can_publish(&self) -> bool {
        self.lessons.iter().any(|lesson| !lesson.is_deleted)
    }

    /// Publishing an already published course is allowed and re-stamps it.
    pub fn publish(&mut self) -> Result<(), AppError> {
        if !self.can_publish() {
            return Err(AppError::Validation(PUBLISH_WITHOUT_LESSONS.to_string()));
        }
        self.status = CourseStatus::Published;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn unpublish(&mut self) {
        self.status = CourseStatus::Draft;
        self.updated_at = Utc::now();
    }

    /// Flags the course only; lessons are cascaded by the service.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }

    pub fn rename(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            title: self.title.clone(),
            status: self.status,
            total_lessons: self.lessons.iter().filter(|l| !l.is_deleted).count(),
            last_modified: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
    pub status: CourseStatus,
    pub total_lessons: usize,
    pub last_modified: DateTime<Utc>,
}

/// Body of both create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRequest {
    pub title: String,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<CourseStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for CourseQuery {
    fn default() -> Self {
        Self {
            q: None,
            status: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl CourseQuery {
    pub const MAX_PAGE_SIZE: i64 = 100;

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        if !(1..=Self::MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(AppError::Validation(format!(
                "pageSize must be between 1 and {}",
                Self::MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    /// The search term, if it carries anything besides whitespace.
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.trim().is_empty())
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(course: &Course, order: i32) -> Lesson {
        Lesson::new(course.id, format!("Lesson {}", order), order)
    }

    #[test]
    fn test_new_course_is_draft_with_matching_timestamps() {
        let course = Course::new("Algebra".to_string());
        assert_eq!(course.status, CourseStatus::Draft);
        assert!(!course.is_deleted);
        assert_eq!(course.created_at, course.updated_at);
    }

    #[test]
    fn test_publish_without_lessons_fails() {
        let mut course = Course::new("Empty".to_string());
        let err = course.publish().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == PUBLISH_WITHOUT_LESSONS));
        assert_eq!(course.status, CourseStatus::Draft);
    }

    #[test]
    fn test_publish_with_only_deleted_lessons_fails() {
        let mut course = Course::new("Gone".to_string());
        let mut l = lesson(&course, 1);
        l.soft_delete();
        course.lessons.push(l);

        assert!(!course.can_publish());
        assert!(course.publish().is_err());
        assert_eq!(course.status, CourseStatus::Draft);
    }

    #[test]
    fn test_publish_with_active_lesson_succeeds() {
        let mut course = Course::new("Ready".to_string());
        let before = course.updated_at;
        course.lessons.push(lesson(&course, 1));

        course.publish().unwrap();
        assert_eq!(course.status, CourseStatus::Published);
        assert!(course.updated_at >= before);

        // re-publishing is allowed
        course.publish().unwrap();
        assert_eq!(course.status, CourseStatus::Published);
    }

    #[test]
    fn test_unpublish_and_soft_delete() {
        let mut course = Course::new("Ready".to_string());
        course.lessons.push(lesson(&course, 1));
        course.publish().unwrap();

        course.unpublish();
        assert_eq!(course.status, CourseStatus::Draft);

        course.soft_delete();
        assert!(course.is_deleted);
        assert_eq!(course.lessons.len(), 1);
    }

    #[test]
    fn test_summary_counts_active_lessons() {
        let mut course = Course::new("Mixed".to_string());
        course.lessons.push(lesson(&course, 1));
        let mut deleted = lesson(&course, 2);
        deleted.soft_delete();
        course.lessons.push(deleted);

        let summary = course.summary();
        assert_eq!(summary.total_lessons, 1);
        assert_eq!(summary.last_modified, course.updated_at);
    }

    #[test]
    fn test_status_parses_names_and_legacy_numbers() {
        assert_eq!("Published".parse::<CourseStatus>().unwrap(), CourseStatus::Published);
        assert_eq!("draft".parse::<CourseStatus>().unwrap(), CourseStatus::Draft);
        assert_eq!("1".parse::<CourseStatus>().unwrap(), CourseStatus::Published);
        assert_eq!("0".parse::<CourseStatus>().unwrap(), CourseStatus::Draft);
        assert!("archived".parse::<CourseStatus>().is_err());
        assert!("7".parse::<CourseStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_code() {
        assert_eq!(serde_json::to_string(&CourseStatus::Draft).unwrap(), "0");
        assert_eq!(serde_json::to_string(&CourseStatus::Published).unwrap(), "1");

        let course = Course::new("Wire".to_string());
        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(value["status"], 0);
    }

    #[test]
    fn test_status_deserializes_from_code_or_name() {
        let from_code: CourseStatus = serde_json::from_str("1").unwrap();
        assert_eq!(from_code, CourseStatus::Published);
        let from_name: CourseStatus = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(from_name, CourseStatus::Draft);
        assert!(serde_json::from_str::<CourseStatus>("2").is_err());
    }

    #[test]
    fn test_query_validation() {
        let mut query = CourseQuery::default();
        assert!(query.validate().is_ok());
        assert_eq!(query.offset(), 0);

        query.page = 3;
        query.page_size = 20;
        assert_eq!(query.offset(), 40);

        query.page = 0;
        assert!(query.validate().is_err());

        query.page = 1;
        query.page_size = CourseQuery::MAX_PAGE_SIZE + 1;
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_query_ignores_blank_term() {
        let query = CourseQuery {
            q: Some("   ".to_string()),
            ..CourseQuery::default()
        };
        assert_eq!(query.term(), None);
    }
}
