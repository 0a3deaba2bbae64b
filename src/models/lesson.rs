use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    /// 1-based position within the course.
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(course_id: Uuid, title: String, order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            course_id,
            title,
            order,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn edit(&mut self, title: String, order: i32) {
        self.title = title;
        self.order = order;
        self.updated_at = Utc::now();
    }

    /// Leaves the order slot as a gap; remaining lessons are not renumbered.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }

    /// The slot directly above or below this lesson, if one can exist.
    pub fn adjacent_order(&self, move_up: bool) -> Option<i32> {
        if move_up {
            self.order.checked_sub(1).filter(|order| *order >= 1)
        } else {
            self.order.checked_add(1)
        }
    }

    pub fn swap_order_with(&mut self, other: &mut Lesson) {
        std::mem::swap(&mut self.order, &mut other.order);
        let now = Utc::now();
        self.updated_at = now;
        other.updated_at = now;
    }
}

pub fn validate_order(order: i32) -> Result<i32, AppError> {
    if order < 1 {
        return Err(AppError::Validation(
            "Order must be greater than zero".to_string(),
        ));
    }
    Ok(order)
}

pub fn order_taken_message(order: i32) -> String {
    format!("Order {} already exists in this course", order)
}

/// Body of both create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonRequest {
    pub title: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLessonRequest {
    pub move_up: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_order_bounds() {
        let course_id = Uuid::new_v4();
        let first = Lesson::new(course_id, "Intro".to_string(), 1);
        assert_eq!(first.adjacent_order(true), None);
        assert_eq!(first.adjacent_order(false), Some(2));

        let third = Lesson::new(course_id, "Third".to_string(), 3);
        assert_eq!(third.adjacent_order(true), Some(2));

        let last = Lesson::new(course_id, "Last".to_string(), i32::MAX);
        assert_eq!(last.adjacent_order(false), None);
    }

    #[test]
    fn test_swap_order_with_exchanges_positions() {
        let course_id = Uuid::new_v4();
        let mut a = Lesson::new(course_id, "A".to_string(), 1);
        let mut b = Lesson::new(course_id, "B".to_string(), 2);
        let (a_before, b_before) = (a.updated_at, b.updated_at);

        a.swap_order_with(&mut b);
        assert_eq!((a.order, b.order), (2, 1));
        assert!(a.updated_at >= a_before);
        assert!(b.updated_at >= b_before);

        a.swap_order_with(&mut b);
        assert_eq!((a.order, b.order), (1, 2));
    }

    #[test]
    fn test_validate_order() {
        assert_eq!(validate_order(1).unwrap(), 1);
        assert!(validate_order(0).is_err());
        assert!(validate_order(-4).is_err());
    }

    #[test]
    fn test_reorder_request_uses_camel_case() {
        let req: ReorderLessonRequest = serde_json::from_str(r#"{"moveUp":true}"#).unwrap();
        assert!(req.move_up);
    }
}
