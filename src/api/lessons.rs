use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::error::AppError;
use crate::models::*;
use crate::services::LessonService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{course_id}/lessons",
            get(list_lessons).post(create_lesson),
        )
        .route(
            "/courses/{course_id}/lessons/{id}",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
        .route("/courses/{course_id}/lessons/{id}/reorder", patch(reorder_lesson))
}

async fn list_lessons(
    _: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    let lessons = LessonService::new(state.db).list(course_id).await?;
    Ok(Json(lessons))
}

async fn get_lesson(
    _: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = LessonService::new(state.db).get(course_id, id).await?;
    Ok(Json(lesson))
}

async fn create_lesson(
    _: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<LessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = LessonService::new(state.db)
        .create(course_id, &req.title, req.order)
        .await?;
    let location = format!("/api/courses/{}/lessons/{}", course_id, lesson.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(lesson)))
}

async fn update_lesson(
    _: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(Uuid, Uuid)>,
    Json(req): Json<LessonRequest>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = LessonService::new(state.db)
        .update(course_id, id, &req.title, req.order)
        .await?;
    Ok(Json(lesson))
}

async fn delete_lesson(
    _: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    LessonService::new(state.db).delete(course_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder_lesson(
    _: AuthUser,
    State(state): State<AppState>,
    Path((course_id, id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ReorderLessonRequest>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = LessonService::new(state.db)
        .reorder(course_id, id, req.move_up)
        .await?;
    Ok(Json(lesson))
}
