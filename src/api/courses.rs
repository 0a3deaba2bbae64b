use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::error::AppError;
use crate::models::*;
use crate::services::CourseService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", post(create_course))
        .route("/courses/search", get(search_courses))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{id}/summary", get(course_summary))
        .route("/courses/{id}/publish", patch(publish_course))
        .route("/courses/{id}/unpublish", patch(unpublish_course))
}

async fn search_courses(
    _: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> Result<Json<Page<Course>>, AppError> {
    let page = CourseService::new(state.db).search(&query).await?;
    Ok(Json(page))
}

async fn get_course(
    _: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::new(state.db).get(id).await?;
    Ok(Json(course))
}

async fn course_summary(
    _: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseSummary>, AppError> {
    let summary = CourseService::new(state.db).summary(id).await?;
    Ok(Json(summary))
}

async fn create_course(
    _: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = CourseService::new(state.db).create(&req.title).await?;
    let location = format!("/api/courses/{}", course.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(course)))
}

async fn update_course(
    _: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CourseRequest>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::new(state.db).update(id, &req.title).await?;
    Ok(Json(course))
}

async fn delete_course(
    _: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CourseService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn publish_course(
    _: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::new(state.db).publish(id).await?;
    Ok(Json(course))
}

async fn unpublish_course(
    _: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::new(state.db).unpublish(id).await?;
    Ok(Json(course))
}
