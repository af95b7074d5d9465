use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::extract::{AppJson, AppPath, AppQuery};
use crate::db::courses;
use crate::error::AppError;
use crate::models::{Course, CourseDetail, CourseFilter, NewCourseRequest, UpdateCourseRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course)
                .put(update_course)
                .patch(update_course)
                .delete(delete_course),
        )
}

async fn list_courses(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<CourseFilter>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = courses::fetch_courses(&state.db, &filter).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = courses::insert_course(&state.db, req.validated()?).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn get_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<CourseDetail>, AppError> {
    let detail = courses::fetch_course_detail(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Course", id))?;
    Ok(Json(detail))
}

async fn update_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let course = courses::update_course(&state.db, id, req)
        .await?
        .ok_or_else(|| AppError::not_found("Course", id))?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if courses::delete_course(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Course", id))
    }
}
