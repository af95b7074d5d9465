use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::Value;

use super::extract::{AppJson, AppPath, AppQuery};
use crate::db::faqs;
use crate::error::AppError;
use crate::models::{CourseFaqs, Faq, FaqFilter, FaqPurge, NewFaqRequest, UpdateFaqRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/faqs", get(list_faqs).post(create_faq))
        .route("/faqs/bulk-create", post(bulk_create_faqs))
        .route(
            "/faqs/{id}",
            get(get_faq).put(update_faq).patch(update_faq).delete(delete_faq),
        )
        .route("/courses/{id}/faqs", get(course_faqs))
        .route("/courses/{id}/faqs/delete-all", delete(delete_course_faqs))
}

async fn list_faqs(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<FaqFilter>,
) -> Result<Json<Vec<Faq>>, AppError> {
    Ok(Json(faqs::fetch_faqs(&state.db, &filter).await?))
}

async fn create_faq(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewFaqRequest>,
) -> Result<(StatusCode, Json<Faq>), AppError> {
    let faq = faqs::insert_faq(&state.db, req.validated()?).await?;
    Ok((StatusCode::CREATED, Json(faq)))
}

async fn bulk_create_faqs(
    State(state): State<AppState>,
    AppJson(items): AppJson<Vec<Value>>,
) -> Result<(StatusCode, Json<Vec<Faq>>), AppError> {
    let created = faqs::insert_faqs(&state.db, items).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_faq(State(state): State<AppState>, AppPath(id): AppPath<i64>) -> Result<Json<Faq>, AppError> {
    let faq = faqs::find_faq_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("FAQ", id))?;
    Ok(Json(faq))
}

async fn update_faq(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateFaqRequest>,
) -> Result<Json<Faq>, AppError> {
    let faq = faqs::update_faq(&state.db, id, req)
        .await?
        .ok_or_else(|| AppError::not_found("FAQ", id))?;
    Ok(Json(faq))
}

async fn delete_faq(State(state): State<AppState>, AppPath(id): AppPath<i64>) -> Result<StatusCode, AppError> {
    if faqs::delete_faq(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("FAQ", id))
    }
}

async fn course_faqs(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<i64>,
) -> Result<Json<CourseFaqs>, AppError> {
    let listing = faqs::fetch_course_faqs(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course", course_id))?;
    Ok(Json(listing))
}

async fn delete_course_faqs(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<i64>,
) -> Result<Json<FaqPurge>, AppError> {
    let purge = faqs::delete_course_faqs(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course", course_id))?;
    Ok(Json(purge))
}
