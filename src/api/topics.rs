use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::extract::{AppJson, AppPath, AppQuery};
use crate::db::topics;
use crate::error::AppError;
use crate::models::{NewTopicRequest, Topic, TopicFilter, UpdateTopicRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/topics", get(list_topics).post(create_topic))
        .route(
            "/topics/{id}",
            get(get_topic)
                .put(update_topic)
                .patch(update_topic)
                .delete(delete_topic),
        )
}

async fn list_topics(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<TopicFilter>,
) -> Result<Json<Vec<Topic>>, AppError> {
    Ok(Json(topics::fetch_topics(&state.db, &filter).await?))
}

async fn create_topic(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewTopicRequest>,
) -> Result<(StatusCode, Json<Topic>), AppError> {
    let topic = topics::insert_topic(&state.db, req.validated()?).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn get_topic(State(state): State<AppState>, AppPath(id): AppPath<i64>) -> Result<Json<Topic>, AppError> {
    let topic = topics::find_topic_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic", id))?;
    Ok(Json(topic))
}

async fn update_topic(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateTopicRequest>,
) -> Result<Json<Topic>, AppError> {
    let topic = topics::update_topic(&state.db, id, req)
        .await?
        .ok_or_else(|| AppError::not_found("Topic", id))?;
    Ok(Json(topic))
}

async fn delete_topic(State(state): State<AppState>, AppPath(id): AppPath<i64>) -> Result<StatusCode, AppError> {
    if topics::delete_topic(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Topic", id))
    }
}
