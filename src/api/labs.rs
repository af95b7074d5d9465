use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::extract::{AppJson, AppPath, AppQuery};
use crate::db::labs;
use crate::error::AppError;
use crate::models::{Lab, LabFilter, NewLabRequest, UpdateLabRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/labs", get(list_labs).post(create_lab))
        .route(
            "/labs/{id}",
            get(get_lab)
                .put(update_lab)
                .patch(update_lab)
                .delete(delete_lab),
        )
}

async fn list_labs(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<LabFilter>,
) -> Result<Json<Vec<Lab>>, AppError> {
    Ok(Json(labs::fetch_labs(&state.db, &filter).await?))
}

async fn create_lab(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewLabRequest>,
) -> Result<(StatusCode, Json<Lab>), AppError> {
    let lab = labs::insert_lab(&state.db, req.validated()?).await?;
    Ok((StatusCode::CREATED, Json(lab)))
}

async fn get_lab(State(state): State<AppState>, AppPath(id): AppPath<i64>) -> Result<Json<Lab>, AppError> {
    let lab = labs::find_lab_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Lab", id))?;
    Ok(Json(lab))
}

async fn update_lab(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateLabRequest>,
) -> Result<Json<Lab>, AppError> {
    let lab = labs::update_lab(&state.db, id, req)
        .await?
        .ok_or_else(|| AppError::not_found("Lab", id))?;
    Ok(Json(lab))
}

async fn delete_lab(State(state): State<AppState>, AppPath(id): AppPath<i64>) -> Result<StatusCode, AppError> {
    if labs::delete_lab(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Lab", id))
    }
}
