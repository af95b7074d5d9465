use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::extract::{AppJson, AppPath, AppQuery};
use crate::db::modules;
use crate::error::AppError;
use crate::models::{ModuleDetail, ModuleFilter, NewModuleRequest, UpdateModuleRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/modules", get(list_modules).post(create_module))
        .route(
            "/modules/{id}",
            get(get_module)
                .put(update_module)
                .patch(update_module)
                .delete(delete_module),
        )
}

async fn list_modules(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ModuleFilter>,
) -> Result<Json<Vec<ModuleDetail>>, AppError> {
    Ok(Json(modules::fetch_module_details(&state.db, &filter).await?))
}

async fn create_module(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewModuleRequest>,
) -> Result<(StatusCode, Json<ModuleDetail>), AppError> {
    let module = modules::insert_module(&state.db, req.validated()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(ModuleDetail {
            module,
            topics: Vec::new(),
        }),
    ))
}

async fn get_module(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ModuleDetail>, AppError> {
    let detail = modules::find_module_detail(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Module", id))?;
    Ok(Json(detail))
}

async fn update_module(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateModuleRequest>,
) -> Result<Json<ModuleDetail>, AppError> {
    modules::update_module(&state.db, id, req)
        .await?
        .ok_or_else(|| AppError::not_found("Module", id))?;

    let detail = modules::find_module_detail(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Module", id))?;
    Ok(Json(detail))
}

async fn delete_module(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if modules::delete_module(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Module", id))
    }
}
