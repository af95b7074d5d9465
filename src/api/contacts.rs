use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::extract::{AppJson, AppPath, AppQuery};
use crate::db::contacts;
use crate::error::AppError;
use crate::models::{Contact, ContactFilter, NewContactRequest};
use crate::services::SubmissionResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts))
        .route("/contacts/submit_contact", post(submit_contact))
        .route("/contacts/{id}", get(get_contact).delete(delete_contact))
}

async fn submit_contact(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewContactRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), AppError> {
    let outcome = state.contact_intake().submit(req).await?;
    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(&outcome))))
}

async fn list_contacts(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ContactFilter>,
) -> Result<Json<Vec<Contact>>, AppError> {
    Ok(Json(contacts::fetch_contacts(&state.db, &filter).await?))
}

async fn get_contact(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Contact>, AppError> {
    let contact = contacts::find_contact_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Contact", id))?;
    Ok(Json(contact))
}

async fn delete_contact(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if contacts::delete_contact(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Contact", id))
    }
}
