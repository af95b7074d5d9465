mod contacts;
mod courses;
mod extract;
mod faqs;
mod labs;
mod modules;
mod topics;

use axum::http::{HeaderValue, header};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower::Layer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let catalog = Router::new()
        .merge(courses::routes())
        .merge(faqs::routes())
        .merge(modules::routes())
        .merge(topics::routes())
        .merge(labs::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api/courses", catalog)
        .nest("/api/contacts", contacts::routes())
        .with_state(state)
}

/// The router with CORS and request tracing, wrapped so that `/path/` and `/path` route alike.
pub fn app(state: AppState, cors_allowed_origins: Option<&[String]>) -> NormalizePath<Router> {
    let router = router(state)
        .layer(build_cors(cors_allowed_origins))
        .layer(TraceLayer::new_for_http());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

fn build_cors(allowed_origins: Option<&[String]>) -> CorsLayer {
    match allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_headers([header::CONTENT_TYPE])
                .allow_methods(Any)
        }
        None => CorsLayer::permissive(),
    }
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
