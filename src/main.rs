use std::sync::Arc;

use axum::ServiceExt;
use axum::extract::Request;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use training_catalog::api;
use training_catalog::config::AppConfig;
use training_catalog::db;
use training_catalog::notify::{DisabledMailer, HttpMailer, Mailer};
use training_catalog::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "training_catalog=debug,tower_http=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;
    db::migrate(&pool).await?;

    let mailer: Arc<dyn Mailer> = match config.mail.clone() {
        Some(mail) => {
            info!("contact notifications go through {}", mail.api_url);
            Arc::new(HttpMailer::new(mail)?)
        }
        None => {
            warn!("MAIL_API_URL, MAIL_API_TOKEN or MAIL_FROM not set; contact notifications are disabled");
            Arc::new(DisabledMailer)
        }
    };

    let state = AppState {
        db: pool,
        mailer,
        operations_mailbox: config.operations_mailbox.clone(),
    };

    let app = api::app(state, config.cors_allowed_origins.as_deref());

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
