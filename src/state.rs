use std::sync::Arc;

use sqlx::SqlitePool;

use crate::notify::Mailer;
use crate::services::ContactIntake;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub mailer: Arc<dyn Mailer>,
    pub operations_mailbox: String,
}

impl AppState {
    pub fn contact_intake(&self) -> ContactIntake {
        ContactIntake::new(self.db.clone(), self.mailer.clone(), self.operations_mailbox.clone())
    }
}
