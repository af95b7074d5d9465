use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db::contacts;
use crate::error::AppError;
use crate::models::{Contact, NewContactRequest};
use crate::notify::{Mailer, NotifyError, contact_notification};

pub const SUBMITTED_MESSAGE: &str = "Thank you for your message! We'll reach out within 24 hours.";
pub const NOTIFICATION_FAILED_NOTE: &str = "Note: Email notification failed, but your message was saved.";

pub struct ContactIntake {
    db: SqlitePool,
    mailer: Arc<dyn Mailer>,
    operations_mailbox: String,
}

#[derive(Debug)]
pub struct SubmissionOutcome {
    pub contact: Contact,
    pub notified: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<&SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: &SubmissionOutcome) -> Self {
        Self {
            message: SUBMITTED_MESSAGE.to_string(),
            note: (!outcome.notified).then(|| NOTIFICATION_FAILED_NOTE.to_string()),
        }
    }
}

impl ContactIntake {
    pub fn new(db: SqlitePool, mailer: Arc<dyn Mailer>, operations_mailbox: String) -> Self {
        Self {
            db,
            mailer,
            operations_mailbox,
        }
    }

    /// Validates and stores the submission, then tries one notification. Only validation
    /// and storage failures are returned; a failed notification is reported in the outcome.
    pub async fn submit(&self, req: NewContactRequest) -> Result<SubmissionOutcome, AppError> {
        let new_contact = req.validated()?;
        let contact = contacts::insert_contact(&self.db, new_contact).await?;
        info!(contact_id = contact.id, "stored contact submission");

        let notified = match self.notify(&contact).await {
            Ok(()) => true,
            Err(e) => {
                error!(contact_id = contact.id, error = %e, "contact notification failed");
                false
            }
        };

        Ok(SubmissionOutcome { contact, notified })
    }

    async fn notify(&self, contact: &Contact) -> Result<(), NotifyError> {
        let email = contact_notification(contact, &self.operations_mailbox, Utc::now())?;
        self.mailer.send(&email).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::db::setup_test_db;
    use crate::models::ContactFilter;
    use crate::notify::{DisabledMailer, OutgoingEmail};

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn request() -> NewContactRequest {
        NewContactRequest {
            name: Some("  Kiran  ".to_string()),
            email: Some("kiran@example.com".to_string()),
            phone: Some("".to_string()),
            course_interested: Some("Linux Administration".to_string()),
            message: Some("When does the next batch start?".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_stores_then_notifies() {
        let pool = setup_test_db().await;
        let mailer = Arc::new(RecordingMailer::default());
        let intake = ContactIntake::new(pool.clone(), mailer.clone(), "ops@example.com".to_string());

        let outcome = intake.submit(request()).await.unwrap();
        assert!(outcome.notified);
        assert_eq!(outcome.contact.name, "Kiran");
        assert_eq!(outcome.contact.phone, None);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["ops@example.com".to_string()]);
        assert_eq!(sent[0].reply_to, vec!["kiran@example.com".to_string()]);

        let response = SubmissionResponse::from(&outcome);
        assert_eq!(response.message, SUBMITTED_MESSAGE);
        assert!(response.note.is_none());
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_contact() {
        let pool = setup_test_db().await;
        let intake = ContactIntake::new(pool.clone(), Arc::new(DisabledMailer), "ops@example.com".to_string());

        let outcome = intake.submit(request()).await.unwrap();
        assert!(!outcome.notified);
        assert_eq!(
            SubmissionResponse::from(&outcome).note.as_deref(),
            Some(NOTIFICATION_FAILED_NOTE)
        );

        let stored = contacts::find_contact_by_id(&pool, outcome.contact.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_invalid_submission_stores_and_sends_nothing() {
        let pool = setup_test_db().await;
        let mailer = Arc::new(RecordingMailer::default());
        let intake = ContactIntake::new(pool.clone(), mailer.clone(), "ops@example.com".to_string());

        let req = NewContactRequest {
            email: Some("not-an-email".to_string()),
            ..request()
        };
        let err = intake.submit(req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.contains("email")));

        assert!(mailer.sent.lock().unwrap().is_empty());
        let all = contacts::fetch_contacts(&pool, &ContactFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }
}
