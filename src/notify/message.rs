use askama::Template;
use chrono::{DateTime, Utc};

use super::NotifyError;
use crate::models::Contact;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
const NO_PHONE: &str = "Not provided";

/// A rendered message, ready for any transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

struct ContactContext<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    course_interested: &'a str,
    message: &'a str,
    timestamp: &'a str,
}

#[derive(Template)]
#[template(path = "contact_notification.txt")]
struct ContactNotificationText<'a> {
    contact: &'a ContactContext<'a>,
}

#[derive(Template)]
#[template(path = "contact_notification.html")]
struct ContactNotificationHtml<'a> {
    contact: &'a ContactContext<'a>,
}

/// Builds the operations notification for a stored contact. The reply-to is the
/// submitter so staff can answer directly; the recipient always comes from configuration.
pub fn contact_notification(
    contact: &Contact,
    recipient: &str,
    submitted_at: DateTime<Utc>,
) -> Result<OutgoingEmail, NotifyError> {
    let timestamp = submitted_at.format(TIMESTAMP_FORMAT).to_string();
    let context = ContactContext {
        name: &contact.name,
        email: &contact.email,
        phone: contact.phone.as_deref().unwrap_or(NO_PHONE),
        course_interested: &contact.course_interested,
        message: &contact.message,
        timestamp: &timestamp,
    };

    let text_body = ContactNotificationText { contact: &context }.render()?;
    let html_body = ContactNotificationHtml { contact: &context }.render()?;

    Ok(OutgoingEmail {
        to: vec![recipient.to_string()],
        reply_to: vec![contact.email.clone()],
        subject: format!("New Contact Form Submission - {}", contact.name),
        text_body,
        html_body,
    })
}
