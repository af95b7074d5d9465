use serde::Serialize;

use super::message::OutgoingEmail;

/// Body accepted by the HTTP mail relay.
#[derive(Debug, Serialize)]
pub struct SendEmailRequest<'a> {
    pub from: &'a str,
    pub to: &'a [String],
    pub reply_to: &'a [String],
    pub subject: &'a str,
    pub text: &'a str,
    pub html: &'a str,
}

impl<'a> SendEmailRequest<'a> {
    pub fn new(from: &'a str, email: &'a OutgoingEmail) -> Self {
        Self {
            from,
            to: &email.to,
            reply_to: &email.reply_to,
            subject: &email.subject,
            text: &email.text_body,
            html: &email.html_body,
        }
    }
}
