use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::checks::{not_blank, required, rule_errors};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course_interested: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFilter {
    pub search: Option<String>,
}

/// Untrusted payload of the public contact form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewContactRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    pub name: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub phone: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub course_interested: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course_interested: String,
    pub message: String,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl NewContactRequest {
    /// Trims every field and drops an empty phone, then validates.
    pub fn validated(self) -> Result<NewContact, AppError> {
        let req = NewContactRequest {
            name: trimmed(self.name),
            email: trimmed(self.email),
            phone: trimmed(self.phone).filter(|p| !p.is_empty()),
            course_interested: trimmed(self.course_interested),
            message: trimmed(self.message),
        };
        let mut errors = rule_errors(&req);
        let name = required(&mut errors, "name", req.name);
        let email = required(&mut errors, "email", req.email);
        let course_interested = required(&mut errors, "course_interested", req.course_interested);
        let message = required(&mut errors, "message", req.message);

        match (name, email, course_interested, message) {
            (Some(name), Some(email), Some(course_interested), Some(message)) if errors.is_empty() => {
                Ok(NewContact {
                    name,
                    email,
                    phone: req.phone,
                    course_interested,
                    message,
                })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> NewContactRequest {
        NewContactRequest {
            name: Some("  Priya Nair ".to_string()),
            email: Some("priya@example.com".to_string()),
            phone: Some("   ".to_string()),
            course_interested: Some("Kubernetes".to_string()),
            message: Some("Is there a weekend batch?".to_string()),
        }
    }

    #[test]
    fn test_valid_contact_is_trimmed() {
        let contact = valid_request().validated().expect("valid contact");
        assert_eq!(contact.name, "Priya Nair");
        assert_eq!(contact.phone, None);
    }

    #[test]
    fn test_invalid_contact_lists_offending_fields() {
        let req = NewContactRequest {
            name: None,
            email: Some("not-an-email".to_string()),
            message: Some("   ".to_string()),
            ..valid_request()
        };

        let Err(AppError::Validation(errors)) = req.validated() else {
            panic!("expected validation error");
        };
        assert!(errors.contains("name"));
        assert_eq!(
            errors.get("email"),
            Some(&["Enter a valid email address.".to_string()][..])
        );
        assert_eq!(
            errors.get("message"),
            Some(&["This field may not be blank.".to_string()][..])
        );
        assert!(!errors.contains("course_interested"));
    }
}
