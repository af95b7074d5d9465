use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::checks::{deserialize_some, empty_as_none, non_null, not_blank, required, rule_errors};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lab {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub objectives: Option<String>,
    pub duration_minutes: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewLabRequest {
    pub course_id: Option<i64>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    pub objectives: Option<String>,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewLab {
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub objectives: Option<String>,
    pub duration_minutes: Option<i64>,
}

impl NewLabRequest {
    pub fn validated(self) -> Result<NewLab, AppError> {
        let mut errors = rule_errors(&self);
        let course_id = required(&mut errors, "course_id", self.course_id);
        let title = required(&mut errors, "title", self.title);
        let description = required(&mut errors, "description", self.description);

        match (course_id, title, description) {
            (Some(course_id), Some(title), Some(description)) if errors.is_empty() => Ok(NewLab {
                course_id,
                title,
                description,
                objectives: self.objectives,
                duration_minutes: self.duration_minutes,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLabRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub course_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(custom(function = "not_blank"))]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub objectives: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub duration_minutes: Option<Option<i64>>,
}

impl UpdateLabRequest {
    pub fn apply(self, current: &mut Lab) -> Result<(), AppError> {
        let mut errors = rule_errors(&self);
        let course_id = non_null(&mut errors, "course_id", self.course_id);
        let title = non_null(&mut errors, "title", self.title);
        let description = non_null(&mut errors, "description", self.description);
        errors.into_result()?;

        if let Some(course_id) = course_id {
            current.course_id = course_id;
        }
        if let Some(title) = title {
            current.title = title;
        }
        if let Some(description) = description {
            current.description = description;
        }
        if let Some(objectives) = self.objectives {
            current.objectives = objectives;
        }
        if let Some(duration_minutes) = self.duration_minutes {
            current.duration_minutes = duration_minutes;
        }
        Ok(())
    }
}
