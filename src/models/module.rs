use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::Topic;
use super::checks::{deserialize_some, empty_as_none, non_null, not_blank, required, rule_errors};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Module {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub created_at: String,
}

/// A module together with its ordered topics.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleDetail {
    #[serde(flatten)]
    pub module: Module,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewModuleRequest {
    pub course_id: Option<i64>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewModule {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i64,
}

impl NewModuleRequest {
    pub fn validated(self) -> Result<NewModule, AppError> {
        let mut errors = rule_errors(&self);
        let course_id = required(&mut errors, "course_id", self.course_id);
        let title = required(&mut errors, "title", self.title);
        let order_index = required(&mut errors, "order_index", self.order_index);

        match (course_id, title, order_index) {
            (Some(course_id), Some(title), Some(order_index)) if errors.is_empty() => Ok(NewModule {
                course_id,
                title,
                description: self.description,
                order_index,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateModuleRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub course_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub order_index: Option<Option<i64>>,
}

impl UpdateModuleRequest {
    pub fn apply(self, current: &mut Module) -> Result<(), AppError> {
        let mut errors = rule_errors(&self);
        let course_id = non_null(&mut errors, "course_id", self.course_id);
        let title = non_null(&mut errors, "title", self.title);
        let order_index = non_null(&mut errors, "order_index", self.order_index);
        errors.into_result()?;

        if let Some(course_id) = course_id {
            current.course_id = course_id;
        }
        if let Some(title) = title {
            current.title = title;
        }
        if let Some(description) = self.description {
            current.description = description;
        }
        if let Some(order_index) = order_index {
            current.order_index = order_index;
        }
        Ok(())
    }
}
