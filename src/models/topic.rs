use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::checks::{deserialize_some, empty_as_none, non_null, not_blank, required, rule_errors};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Topic {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub module_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewTopicRequest {
    pub module_id: Option<i64>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub module_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i64,
}

impl NewTopicRequest {
    pub fn validated(self) -> Result<NewTopic, AppError> {
        let mut errors = rule_errors(&self);
        let module_id = required(&mut errors, "module_id", self.module_id);
        let title = required(&mut errors, "title", self.title);
        let order_index = required(&mut errors, "order_index", self.order_index);

        match (module_id, title, order_index) {
            (Some(module_id), Some(title), Some(order_index)) if errors.is_empty() => Ok(NewTopic {
                module_id,
                title,
                description: self.description,
                order_index,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTopicRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub module_id: Option<Option<i64>>,
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

impl UpdateTopicRequest {
    pub fn apply(self, current: &mut Topic) -> Result<(), AppError> {
        let mut errors = rule_errors(&self);
        let module_id = non_null(&mut errors, "module_id", self.module_id);
        let title = non_null(&mut errors, "title", self.title);
        let order_index = non_null(&mut errors, "order_index", self.order_index);
        errors.into_result()?;

        if let Some(module_id) = module_id {
            current.module_id = module_id;
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
