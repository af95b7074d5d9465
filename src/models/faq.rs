use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use super::CourseRef;
use super::checks::{
    INVALID_INTEGER, INVALID_STRING, deserialize_some, empty_as_none, expect_type, non_null, not_blank,
    required, rule_errors,
};
use crate::error::{AppError, FieldErrors, NON_FIELD_ERRORS};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faq {
    pub id: i64,
    pub course_id: i64,
    pub question: String,
    pub answer: String,
    pub order_index: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaqFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewFaqRequest {
    pub course_id: Option<i64>,
    #[validate(custom(function = "not_blank"))]
    pub question: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub answer: Option<String>,
    pub order_index: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewFaq {
    pub course_id: i64,
    pub question: String,
    pub answer: String,
    pub order_index: i64,
}

impl NewFaqRequest {
    /// Reads one element of a bulk payload. Wrongly typed fields are reported per field
    /// instead of failing the whole body.
    pub fn from_json(value: Value) -> Result<Self, FieldErrors> {
        let Value::Object(fields) = &value else {
            return Err(FieldErrors::single(
                NON_FIELD_ERRORS,
                "Invalid data. Expected a dictionary.",
            ));
        };

        let mut errors = FieldErrors::new();
        expect_type::<i64>(&mut errors, fields, "course_id", INVALID_INTEGER);
        expect_type::<String>(&mut errors, fields, "question", INVALID_STRING);
        expect_type::<String>(&mut errors, fields, "answer", INVALID_STRING);
        expect_type::<i64>(&mut errors, fields, "order_index", INVALID_INTEGER);
        if !errors.is_empty() {
            return Err(errors);
        }

        serde_json::from_value(value).map_err(|e| FieldErrors::single(NON_FIELD_ERRORS, e.to_string()))
    }

    pub fn validated(self) -> Result<NewFaq, AppError> {
        let mut errors = rule_errors(&self);
        let course_id = required(&mut errors, "course_id", self.course_id);
        let question = required(&mut errors, "question", self.question);
        let answer = required(&mut errors, "answer", self.answer);
        let order_index = required(&mut errors, "order_index", self.order_index);

        match (course_id, question, answer, order_index) {
            (Some(course_id), Some(question), Some(answer), Some(order_index)) if errors.is_empty() => {
                Ok(NewFaq {
                    course_id,
                    question,
                    answer,
                    order_index,
                })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFaqRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub course_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(custom(function = "not_blank"))]
    pub question: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(custom(function = "not_blank"))]
    pub answer: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub order_index: Option<Option<i64>>,
}

impl UpdateFaqRequest {
    pub fn apply(self, current: &mut Faq) -> Result<(), AppError> {
        let mut errors = rule_errors(&self);
        let course_id = non_null(&mut errors, "course_id", self.course_id);
        let question = non_null(&mut errors, "question", self.question);
        let answer = non_null(&mut errors, "answer", self.answer);
        let order_index = non_null(&mut errors, "order_index", self.order_index);
        errors.into_result()?;

        if let Some(course_id) = course_id {
            current.course_id = course_id;
        }
        if let Some(question) = question {
            current.question = question;
        }
        if let Some(answer) = answer {
            current.answer = answer;
        }
        if let Some(order_index) = order_index {
            current.order_index = order_index;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseFaqs {
    pub course: CourseRef,
    pub faqs: Vec<Faq>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedCourseRef {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaqPurge {
    pub message: String,
    pub deleted_count: u64,
    pub course: DeletedCourseRef,
}
