use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use super::course::{Category, Level};
use crate::error::{BLANK, FieldErrors, NULL, REQUIRED};

pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_STRING: &str = "Not a valid string.";

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(BLANK)));
    }
    Ok(())
}

pub fn valid_category(value: &str) -> Result<(), ValidationError> {
    value.parse::<Category>().map(|_| ()).map_err(|_| invalid_choice(value))
}

pub fn valid_level(value: &str) -> Result<(), ValidationError> {
    value.parse::<Level>().map(|_| ()).map_err(|_| invalid_choice(value))
}

fn invalid_choice(value: &str) -> ValidationError {
    ValidationError::new("invalid_choice")
        .with_message(Cow::Owned(format!("\"{}\" is not a valid choice.", value)))
}

/// Runs the derived rules and keeps going, so missing and null fields can be added after.
pub fn rule_errors(req: &impl Validate) -> FieldErrors {
    match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => e.into(),
    }
}

pub fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

/// Patch field that may be omitted but not cleared.
pub fn non_null<T>(errors: &mut FieldErrors, field: &str, value: Option<Option<T>>) -> Option<T> {
    match value {
        Some(None) => {
            errors.add(field, NULL);
            None
        }
        Some(Some(v)) => Some(v),
        None => None,
    }
}

/// Records `message` under `field` when its JSON value is present, not null, and not a `T`.
pub fn expect_type<T: DeserializeOwned>(
    errors: &mut FieldErrors,
    fields: &Map<String, Value>,
    field: &str,
    message: &str,
) {
    if let Some(value) = fields.get(field).filter(|v| !v.is_null()) {
        if serde_json::from_value::<T>(value.clone()).is_err() {
            errors.add(field, message);
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Query parameter that filters only when non-empty: `?course_id=` means no filter.
pub fn empty_as_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_null_records_explicit_null() {
        let mut errors = FieldErrors::new();
        assert_eq!(non_null::<i64>(&mut errors, "order_index", None), None);
        assert_eq!(non_null(&mut errors, "title", Some(Some("Linux"))), Some("Linux"));
        assert!(errors.is_empty());

        assert_eq!(non_null::<bool>(&mut errors, "featured", Some(None)), None);
        assert_eq!(errors.get("featured"), Some(&[NULL.to_string()][..]));
    }

    #[test]
    fn test_expect_type_skips_null_and_absent() {
        let Value::Object(fields) = json!({"course_id": null, "order_index": "first", "question": 7}) else {
            unreachable!()
        };
        let mut errors = FieldErrors::new();
        expect_type::<i64>(&mut errors, &fields, "course_id", INVALID_INTEGER);
        expect_type::<i64>(&mut errors, &fields, "order_index", INVALID_INTEGER);
        expect_type::<String>(&mut errors, &fields, "question", INVALID_STRING);
        expect_type::<String>(&mut errors, &fields, "answer", INVALID_STRING);

        assert!(!errors.contains("course_id"));
        assert!(!errors.contains("answer"));
        assert_eq!(errors.get("order_index"), Some(&[INVALID_INTEGER.to_string()][..]));
        assert_eq!(errors.get("question"), Some(&[INVALID_STRING.to_string()][..]));
    }
}
