use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::checks::{deserialize_some, non_null, not_blank, required, rule_errors, valid_category, valid_level};
use super::{Faq, Lab, ModuleDetail};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Category {
    #[serde(rename = "Operating System")]
    #[sqlx(rename = "Operating System")]
    OperatingSystem,
    Cloud,
    DevOps,
    Scriptings,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::OperatingSystem => "Operating System",
            Category::Cloud => "Cloud",
            Category::DevOps => "DevOps",
            Category::Scriptings => "Scriptings",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Operating System" | "OperatingSystem" => Ok(Category::OperatingSystem),
            "Cloud" => Ok(Category::Cloud),
            "DevOps" => Ok(Category::DevOps),
            "Scriptings" => Ok(Category::Scriptings),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner" => Ok(Level::Beginner),
            "Intermediate" => Ok(Level::Intermediate),
            "Advanced" => Ok(Level::Advanced),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_MODE: &str = "Online";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub category: Category,
    pub subcategory: Option<String>,
    pub description: String,
    pub short_description: String,
    pub level: Level,
    pub duration: String,
    pub mode: String,
    pub prerequisites: Option<String>,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Composite read: a course with its modules (and their topics), labs and FAQs.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleDetail>,
    pub labs: Vec<Lab>,
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub level: Option<String>,
    pub featured: Option<String>,
    pub search: Option<String>,
}

impl CourseFilter {
    /// `"true"` in any case selects featured courses; any other non-empty value selects the rest.
    pub fn featured_flag(&self) -> Option<bool> {
        self.featured
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| v.eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewCourseRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub title: Option<String>,
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters."))]
    pub slug: Option<String>,
    #[validate(custom(function = "valid_category"))]
    pub category: Option<String>,
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub subcategory: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub short_description: Option<String>,
    #[validate(custom(function = "valid_level"))]
    pub level: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub duration: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 20, message = "Ensure this field has no more than 20 characters.")
    )]
    pub mode: Option<String>,
    pub prerequisites: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub slug: Option<String>,
    pub category: Category,
    pub subcategory: Option<String>,
    pub description: String,
    pub short_description: String,
    pub level: Level,
    pub duration: String,
    pub mode: String,
    pub prerequisites: Option<String>,
    pub featured: bool,
}

impl NewCourseRequest {
    /// A blank slug counts as absent, so one is derived from the title.
    pub fn validated(mut self) -> Result<NewCourse, AppError> {
        self.slug = self.slug.filter(|s| !s.trim().is_empty());
        let mut errors = rule_errors(&self);

        let title = required(&mut errors, "title", self.title);
        let category = required(&mut errors, "category", self.category).and_then(|c| c.parse().ok());
        let description = required(&mut errors, "description", self.description);
        let short_description = required(&mut errors, "short_description", self.short_description);
        let level = required(&mut errors, "level", self.level).and_then(|l| l.parse().ok());
        let duration = required(&mut errors, "duration", self.duration);

        match (title, category, description, short_description, level, duration) {
            (Some(title), Some(category), Some(description), Some(short_description), Some(level), Some(duration))
                if errors.is_empty() =>
            {
                Ok(NewCourse {
                    title,
                    slug: self.slug,
                    category,
                    subcategory: self.subcategory,
                    description,
                    short_description,
                    level,
                    duration,
                    mode: self.mode.unwrap_or_else(|| DEFAULT_MODE.to_string()),
                    prerequisites: self.prerequisites,
                    featured: self.featured.unwrap_or(false),
                })
            }
            // every `None` above left an error behind
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// Partial update. Slug and timestamps are read-only; only `subcategory` and
/// `prerequisites` may be cleared with `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(custom(function = "valid_category"))]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub subcategory: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(custom(function = "not_blank"))]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(custom(function = "not_blank"))]
    pub short_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(custom(function = "valid_level"))]
    pub level: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub duration: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 20, message = "Ensure this field has no more than 20 characters.")
    )]
    pub mode: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub prerequisites: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub featured: Option<Option<bool>>,
}

impl UpdateCourseRequest {
    /// Merges the supplied fields onto `current`; nothing changes if any field is rejected.
    pub fn apply(self, current: &mut Course) -> Result<(), AppError> {
        let mut errors = rule_errors(&self);
        let title = non_null(&mut errors, "title", self.title);
        let category = non_null(&mut errors, "category", self.category);
        let description = non_null(&mut errors, "description", self.description);
        let short_description = non_null(&mut errors, "short_description", self.short_description);
        let level = non_null(&mut errors, "level", self.level);
        let duration = non_null(&mut errors, "duration", self.duration);
        let mode = non_null(&mut errors, "mode", self.mode);
        let featured = non_null(&mut errors, "featured", self.featured);
        errors.into_result()?;

        if let Some(title) = title {
            current.title = title;
        }
        if let Some(category) = category.and_then(|c| c.parse().ok()) {
            current.category = category;
        }
        if let Some(subcategory) = self.subcategory {
            current.subcategory = subcategory;
        }
        if let Some(description) = description {
            current.description = description;
        }
        if let Some(short_description) = short_description {
            current.short_description = short_description;
        }
        if let Some(level) = level.and_then(|l| l.parse().ok()) {
            current.level = level;
        }
        if let Some(duration) = duration {
            current.duration = duration;
        }
        if let Some(mode) = mode {
            current.mode = mode;
        }
        if let Some(prerequisites) = self.prerequisites {
            current.prerequisites = prerequisites;
        }
        if let Some(featured) = featured {
            current.featured = featured;
        }
        Ok(())
    }
}

/// Course summary embedded in the FAQ-by-course responses.
#[derive(Debug, Clone, Serialize)]
pub struct CourseRef {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub level: Level,
}

impl From<&Course> for CourseRef {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            category: course.category,
            level: course.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> NewCourseRequest {
        NewCourseRequest {
            title: Some("AWS Solutions Architect".to_string()),
            category: Some("Cloud".to_string()),
            description: Some("Design resilient systems on AWS.".to_string()),
            short_description: Some("AWS architecture".to_string()),
            level: Some("Intermediate".to_string()),
            duration: Some("6 weeks".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_course_defaults() {
        let course = valid_request().validated().expect("valid course");
        assert_eq!(course.category, Category::Cloud);
        assert_eq!(course.mode, "Online");
        assert!(!course.featured);
        assert!(course.slug.is_none());
    }

    #[test]
    fn test_missing_and_invalid_fields_are_reported() {
        let req = NewCourseRequest {
            title: None,
            category: Some("Gardening".to_string()),
            level: Some("Expert".to_string()),
            ..valid_request()
        };

        let Err(AppError::Validation(errors)) = req.validated() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("title"), Some(&["This field is required.".to_string()][..]));
        assert_eq!(
            errors.get("category"),
            Some(&["\"Gardening\" is not a valid choice.".to_string()][..])
        );
        assert!(errors.contains("level"));
        assert!(!errors.contains("description"));
    }

    #[test]
    fn test_operating_system_spellings() {
        assert_eq!("Operating System".parse::<Category>(), Ok(Category::OperatingSystem));
        assert_eq!("OperatingSystem".parse::<Category>(), Ok(Category::OperatingSystem));
        assert_eq!(
            serde_json::to_value(Category::OperatingSystem).unwrap(),
            serde_json::json!("Operating System")
        );
    }

    #[test]
    fn test_featured_flag() {
        let filter = |v: &str| CourseFilter { featured: Some(v.to_string()), ..Default::default() };
        assert_eq!(filter("TRUE").featured_flag(), Some(true));
        assert_eq!(filter("yes").featured_flag(), Some(false));
        assert_eq!(filter("").featured_flag(), None);
        assert_eq!(CourseFilter::default().featured_flag(), None);
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let req: UpdateCourseRequest =
            serde_json::from_str(r#"{"subcategory": null, "featured": true}"#).unwrap();
        assert_eq!(req.subcategory, Some(None));
        assert_eq!(req.featured, Some(Some(true)));
        assert_eq!(req.prerequisites, None);
    }

    #[test]
    fn test_blank_slug_is_derived() {
        let req = NewCourseRequest {
            slug: Some("   ".to_string()),
            ..valid_request()
        };
        assert!(req.validated().expect("valid course").slug.is_none());
    }

    #[test]
    fn test_update_rejects_null_on_required_fields() {
        let mut course = Course {
            id: 1,
            title: "Linux Basics".to_string(),
            slug: "linux-basics".to_string(),
            category: Category::OperatingSystem,
            subcategory: Some("RHEL".to_string()),
            description: "Shell and filesystems".to_string(),
            short_description: "Linux".to_string(),
            level: Level::Beginner,
            duration: "4 weeks".to_string(),
            mode: DEFAULT_MODE.to_string(),
            prerequisites: None,
            featured: false,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        };

        let req: UpdateCourseRequest =
            serde_json::from_str(r#"{"title": null, "featured": null, "subcategory": null}"#).unwrap();
        let Err(AppError::Validation(errors)) = req.apply(&mut course) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("title"), Some(&["This field may not be null.".to_string()][..]));
        assert!(errors.contains("featured"));
        assert!(!errors.contains("subcategory"));
        assert_eq!(course.title, "Linux Basics");
        assert_eq!(course.subcategory.as_deref(), Some("RHEL"));

        let req: UpdateCourseRequest = serde_json::from_str(r#"{"subcategory": null}"#).unwrap();
        req.apply(&mut course).unwrap();
        assert_eq!(course.subcategory, None);
    }
}
