use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::warn;

use super::{faqs, is_unique_violation, labs, like_pattern, modules};
use crate::error::{AppError, FieldErrors};
use crate::models::{
    Category, Course, CourseDetail, CourseFilter, FaqFilter, LabFilter, Level, ModuleFilter,
    NewCourse, UpdateCourseRequest,
};
use crate::slug;

const COURSE_COLUMNS: &str = "id, title, slug, category, subcategory, description, short_description, \
    level, duration, mode, prerequisites, featured, created_at, updated_at";

/// Attempts at claiming a derived slug when concurrent inserts keep taking it first.
const SLUG_ATTEMPTS: usize = 5;

pub async fn fetch_courses(db: &SqlitePool, filter: &CourseFilter) -> Result<Vec<Course>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM courses WHERE 1 = 1", COURSE_COLUMNS));

    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        // unknown values are bound as-is and match nothing
        let value = category
            .parse::<Category>()
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|_| category.to_string());
        qb.push(" AND category = ").push_bind(value);
    }
    if let Some(level) = filter.level.as_deref().filter(|l| !l.is_empty()) {
        let value = level
            .parse::<Level>()
            .map(|l| l.as_str().to_string())
            .unwrap_or_else(|_| level.to_string());
        qb.push(" AND level = ").push_bind(value);
    }
    if let Some(featured) = filter.featured_flag() {
        qb.push(" AND featured = ").push_bind(featured);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        // LIKE is case-insensitive for ASCII in SQLite
        let pattern = like_pattern(search);
        qb.push(" AND (title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR short_description LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<Course>().fetch_all(db).await
}

pub async fn find_course_by_id(db: &SqlitePool, id: i64) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn course_exists(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

async fn slug_exists(db: &SqlitePool, slug: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE slug = ?")
        .bind(slug)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

async fn next_free_slug(db: &SqlitePool, base: &str) -> Result<String, sqlx::Error> {
    let mut n = 1;
    loop {
        let candidate = slug::candidate(base, n);
        if !slug_exists(db, &candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Inserts a course. An explicit slug must be free; a slug derived from the title
/// gets the first free `-N` suffix.
pub async fn insert_course(db: &SqlitePool, course: NewCourse) -> Result<Course, AppError> {
    if let Some(requested) = course.slug.as_deref() {
        let slug = slug::slugify(requested);
        if slug.is_empty() {
            return Err(AppError::Validation(FieldErrors::single(
                "slug",
                "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
            )));
        }
        return match insert_row(db, &course, slug).await {
            Ok(created) => Ok(created),
            Err(e) if is_unique_violation(&e) => Err(AppError::Validation(FieldErrors::single(
                "slug",
                "course with this slug already exists.",
            ))),
            Err(e) => Err(e.into()),
        };
    }

    let base = slug::base_slug(&course.title);
    for _ in 0..SLUG_ATTEMPTS {
        let candidate = next_free_slug(db, &base).await?;
        match insert_row(db, &course, candidate.clone()).await {
            Ok(created) => return Ok(created),
            Err(e) if is_unique_violation(&e) => {
                warn!(slug = %candidate, "slug claimed concurrently, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Validation(FieldErrors::single(
        "slug",
        "Could not derive a unique slug from the title.",
    )))
}

async fn insert_row(db: &SqlitePool, course: &NewCourse, slug: String) -> Result<Course, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let id = sqlx::query(
        r#"
        INSERT INTO courses
            (title, slug, category, subcategory, description, short_description,
            level, duration, mode, prerequisites, featured, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
        "#,
    )
    .bind(&course.title)
    .bind(&slug)
    .bind(course.category.as_str())
    .bind(&course.subcategory)
    .bind(&course.description)
    .bind(&course.short_description)
    .bind(course.level.as_str())
    .bind(&course.duration)
    .bind(&course.mode)
    .bind(&course.prerequisites)
    .bind(course.featured)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Course {
        id,
        title: course.title.clone(),
        slug,
        category: course.category,
        subcategory: course.subcategory.clone(),
        description: course.description.clone(),
        short_description: course.short_description.clone(),
        level: course.level,
        duration: course.duration.clone(),
        mode: course.mode.clone(),
        prerequisites: course.prerequisites.clone(),
        featured: course.featured,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_course(
    db: &SqlitePool,
    id: i64,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, AppError> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    req.apply(&mut current)?;
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE courses
        SET title = ?1,
            category = ?2,
            subcategory = ?3,
            description = ?4,
            short_description = ?5,
            level = ?6,
            duration = ?7,
            mode = ?8,
            prerequisites = ?9,
            featured = ?10,
            updated_at = ?11
        WHERE id = ?12
        "#,
    )
    .bind(&current.title)
    .bind(current.category.as_str())
    .bind(&current.subcategory)
    .bind(&current.description)
    .bind(&current.short_description)
    .bind(current.level.as_str())
    .bind(&current.duration)
    .bind(&current.mode)
    .bind(&current.prerequisites)
    .bind(current.featured)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

/// Deletes the course; its modules, topics, labs and FAQs go with it through
/// `ON DELETE CASCADE` inside the same statement.
pub async fn delete_course(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_course_detail(db: &SqlitePool, id: i64) -> Result<Option<CourseDetail>, sqlx::Error> {
    let course = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    let modules = modules::fetch_module_details(db, &ModuleFilter { course_id: Some(id) }).await?;
    let labs = labs::fetch_labs(db, &LabFilter { course_id: Some(id) }).await?;
    let faqs = faqs::fetch_faqs(db, &FaqFilter { course_id: Some(id) }).await?;

    Ok(Some(CourseDetail {
        course,
        modules,
        labs,
        faqs,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::setup_test_db;

    pub(crate) fn new_course(title: &str, category: Category) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            slug: None,
            category,
            subcategory: None,
            description: format!("{} in depth", title),
            short_description: format!("Intro to {}", title),
            level: Level::Beginner,
            duration: "4 weeks".to_string(),
            mode: "Online".to_string(),
            prerequisites: None,
            featured: false,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_course() {
        let pool = setup_test_db().await;

        let course = insert_course(&pool, new_course("Linux Fundamentals", Category::OperatingSystem))
            .await
            .expect("Failed to insert course");
        assert_eq!(course.slug, "linux-fundamentals");
        assert_eq!(course.created_at, course.updated_at);

        let found = find_course_by_id(&pool, course.id)
            .await
            .expect("Failed to fetch course")
            .expect("Course not found");
        assert_eq!(found.category, Category::OperatingSystem);
        assert_eq!(found.title, "Linux Fundamentals");
    }

    #[tokio::test]
    async fn test_duplicate_titles_get_suffixed_slugs() {
        let pool = setup_test_db().await;

        let first = insert_course(&pool, new_course("DevOps Bootcamp", Category::DevOps)).await.unwrap();
        let second = insert_course(&pool, new_course("DevOps Bootcamp", Category::DevOps)).await.unwrap();
        let third = insert_course(&pool, new_course("DevOps  bootcamp!", Category::DevOps)).await.unwrap();

        assert_eq!(first.slug, "devops-bootcamp");
        assert_eq!(second.slug, "devops-bootcamp-2");
        assert_eq!(third.slug, "devops-bootcamp-3");
    }

    #[tokio::test]
    async fn test_explicit_slug_collision_is_rejected() {
        let pool = setup_test_db().await;

        insert_course(&pool, new_course("Azure", Category::Cloud)).await.unwrap();

        let mut explicit = new_course("Azure Advanced", Category::Cloud);
        explicit.slug = Some("Azure".to_string());
        let err = insert_course(&pool, explicit).await.unwrap_err();

        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("slug"));
    }

    #[tokio::test]
    async fn test_filters_combine() {
        let pool = setup_test_db().await;

        let mut aws = new_course("AWS Essentials", Category::Cloud);
        aws.featured = true;
        insert_course(&pool, aws).await.unwrap();
        insert_course(&pool, new_course("GCP Essentials", Category::Cloud)).await.unwrap();
        insert_course(&pool, new_course("AWS for DevOps", Category::DevOps)).await.unwrap();

        let cloud = fetch_courses(
            &pool,
            &CourseFilter { category: Some("Cloud".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(cloud.len(), 2);
        assert!(cloud.iter().all(|c| c.category == Category::Cloud));

        let cloud_aws = fetch_courses(
            &pool,
            &CourseFilter {
                category: Some("Cloud".to_string()),
                search: Some("aws".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cloud_aws.len(), 1);
        assert_eq!(cloud_aws[0].title, "AWS Essentials");

        let featured = fetch_courses(
            &pool,
            &CourseFilter { featured: Some("True".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(featured.len(), 1);

        let not_featured = fetch_courses(
            &pool,
            &CourseFilter { featured: Some("nope".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(not_featured.len(), 2);

        let unknown = fetch_courses(
            &pool,
            &CourseFilter { category: Some("Gardening".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_descriptions() {
        let pool = setup_test_db().await;

        let mut course = new_course("Shell Basics", Category::Scriptings);
        course.short_description = "Automate with BASH".to_string();
        insert_course(&pool, course).await.unwrap();
        insert_course(&pool, new_course("Python", Category::Scriptings)).await.unwrap();

        let found = fetch_courses(
            &pool,
            &CourseFilter { search: Some("bash".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Shell Basics");

        let literal = fetch_courses(
            &pool,
            &CourseFilter { search: Some("%".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert!(literal.is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let pool = setup_test_db().await;

        let mut original = new_course("Terraform", Category::DevOps);
        original.subcategory = Some("IaC".to_string());
        let course = insert_course(&pool, original).await.unwrap();

        let req: UpdateCourseRequest =
            serde_json::from_str(r#"{"level": "Advanced", "subcategory": null}"#).unwrap();
        let updated = update_course(&pool, course.id, req)
            .await
            .expect("Failed to update course")
            .expect("Course not found");

        assert_eq!(updated.level, Level::Advanced);
        assert_eq!(updated.subcategory, None);
        assert_eq!(updated.title, "Terraform");
        assert_eq!(updated.slug, course.slug);

        let stored = find_course_by_id(&pool, course.id).await.unwrap().unwrap();
        assert_eq!(stored.level, Level::Advanced);
        assert_eq!(stored.duration, "4 weeks");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_course() {
        let pool = setup_test_db().await;

        let updated = update_course(&pool, 42, UpdateCourseRequest::default()).await.unwrap();
        assert!(updated.is_none());
        assert!(!delete_course(&pool, 42).await.unwrap());
    }
}
