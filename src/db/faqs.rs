use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::info;

use super::{courses, missing_parent};
use crate::error::{AppError, FieldErrors};
use crate::models::{
    CourseFaqs, CourseRef, DeletedCourseRef, Faq, FaqFilter, FaqPurge, NewFaq, NewFaqRequest,
    UpdateFaqRequest,
};

const FAQ_COLUMNS: &str = "id, course_id, question, answer, order_index, created_at";

pub async fn fetch_faqs(db: &SqlitePool, filter: &FaqFilter) -> Result<Vec<Faq>, sqlx::Error> {
    match filter.course_id {
        Some(course_id) => {
            sqlx::query_as::<_, Faq>(&format!(
                "SELECT {} FROM faqs WHERE course_id = ? ORDER BY order_index, id",
                FAQ_COLUMNS
            ))
            .bind(course_id)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, Faq>(&format!(
                "SELECT {} FROM faqs ORDER BY order_index, id",
                FAQ_COLUMNS
            ))
            .fetch_all(db)
            .await
        }
    }
}

pub async fn find_faq_by_id(db: &SqlitePool, id: i64) -> Result<Option<Faq>, sqlx::Error> {
    sqlx::query_as::<_, Faq>(&format!("SELECT {} FROM faqs WHERE id = ?", FAQ_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_faq(db: &SqlitePool, faq: NewFaq) -> Result<Faq, AppError> {
    if !courses::course_exists(db, faq.course_id).await? {
        return Err(missing_parent("course_id", faq.course_id));
    }

    let now = Utc::now().to_rfc3339();
    let id = sqlx::query(
        r#"
        INSERT INTO faqs (course_id, question, answer, order_index, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(faq.course_id)
    .bind(&faq.question)
    .bind(&faq.answer)
    .bind(faq.order_index)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Faq {
        id,
        course_id: faq.course_id,
        question: faq.question,
        answer: faq.answer,
        order_index: faq.order_index,
        created_at: now,
    })
}

/// All-or-nothing: every element is parsed and validated before anything is
/// written, and the rows are inserted in one transaction. Errors are keyed
/// `[index].field`.
pub async fn insert_faqs(db: &SqlitePool, items: Vec<Value>) -> Result<Vec<Faq>, AppError> {
    let mut errors = FieldErrors::new();
    let mut valid = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let req = match NewFaqRequest::from_json(item) {
            Ok(req) => req,
            Err(type_errors) => {
                errors.extend_indexed(index, type_errors);
                continue;
            }
        };
        match req.validated() {
            Ok(faq) => {
                if courses::course_exists(db, faq.course_id).await? {
                    valid.push(faq);
                } else {
                    errors.extend_indexed(
                        index,
                        FieldErrors::single(
                            "course_id",
                            format!("Invalid pk \"{}\" - object does not exist.", faq.course_id),
                        ),
                    );
                }
            }
            Err(AppError::Validation(field_errors)) => errors.extend_indexed(index, field_errors),
            Err(e) => return Err(e),
        }
    }
    errors.into_result()?;

    let now = Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;
    let mut created = Vec::with_capacity(valid.len());

    for faq in valid {
        let id = sqlx::query(
            r#"
            INSERT INTO faqs (course_id, question, answer, order_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(faq.course_id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(faq.order_index)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        created.push(Faq {
            id,
            course_id: faq.course_id,
            question: faq.question,
            answer: faq.answer,
            order_index: faq.order_index,
            created_at: now.clone(),
        });
    }

    tx.commit().await?;
    info!("bulk-created {} FAQs", created.len());
    Ok(created)
}

pub async fn update_faq(db: &SqlitePool, id: i64, req: UpdateFaqRequest) -> Result<Option<Faq>, AppError> {
    let mut current = match find_faq_by_id(db, id).await? {
        Some(f) => f,
        None => return Ok(None),
    };

    let previous_course = current.course_id;
    req.apply(&mut current)?;
    if current.course_id != previous_course && !courses::course_exists(db, current.course_id).await? {
        return Err(missing_parent("course_id", current.course_id));
    }

    sqlx::query(
        r#"
        UPDATE faqs
        SET course_id = ?1,
            question = ?2,
            answer = ?3,
            order_index = ?4
        WHERE id = ?5
        "#,
    )
    .bind(current.course_id)
    .bind(&current.question)
    .bind(&current.answer)
    .bind(current.order_index)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_faq(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM faqs WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_course_faqs(db: &SqlitePool, course_id: i64) -> Result<Option<CourseFaqs>, sqlx::Error> {
    let course = match courses::find_course_by_id(db, course_id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    let faqs = fetch_faqs(db, &FaqFilter { course_id: Some(course_id) }).await?;
    Ok(Some(CourseFaqs {
        course: CourseRef::from(&course),
        count: faqs.len(),
        faqs,
    }))
}

/// Removes every FAQ of the course. `None` when the course does not exist.
pub async fn delete_course_faqs(db: &SqlitePool, course_id: i64) -> Result<Option<FaqPurge>, sqlx::Error> {
    let course = match courses::find_course_by_id(db, course_id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    let deleted_count = sqlx::query("DELETE FROM faqs WHERE course_id = ?")
        .bind(course_id)
        .execute(db)
        .await?
        .rows_affected();

    info!(course_id, deleted_count, "deleted course FAQs");
    Ok(Some(FaqPurge {
        message: format!(
            "Successfully deleted {} FAQs for course: {}",
            deleted_count, course.title
        ),
        deleted_count,
        course: DeletedCourseRef {
            id: course.id,
            title: course.title,
        },
    }))
}
