use chrono::Utc;
use sqlx::SqlitePool;

use super::like_pattern;
use crate::models::{Contact, ContactFilter, NewContact};

const CONTACT_COLUMNS: &str = "id, name, email, phone, course_interested, message, created_at";

pub async fn insert_contact(db: &SqlitePool, contact: NewContact) -> Result<Contact, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let id = sqlx::query(
        r#"
        INSERT INTO contacts (name, email, phone, course_interested, message, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&contact.name)
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(&contact.course_interested)
    .bind(&contact.message)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Contact {
        id,
        name: contact.name,
        email: contact.email,
        phone: contact.phone,
        course_interested: contact.course_interested,
        message: contact.message,
        created_at: now,
    })
}

/// Newest first. `search` matches name, email or course of interest.
pub async fn fetch_contacts(db: &SqlitePool, filter: &ContactFilter) -> Result<Vec<Contact>, sqlx::Error> {
    match filter.search.as_deref().filter(|s| !s.is_empty()) {
        Some(search) => {
            let pattern = like_pattern(search);
            sqlx::query_as::<_, Contact>(&format!(
                r#"
                SELECT {} FROM contacts
                WHERE name LIKE ?1 ESCAPE '\'
                    OR email LIKE ?1 ESCAPE '\'
                    OR course_interested LIKE ?1 ESCAPE '\'
                ORDER BY created_at DESC, id DESC
                "#,
                CONTACT_COLUMNS
            ))
            .bind(pattern)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, Contact>(&format!(
                "SELECT {} FROM contacts ORDER BY created_at DESC, id DESC",
                CONTACT_COLUMNS
            ))
            .fetch_all(db)
            .await
        }
    }
}

pub async fn find_contact_by_id(db: &SqlitePool, id: i64) -> Result<Option<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>(&format!("SELECT {} FROM contacts WHERE id = ?", CONTACT_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn delete_contact(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
