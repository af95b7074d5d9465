use chrono::Utc;
use sqlx::SqlitePool;

use super::{courses, missing_parent};
use crate::error::AppError;
use crate::models::{Lab, LabFilter, NewLab, UpdateLabRequest};

const LAB_COLUMNS: &str = "id, course_id, title, description, objectives, duration_minutes, created_at";

pub async fn fetch_labs(db: &SqlitePool, filter: &LabFilter) -> Result<Vec<Lab>, sqlx::Error> {
    match filter.course_id {
        Some(course_id) => {
            sqlx::query_as::<_, Lab>(&format!(
                "SELECT {} FROM labs WHERE course_id = ? ORDER BY id",
                LAB_COLUMNS
            ))
            .bind(course_id)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, Lab>(&format!("SELECT {} FROM labs ORDER BY id", LAB_COLUMNS))
                .fetch_all(db)
                .await
        }
    }
}

pub async fn find_lab_by_id(db: &SqlitePool, id: i64) -> Result<Option<Lab>, sqlx::Error> {
    sqlx::query_as::<_, Lab>(&format!("SELECT {} FROM labs WHERE id = ?", LAB_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_lab(db: &SqlitePool, lab: NewLab) -> Result<Lab, AppError> {
    if !courses::course_exists(db, lab.course_id).await? {
        return Err(missing_parent("course_id", lab.course_id));
    }

    let now = Utc::now().to_rfc3339();
    let id = sqlx::query(
        r#"
        INSERT INTO labs (course_id, title, description, objectives, duration_minutes, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(lab.course_id)
    .bind(&lab.title)
    .bind(&lab.description)
    .bind(&lab.objectives)
    .bind(lab.duration_minutes)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Lab {
        id,
        course_id: lab.course_id,
        title: lab.title,
        description: lab.description,
        objectives: lab.objectives,
        duration_minutes: lab.duration_minutes,
        created_at: now,
    })
}

pub async fn update_lab(db: &SqlitePool, id: i64, req: UpdateLabRequest) -> Result<Option<Lab>, AppError> {
    let mut current = match find_lab_by_id(db, id).await? {
        Some(l) => l,
        None => return Ok(None),
    };

    let previous_course = current.course_id;
    req.apply(&mut current)?;
    if current.course_id != previous_course && !courses::course_exists(db, current.course_id).await? {
        return Err(missing_parent("course_id", current.course_id));
    }

    sqlx::query(
        r#"
        UPDATE labs
        SET course_id = ?1,
            title = ?2,
            description = ?3,
            objectives = ?4,
            duration_minutes = ?5
        WHERE id = ?6
        "#,
    )
    .bind(current.course_id)
    .bind(&current.title)
    .bind(&current.description)
    .bind(&current.objectives)
    .bind(current.duration_minutes)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_lab(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM labs WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::courses::{insert_course, tests::new_course};
    use crate::db::setup_test_db;
    use crate::models::Category;

    #[tokio::test]
    async fn test_lab_update_clears_duration() {
        let pool = setup_test_db().await;
        let course = insert_course(&pool, new_course("RHCSA", Category::OperatingSystem)).await.unwrap();

        let lab = insert_lab(
            &pool,
            NewLab {
                course_id: course.id,
                title: "User management".to_string(),
                description: "Create users and groups".to_string(),
                objectives: Some("useradd, groupadd".to_string()),
                duration_minutes: Some(45),
            },
        )
        .await
        .unwrap();

        let req: UpdateLabRequest = serde_json::from_str(r#"{"duration_minutes": null}"#).unwrap();
        let updated = update_lab(&pool, lab.id, req).await.unwrap().unwrap();
        assert_eq!(updated.duration_minutes, None);
        assert_eq!(updated.objectives.as_deref(), Some("useradd, groupadd"));

        let req: UpdateLabRequest = serde_json::from_str(r#"{"duration_minutes": -5}"#).unwrap();
        assert!(matches!(
            update_lab(&pool, lab.id, req).await,
            Err(AppError::Validation(ref e)) if e.contains("duration_minutes")
        ));

        let labs = fetch_labs(&pool, &LabFilter { course_id: Some(course.id) }).await.unwrap();
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].duration_minutes, None);
    }
}
