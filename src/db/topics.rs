use chrono::Utc;
use sqlx::SqlitePool;

use super::{missing_parent, modules};
use crate::error::AppError;
use crate::models::{NewTopic, Topic, TopicFilter, UpdateTopicRequest};

const TOPIC_COLUMNS: &str = "id, module_id, title, description, order_index, created_at";

pub async fn fetch_topics(db: &SqlitePool, filter: &TopicFilter) -> Result<Vec<Topic>, sqlx::Error> {
    match filter.module_id {
        Some(module_id) => {
            sqlx::query_as::<_, Topic>(&format!(
                "SELECT {} FROM topics WHERE module_id = ? ORDER BY order_index, id",
                TOPIC_COLUMNS
            ))
            .bind(module_id)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, Topic>(&format!(
                "SELECT {} FROM topics ORDER BY order_index, id",
                TOPIC_COLUMNS
            ))
            .fetch_all(db)
            .await
        }
    }
}

pub async fn find_topic_by_id(db: &SqlitePool, id: i64) -> Result<Option<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(&format!("SELECT {} FROM topics WHERE id = ?", TOPIC_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_topic(db: &SqlitePool, topic: NewTopic) -> Result<Topic, AppError> {
    if !modules::module_exists(db, topic.module_id).await? {
        return Err(missing_parent("module_id", topic.module_id));
    }

    let now = Utc::now().to_rfc3339();
    let id = sqlx::query(
        r#"
        INSERT INTO topics (module_id, title, description, order_index, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(topic.module_id)
    .bind(&topic.title)
    .bind(&topic.description)
    .bind(topic.order_index)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Topic {
        id,
        module_id: topic.module_id,
        title: topic.title,
        description: topic.description,
        order_index: topic.order_index,
        created_at: now,
    })
}

pub async fn update_topic(
    db: &SqlitePool,
    id: i64,
    req: UpdateTopicRequest,
) -> Result<Option<Topic>, AppError> {
    let mut current = match find_topic_by_id(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    let previous_module = current.module_id;
    req.apply(&mut current)?;
    if current.module_id != previous_module && !modules::module_exists(db, current.module_id).await? {
        return Err(missing_parent("module_id", current.module_id));
    }

    sqlx::query(
        r#"
        UPDATE topics
        SET module_id = ?1,
            title = ?2,
            description = ?3,
            order_index = ?4
        WHERE id = ?5
        "#,
    )
    .bind(current.module_id)
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.order_index)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_topic(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM topics WHERE id = ?")
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
    use crate::db::modules::{delete_module, insert_module};
    use crate::db::setup_test_db;
    use crate::models::{Category, NewModule};

    #[tokio::test]
    async fn test_topics_follow_their_module() {
        let pool = setup_test_db().await;
        let course = insert_course(&pool, new_course("Bash Scripting", Category::Scriptings)).await.unwrap();
        let module = insert_module(
            &pool,
            NewModule {
                course_id: course.id,
                title: "Loops".to_string(),
                description: None,
                order_index: 1,
            },
        )
        .await
        .unwrap();

        let topic = insert_topic(
            &pool,
            NewTopic {
                module_id: module.id,
                title: "for".to_string(),
                description: Some("Iterating over lists".to_string()),
                order_index: 1,
            },
        )
        .await
        .unwrap();

        let listed = fetch_topics(&pool, &TopicFilter { module_id: Some(module.id) }).await.unwrap();
        assert_eq!(listed.len(), 1);

        let req: UpdateTopicRequest = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let updated = update_topic(&pool, topic.id, req).await.unwrap().unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.title, "for");

        assert!(delete_module(&pool, module.id).await.unwrap());
        assert!(find_topic_by_id(&pool, topic.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_topic_requires_existing_module() {
        let pool = setup_test_db().await;
        let err = insert_topic(
            &pool,
            NewTopic {
                module_id: 5,
                title: "Orphan".to_string(),
                description: None,
                order_index: 1,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref e) if e.contains("module_id")));
    }
}
