use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;

use super::{courses, missing_parent};
use crate::error::AppError;
use crate::models::{Module, ModuleDetail, ModuleFilter, NewModule, Topic, UpdateModuleRequest};

const MODULE_COLUMNS: &str = "id, course_id, title, description, order_index, created_at";

pub async fn fetch_modules(db: &SqlitePool, filter: &ModuleFilter) -> Result<Vec<Module>, sqlx::Error> {
    match filter.course_id {
        Some(course_id) => {
            sqlx::query_as::<_, Module>(&format!(
                "SELECT {} FROM modules WHERE course_id = ? ORDER BY order_index, id",
                MODULE_COLUMNS
            ))
            .bind(course_id)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, Module>(&format!(
                "SELECT {} FROM modules ORDER BY order_index, id",
                MODULE_COLUMNS
            ))
            .fetch_all(db)
            .await
        }
    }
}

/// Modules with their topics attached, both in display order.
pub async fn fetch_module_details(
    db: &SqlitePool,
    filter: &ModuleFilter,
) -> Result<Vec<ModuleDetail>, sqlx::Error> {
    let modules = fetch_modules(db, filter).await?;

    let topics = match filter.course_id {
        Some(course_id) => {
            sqlx::query_as::<_, Topic>(
                r#"
                SELECT t.id, t.module_id, t.title, t.description, t.order_index, t.created_at
                FROM topics t
                JOIN modules m ON m.id = t.module_id
                WHERE m.course_id = ?
                ORDER BY t.order_index, t.id
                "#,
            )
            .bind(course_id)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Topic>(
                "SELECT id, module_id, title, description, order_index, created_at FROM topics ORDER BY order_index, id",
            )
            .fetch_all(db)
            .await?
        }
    };

    Ok(attach_topics(modules, topics))
}

fn attach_topics(modules: Vec<Module>, topics: Vec<Topic>) -> Vec<ModuleDetail> {
    let mut by_module: HashMap<i64, Vec<Topic>> = HashMap::new();
    for topic in topics {
        by_module.entry(topic.module_id).or_default().push(topic);
    }

    modules
        .into_iter()
        .map(|module| {
            let topics = by_module.remove(&module.id).unwrap_or_default();
            ModuleDetail { module, topics }
        })
        .collect()
}

pub async fn find_module_by_id(db: &SqlitePool, id: i64) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!("SELECT {} FROM modules WHERE id = ?", MODULE_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_module_detail(db: &SqlitePool, id: i64) -> Result<Option<ModuleDetail>, sqlx::Error> {
    let module = match find_module_by_id(db, id).await? {
        Some(m) => m,
        None => return Ok(None),
    };

    let topics = sqlx::query_as::<_, Topic>(
        "SELECT id, module_id, title, description, order_index, created_at FROM topics WHERE module_id = ? ORDER BY order_index, id",
    )
    .bind(id)
    .fetch_all(db)
    .await?;

    Ok(Some(ModuleDetail { module, topics }))
}

pub async fn module_exists(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM modules WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_module(db: &SqlitePool, module: NewModule) -> Result<Module, AppError> {
    if !courses::course_exists(db, module.course_id).await? {
        return Err(missing_parent("course_id", module.course_id));
    }

    let now = Utc::now().to_rfc3339();
    let id = sqlx::query(
        r#"
        INSERT INTO modules (course_id, title, description, order_index, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(module.course_id)
    .bind(&module.title)
    .bind(&module.description)
    .bind(module.order_index)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Module {
        id,
        course_id: module.course_id,
        title: module.title,
        description: module.description,
        order_index: module.order_index,
        created_at: now,
    })
}

pub async fn update_module(
    db: &SqlitePool,
    id: i64,
    req: UpdateModuleRequest,
) -> Result<Option<Module>, AppError> {
    let mut current = match find_module_by_id(db, id).await? {
        Some(m) => m,
        None => return Ok(None),
    };

    let previous_course = current.course_id;
    req.apply(&mut current)?;
    if current.course_id != previous_course && !courses::course_exists(db, current.course_id).await? {
        return Err(missing_parent("course_id", current.course_id));
    }

    sqlx::query(
        r#"
        UPDATE modules
        SET course_id = ?1,
            title = ?2,
            description = ?3,
            order_index = ?4
        WHERE id = ?5
        "#,
    )
    .bind(current.course_id)
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.order_index)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_module(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM modules WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
