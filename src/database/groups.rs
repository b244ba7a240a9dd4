// file: src/database/groups.rs
use crate::models::Group;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: String,
    name: String,
    calendars: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self) -> Result<Group> {
        let calendars: Vec<String> = serde_json::from_str(&self.calendars)
            .with_context(|| format!("Corrupt calendar list for group {}", self.id))?;
        Ok(Group {
            id: self.id,
            name: self.name,
            calendars,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_GROUP: &str = "SELECT id, name, calendars, created_at, updated_at FROM calendar_groups";

pub async fn insert<'e, E>(executor: E, group: &Group) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO calendar_groups (id, name, calendars, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&group.id)
    .bind(&group.name)
    .bind(serde_json::to_string(&group.calendars)?)
    .bind(group.created_at)
    .bind(group.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Inserts every group in one transaction; nothing is written if any fails.
pub async fn insert_all(pool: &SqlitePool, groups: &[Group]) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;
    for group in groups {
        insert(&mut *tx, group)
            .await
            .with_context(|| format!("Failed to insert group '{}'", group.name))?;
    }
    tx.commit().await.context("Failed to commit groups")?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Group>> {
    let row = sqlx::query_as::<_, GroupRow>(&format!("{} WHERE id = ?", SELECT_GROUP))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(GroupRow::into_group).transpose()
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Group>> {
    let row = sqlx::query_as::<_, GroupRow>(&format!("{} WHERE name = ?", SELECT_GROUP))
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.map(GroupRow::into_group).transpose()
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Group>> {
    let rows = sqlx::query_as::<_, GroupRow>(&format!("{} ORDER BY created_at ASC, name ASC", SELECT_GROUP))
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(GroupRow::into_group).collect()
}

/// Returns `false` when no group has that id.
pub async fn update(pool: &SqlitePool, group: &Group) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE calendar_groups SET name = ?, calendars = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&group.name)
    .bind(serde_json::to_string(&group.calendars)?)
    .bind(group.updated_at)
    .bind(&group.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns `false` when no group has that id.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM calendar_groups WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
