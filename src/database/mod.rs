// file: src/database/mod.rs

use crate::error::{AppError, AppResult};
use crate::models::{Group, Settings};
use crate::storage::GroupStore;
use crate::utils::logging::log_store_operation;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Sqlite};
use std::path::{Path, PathBuf};
use std::time::Instant;

// Declare submodules
pub mod groups;
pub mod settings;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) `calgroup/calgroup.db` under `data_dir`.
    pub async fn open_in(data_dir: &Path) -> Result<Self> {
        Self::open(&path_in(data_dir)).await
    }

    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        let db_exists = Sqlite::database_exists(&db_url)
            .await
            .context("Failed to check if database exists")?;
        if !db_exists {
            info!("Creating database at {}", path.display());
            Sqlite::create_database(&db_url)
                .await
                .context("Failed to create database")?;
        }

        let pool = SqlitePool::connect(&db_url)
            .await
            .context("Failed to connect to database")?;
        run_schema(&pool).await.context("Failed to run database schema")?;

        info!("Database initialized successfully");
        Ok(Database { pool })
    }

    // --- Group Delegates ---

    pub async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        groups::get(&self.pool, id).await
    }

    pub async fn get_groups(&self) -> Result<Vec<Group>> {
        groups::get_all(&self.pool).await
    }

    // --- Settings Delegates ---

    pub async fn get_settings(&self) -> Result<Settings> {
        settings::get(&self.pool).await
    }

    pub async fn update_settings(&self, settings: &Settings) -> Result<()> {
        settings::update(&self.pool, settings).await
    }
}

/// Database file in the user's data directory.
pub fn default_path() -> Result<PathBuf> {
    let dir = dirs::data_dir().context("No data directory for this platform")?;
    Ok(path_in(&dir))
}

pub fn path_in(data_dir: &Path) -> PathBuf {
    data_dir.join("calgroup").join("calgroup.db")
}

pub async fn run_schema(pool: &SqlitePool) -> Result<()> {
    let schema = include_str!("schema.sql");

    let mut statement = String::new();
    for line in schema.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }
        statement.push_str(line);
        statement.push('\n');
        if trimmed.ends_with(';') {
            sqlx::query(&statement).execute(pool).await?;
            statement.clear();
        }
    }
    Ok(())
}

#[async_trait]
impl GroupStore for Database {
    async fn load_group(&self, id: &str) -> AppResult<Option<Group>> {
        Ok(groups::get(&self.pool, id).await?)
    }

    async fn load_settings(&self) -> AppResult<Settings> {
        Ok(settings::get(&self.pool).await?)
    }

    async fn save_settings(&self, settings: &Settings) -> AppResult<()> {
        Ok(settings::update(&self.pool, settings).await?)
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        Ok(groups::get_all(&self.pool).await?)
    }

    async fn create_group(&self, group: &Group) -> AppResult<()> {
        let started = Instant::now();
        if groups::find_by_name(&self.pool, &group.name).await?.is_some() {
            return Err(AppError::conflict(format!(
                "A group named '{}' already exists",
                group.name
            )));
        }
        groups::insert(&self.pool, group).await?;
        log_store_operation("insert", "calendar_groups", started.elapsed().as_millis() as u64);
        Ok(())
    }

    async fn create_groups(&self, batch: &[Group]) -> AppResult<()> {
        let started = Instant::now();
        for group in batch {
            if groups::find_by_name(&self.pool, &group.name).await?.is_some() {
                return Err(AppError::conflict(format!(
                    "A group named '{}' already exists",
                    group.name
                )));
            }
        }
        groups::insert_all(&self.pool, batch).await?;
        log_store_operation("insert_all", "calendar_groups", started.elapsed().as_millis() as u64);
        Ok(())
    }

    async fn update_group(&self, group: &Group) -> AppResult<()> {
        let started = Instant::now();
        if let Some(existing) = groups::find_by_name(&self.pool, &group.name).await? {
            if existing.id != group.id {
                return Err(AppError::conflict(format!(
                    "A group named '{}' already exists",
                    group.name
                )));
            }
        }
        if !groups::update(&self.pool, group).await? {
            return Err(AppError::not_found(format!("group {}", group.id)));
        }
        log_store_operation("update", "calendar_groups", started.elapsed().as_millis() as u64);
        Ok(())
    }

    async fn delete_group(&self, id: &str) -> AppResult<()> {
        if !groups::delete(&self.pool, id).await? {
            return Err(AppError::not_found(format!("group {}", id)));
        }
        Ok(())
    }
}

/// Single-connection in-memory pool with the schema applied.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_schema(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_rejects_duplicate_names() {
        let db = Database { pool: test_pool().await };
        let work = Group::new("Work", vec!["Team".to_string()]).unwrap();
        db.create_group(&work).await.unwrap();

        let clash = Group::new("Work", vec!["Ops".to_string()]).unwrap();
        assert!(matches!(db.create_group(&clash).await, Err(AppError::Conflict(_))));

        let mut home = Group::new("Home", vec!["Family".to_string()]).unwrap();
        db.create_group(&home).await.unwrap();
        home.update("Work", vec!["Family".to_string()]).unwrap();
        assert!(matches!(db.update_group(&home).await, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_default_path_is_under_data_dir() {
        match dirs::data_dir() {
            Some(dir) => {
                let path = default_path().unwrap();
                assert!(path.starts_with(&dir));
                assert!(path.ends_with("calgroup/calgroup.db"));
            }
            None => assert!(default_path().is_err()),
        }
    }

    #[tokio::test]
    async fn test_store_not_found() {
        let db = Database { pool: test_pool().await };
        let ghost = Group::new("Ghost", vec!["Team".to_string()]).unwrap();
        assert!(matches!(db.update_group(&ghost).await, Err(AppError::NotFound(_))));
        assert!(matches!(db.delete_group(&ghost.id).await, Err(AppError::NotFound(_))));
        assert!(db.load_group(&ghost.id).await.unwrap().is_none());
    }
}
