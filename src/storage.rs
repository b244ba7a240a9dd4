use crate::error::AppResult;
use crate::models::{Group, Settings};
use async_trait::async_trait;

/// Persistent groups and settings, as the host side consumes them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn load_group(&self, id: &str) -> AppResult<Option<Group>>;

    /// Defaults are applied for absent keys.
    async fn load_settings(&self) -> AppResult<Settings>;

    async fn save_settings(&self, settings: &Settings) -> AppResult<()>;

    /// Oldest first.
    async fn list_groups(&self) -> AppResult<Vec<Group>>;

    /// Fails with `Conflict` when the name is taken.
    async fn create_group(&self, group: &Group) -> AppResult<()>;

    /// All or nothing. Fails with `Conflict` when any name is taken.
    async fn create_groups(&self, groups: &[Group]) -> AppResult<()>;

    /// Fails with `NotFound` for an unknown id, `Conflict` when renaming onto
    /// another group's name.
    async fn update_group(&self, group: &Group) -> AppResult<()>;

    async fn delete_group(&self, id: &str) -> AppResult<()>;
}
