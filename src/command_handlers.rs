//! Host-side handlers
//!
//! Glue between the storage collaborator and the content side: group CRUD
//! with validation, settings updates, and building the `applyGroup` message.

use crate::error::{AppError, AppResult};
use crate::messages::Request;
use crate::models::{Group, Settings};
use crate::storage::GroupStore;
use log::info;

pub struct GroupHandlers<S: GroupStore> {
    pub store: S,
}

impl<S: GroupStore> GroupHandlers<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads a group and the current settings and builds the message the
    /// content side expects.
    pub async fn prepare_apply(&self, group_id: &str) -> AppResult<Request> {
        let group = self
            .store
            .load_group(group_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("group {}", group_id)))?;
        let settings = self.store.load_settings().await?;
        info!(
            "Applying group '{}' ({} calendars, disable others: {})",
            group.name,
            group.calendars.len(),
            settings.disable_others
        );
        Ok(Request::ApplyGroup { group, settings })
    }

    pub async fn list_groups(&self) -> AppResult<Vec<Group>> {
        self.store.list_groups().await
    }

    pub async fn create_group(&self, name: &str, calendars: Vec<String>) -> AppResult<Group> {
        let group = Group::new(name, calendars)?;
        self.store.create_group(&group).await?;
        info!("Created group '{}'", group.name);
        Ok(group)
    }

    pub async fn update_group(&self, id: &str, name: &str, calendars: Vec<String>) -> AppResult<Group> {
        let mut group = self
            .store
            .load_group(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("group {}", id)))?;
        group.update(name, calendars)?;
        self.store.update_group(&group).await?;
        info!("Updated group '{}'", group.name);
        Ok(group)
    }

    pub async fn delete_group(&self, id: &str) -> AppResult<()> {
        self.store.delete_group(id).await?;
        info!("Deleted group {}", id);
        Ok(())
    }

    pub async fn set_disable_others(&self, disable_others: bool) -> AppResult<Settings> {
        let mut settings = self.store.load_settings().await?;
        settings.disable_others = disable_others;
        self.store.save_settings(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockGroupStore;

    fn work() -> Group {
        Group::new("Work", vec!["Team".to_string(), "Ops".to_string()]).unwrap()
    }

    #[tokio::test]
    async fn test_prepare_apply_builds_request() {
        let group = work();
        let id = group.id.clone();
        let mut store = MockGroupStore::new();
        store
            .expect_load_group()
            .withf({
                let id = id.clone();
                move |requested| requested == id
            })
            .returning(move |_| Ok(Some(group.clone())));
        store
            .expect_load_settings()
            .returning(|| Ok(Settings { disable_others: false }));

        let handlers = GroupHandlers::new(store);
        match handlers.prepare_apply(&id).await.unwrap() {
            Request::ApplyGroup { group, settings } => {
                assert_eq!(group.name, "Work");
                assert!(!settings.disable_others);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prepare_apply_unknown_group() {
        let mut store = MockGroupStore::new();
        store.expect_load_group().returning(|_| Ok(None));
        store.expect_load_settings().never();

        let handlers = GroupHandlers::new(store);
        let result = handlers.prepare_apply("nope").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_group_validates_before_storing() {
        let mut store = MockGroupStore::new();
        store.expect_create_group().never();

        let handlers = GroupHandlers::new(store);
        let result = handlers
            .create_group("Work", vec!["Team".to_string(), " Team".to_string()])
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_set_disable_others_persists() {
        let mut store = MockGroupStore::new();
        store.expect_load_settings().returning(|| Ok(Settings::default()));
        store
            .expect_save_settings()
            .withf(|settings| !settings.disable_others)
            .times(1)
            .returning(|_| Ok(()));

        let handlers = GroupHandlers::new(store);
        let settings = handlers.set_disable_others(false).await.unwrap();
        assert!(!settings.disable_others);
    }
}
