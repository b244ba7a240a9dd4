//! JSON import/export of groups.

use crate::error::{AppError, AppResult};
use crate::models::Group;
use crate::storage::GroupStore;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupExport {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub groups: Vec<Group>,
}

/// Older exports were a bare array of groups.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Versioned(GroupExport),
    Bare(Vec<Group>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub imported: Vec<String>,
    /// Names that already existed and were left untouched.
    pub skipped: Vec<String>,
}

pub fn export_groups(groups: &[Group]) -> AppResult<String> {
    let document = GroupExport {
        version: EXPORT_VERSION,
        exported_at: Utc::now(),
        groups: groups.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses an export and validates every group in it.
pub fn parse_import(json: &str) -> AppResult<Vec<Group>> {
    let groups = match serde_json::from_str::<ImportDocument>(json)? {
        ImportDocument::Versioned(document) => {
            if document.version > EXPORT_VERSION {
                return Err(AppError::invalid_input(format!(
                    "Export version {} is newer than supported version {}",
                    document.version, EXPORT_VERSION
                )));
            }
            document.groups
        }
        ImportDocument::Bare(groups) => groups,
    };

    let mut names = HashSet::new();
    for group in &groups {
        group.validate()?;
        if !names.insert(group.name.as_str()) {
            return Err(AppError::invalid_input(format!(
                "Group '{}' appears twice in the import",
                group.name
            )));
        }
    }
    Ok(groups)
}

/// Adds imported groups whose names are not taken yet, all in one write.
/// Ids that collide with a stored group or an earlier imported one are
/// replaced.
pub async fn import_groups<S: GroupStore + ?Sized>(store: &S, json: &str) -> AppResult<ImportReport> {
    let incoming = parse_import(json)?;
    let existing = store.list_groups().await?;
    let names: HashSet<&str> = existing.iter().map(|g| g.name.as_str()).collect();
    let mut ids: HashSet<String> = existing.iter().map(|g| g.id.clone()).collect();

    let mut report = ImportReport::default();
    let mut accepted = Vec::new();
    for mut group in incoming {
        if names.contains(group.name.as_str()) {
            warn!("Skipping import of '{}': name already exists", group.name);
            report.skipped.push(group.name);
            continue;
        }
        if ids.contains(&group.id) {
            group.id = uuid::Uuid::new_v4().to_string();
        }
        ids.insert(group.id.clone());
        report.imported.push(group.name.clone());
        accepted.push(group);
    }

    if !accepted.is_empty() {
        store.create_groups(&accepted).await?;
    }
    info!(
        "Imported {} groups, skipped {}",
        report.imported.len(),
        report.skipped.len()
    );
    Ok(report)
}

pub async fn export_to_file<S: GroupStore + ?Sized>(store: &S, path: &Path) -> AppResult<usize> {
    let groups = store.list_groups().await?;
    tokio::fs::write(path, export_groups(&groups)?).await?;
    info!("Exported {} groups to {}", groups.len(), path.display());
    Ok(groups.len())
}

pub async fn import_from_file<S: GroupStore + ?Sized>(store: &S, path: &Path) -> AppResult<ImportReport> {
    let json = tokio::fs::read_to_string(path).await?;
    import_groups(store, &json).await
}
