use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named set of calendar labels that should be enabled together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Exact-match labels, trimmed, in the order the user declared them.
    pub calendars: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: &str, calendars: Vec<String>) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: normalize_name(name)?,
            calendars: normalize_calendars(calendars)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces name and calendars, keeping id and creation time.
    pub fn update(&mut self, name: &str, calendars: Vec<String>) -> AppResult<()> {
        self.name = normalize_name(name)?;
        self.calendars = normalize_calendars(calendars)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.calendars.iter().any(|calendar| calendar == label)
    }

    /// Re-checks the invariants of a group that came from outside
    /// (storage, import, a message).
    pub fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::invalid_input("Group id is empty"));
        }
        let name = normalize_name(&self.name)?;
        if name != self.name {
            return Err(AppError::invalid_input(format!(
                "Group name '{}' has surrounding whitespace",
                self.name
            )));
        }
        let calendars = normalize_calendars(self.calendars.clone())?;
        if calendars != self.calendars {
            return Err(AppError::invalid_input(format!(
                "Group '{}' has untrimmed calendar names",
                self.name
            )));
        }
        Ok(())
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_input("Group name is empty"));
    }
    Ok(name.to_string())
}

fn normalize_calendars(calendars: Vec<String>) -> AppResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(calendars.len());
    for calendar in calendars {
        let calendar = calendar.trim().to_string();
        if calendar.is_empty() {
            return Err(AppError::invalid_input("Calendar name is empty"));
        }
        if !seen.insert(calendar.clone()) {
            return Err(AppError::invalid_input(format!(
                "Calendar '{}' is listed twice",
                calendar
            )));
        }
        normalized.push(calendar);
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_trims_and_keeps_order() {
        let group = Group::new("  Work ", names(&[" Team ", "Personal", "Holidays"])).unwrap();
        assert_eq!(group.name, "Work");
        assert_eq!(group.calendars, names(&["Team", "Personal", "Holidays"]));
        assert!(group.contains("Team"));
        assert!(!group.contains(" Team "));
        assert_eq!(group.created_at, group.updated_at);
        assert!(group.validate().is_ok());
    }

    #[test]
    fn test_duplicates_rejected_after_trim() {
        let result = Group::new("Work", names(&["Team", "Team "]));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Group::new("   ", names(&["Team"])).is_err());
        assert!(Group::new("Work", names(&[""])).is_err());
    }

    #[test]
    fn test_update_keeps_identity() {
        let mut group = Group::new("Work", names(&["Team"])).unwrap();
        let id = group.id.clone();
        group.update("Office", names(&["Team", "Ops"])).unwrap();
        assert_eq!(group.id, id);
        assert_eq!(group.name, "Office");
        assert!(group.updated_at >= group.created_at);
    }

    #[test]
    fn test_serializes_camel_case() {
        let group = Group::new("Work", names(&["Team"])).unwrap();
        let json = serde_json::to_value(&group).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["calendars"][0], "Team");
    }
}
