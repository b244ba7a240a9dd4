use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Uncheck calendars outside the group when applying it.
    pub disable_others: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            disable_others: true,
        }
    }
}
