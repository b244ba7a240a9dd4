// calgroup library
// Applies saved calendar groups to a calendar web page's sidebar toggles

pub mod config;
pub mod content;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod load_gate;
pub mod messages;
pub mod models;
pub mod reconcile;
pub mod utils;

#[cfg(not(target_arch = "wasm32"))]
pub mod command_handlers;
#[cfg(not(target_arch = "wasm32"))]
pub mod database;
#[cfg(not(target_arch = "wasm32"))]
pub mod storage;
#[cfg(not(target_arch = "wasm32"))]
pub mod transfer;

// Re-export commonly used types
pub use config::DiscoveryConfig;
pub use content::ContentScript;
pub use dom::{MemoryPage, Page, Selector};
pub use error::{AppError, AppResult};
pub use messages::{Request, Response};
pub use models::*;
pub use reconcile::{ApplySummary, GroupReconciler};
pub use utils::clock::{Clock, ManualClock};

#[cfg(not(target_arch = "wasm32"))]
pub use database::Database;
#[cfg(not(target_arch = "wasm32"))]
pub use storage::GroupStore;
