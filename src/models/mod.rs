// Declare modules
pub mod group;
pub mod settings;
pub mod toggle;

// Re-export so callers can use `crate::Group` directly.
pub use group::Group;
pub use settings::Settings;
pub use toggle::ToggleHandle;
