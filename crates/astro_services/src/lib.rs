//! Astro Services Layer
//!
//! Disk-facing services around the handle layer: settings and save files.

pub mod save;
pub mod settings;

pub use save::{read_save, write_save, SaveError};
pub use settings::{Settings, SettingsError};
