//! Settings management

use astro_core::{AllocatorConfig, EntityType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game settings
///
/// ```json
/// { "allocators": { "ship": { "starting_capacity": 256 } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Allocator tuning keyed by entity type name (`"ship"`, `"task"`, ...).
    pub allocators: BTreeMap<String, AllocatorConfig>,
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "settings file not found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        let settings: Self = serde_json::from_str(&text)?;
        for name in settings.allocators.keys() {
            if EntityType::from_name(name).is_none() {
                tracing::warn!(%name, "settings name an unknown entity type");
            }
        }
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Configuration for the allocator of `entity_type`, or the default.
    pub fn allocator(&self, entity_type: EntityType) -> AllocatorConfig {
        entity_type
            .name()
            .and_then(|name| self.allocators.get(name))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("astro-settings-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = Settings::load(scratch("missing.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.allocator(EntityType::SHIP), AllocatorConfig::default());
    }

    #[test]
    fn configured_types_override_defaults() {
        let path = scratch("ships.json");
        std::fs::write(
            &path,
            r#"{ "allocators": { "ship": { "starting_capacity": 256, "grow_by": 64 } } }"#,
        )
        .unwrap();
        let settings = Settings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let ships = settings.allocator(EntityType::SHIP);
        assert_eq!(ships.starting_capacity, 256);
        assert_eq!(ships.grow_by, 64);
        assert!(ships.reset_on_free);
        assert_eq!(settings.allocator(EntityType::TASK), AllocatorConfig::default());
    }

    #[test]
    fn save_then_load() {
        let path = scratch("round.json");
        let mut settings = Settings::default();
        settings.allocators.insert(
            "task".to_owned(),
            AllocatorConfig::default().with_max_forced_gap(Some(4096)),
        );
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = scratch("broken.json");
        std::fs::write(&path, "{ allocators: ").unwrap();
        let result = Settings::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }
}
