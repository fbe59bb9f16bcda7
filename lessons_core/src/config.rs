//! Configuration file support for the booking system.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lhub/config.toml`.

use crate::catalog::{build_default_catalog, Catalog};
use crate::types::{Lesson, LessonKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub scheduling: SchedulingConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Default escape hatches applied when the CLI creates entries
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct SchedulingConfig {
    #[serde(default)]
    pub allow_overlap: bool,

    #[serde(default)]
    pub allow_besides_working_hours: bool,
}

/// Custom lesson definition added on top of the default catalog
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomLesson {
    pub id: String,
    pub name: String,
    pub kind: LessonKind,

    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,

    #[serde(default = "default_slots")]
    pub slots: u32,
}

/// Catalog overrides configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub custom: Vec<CustomLesson>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("lhub")
}

fn default_duration_minutes() -> u32 {
    30
}

fn default_slots() -> u32 {
    1
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("lhub").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Build the catalog: defaults plus the configured custom lessons
    ///
    /// Custom lessons of hosted kinds start host-less; a host is assigned
    /// later through the store, which validates the assignment.
    pub fn build_catalog(&self) -> Catalog {
        let mut catalog = build_default_catalog();
        for custom in &self.catalog.custom {
            catalog.lessons.insert(
                custom.id.clone(),
                Lesson {
                    id: custom.id.clone(),
                    name: custom.name.clone(),
                    kind: custom.kind,
                    duration_minutes: custom.duration_minutes,
                    slots: custom.slots,
                    host: None,
                    active: true,
                },
            );
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.scheduling.allow_overlap);
        assert!(!config.scheduling.allow_besides_working_hours);
        assert!(config.catalog.custom.is_empty());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.scheduling.allow_overlap,
            parsed.scheduling.allow_overlap
        );
        assert_eq!(config.data.data_dir, parsed.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[scheduling]
allow_overlap = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.scheduling.allow_overlap);
        assert!(!config.scheduling.allow_besides_working_hours); // default
    }

    #[test]
    fn test_custom_lessons_extend_catalog() {
        let toml_str = r#"
[[catalog.custom]]
id = "long_ordinary"
name = "Long curated session"
kind = "ordinary"
duration_minutes = 60
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let catalog = config.build_catalog();

        let lesson = catalog.lessons.get("long_ordinary").unwrap();
        assert_eq!(lesson.duration_minutes, 60);
        assert_eq!(lesson.slots, 1); // default
        assert!(catalog.validate().is_empty());
    }
}
