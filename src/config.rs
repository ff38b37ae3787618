//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/conceptmap/conceptmap.toml`
//! 3. Local config: `<dir>/.conceptmap.toml` (usually the working directory)
//! 4. Environment variables: `CONCEPTMAP_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Default ceiling for outline sources (1 MiB).
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 1024 * 1024;

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub meta_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub max_source_bytes: Option<u64>,
    pub default_school: Option<String>,
    pub default_course: Option<String>,
}

/// Unified configuration for conceptmap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding outline sources (`{school}_{course}.txt`)
    pub meta_dir: PathBuf,
    /// Directory receiving generated documents (`{school}_{course}.json`)
    pub data_dir: PathBuf,
    /// Sources larger than this are rejected before parsing
    pub max_source_bytes: u64,
    /// School used when none is given
    pub default_school: String,
    /// Course used when none is given
    pub default_course: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            meta_dir: PathBuf::from("meta"),
            data_dir: PathBuf::from("data"),
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            default_school: "Berkeley".into(),
            default_course: "CS10".into(),
        }
    }
}

/// Get the XDG config directory for conceptmap.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "conceptmap").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("conceptmap.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".conceptmap.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.meta_dir = PathBuf::from(expand_env_vars(&self.meta_dir.to_string_lossy()));
        self.data_dir = PathBuf::from(expand_env_vars(&self.data_dir.to_string_lossy()));
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            meta_dir: overlay
                .meta_dir
                .clone()
                .unwrap_or_else(|| self.meta_dir.clone()),
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            max_source_bytes: overlay.max_source_bytes.unwrap_or(self.max_source_bytes),
            default_school: overlay
                .default_school
                .clone()
                .unwrap_or_else(|| self.default_school.clone()),
            default_course: overlay
                .default_course
                .clone()
                .unwrap_or_else(|| self.default_course.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.conceptmap.toml`
    ///
    /// Relative `meta_dir`/`data_dir` values are kept relative; they resolve
    /// against the process working directory.
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply CONCEPTMAP_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CONCEPTMAP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("meta_dir") {
            settings.meta_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("max_source_bytes") {
            settings.max_source_bytes = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("CONCEPTMAP_MAX_SOURCE_BYTES={val}: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("default_school") {
            settings.default_school = val;
        }
        if let Ok(val) = config.get_string("default_course") {
            settings.default_course = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# conceptmap configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/conceptmap/conceptmap.toml
#   Local:  ./.conceptmap.toml
#   Env:    CONCEPTMAP_* environment variables

# Directory holding outline sources ({school}_{course}.txt)
# meta_dir = "meta"

# Directory receiving generated documents ({school}_{course}.json)
# data_dir = "data"

# Sources larger than this many bytes are rejected before parsing
# max_source_bytes = 1048576

# Used when school/course are not given on the command line
# default_school = "Berkeley"
# default_course = "CS10"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_overlay_fields_when_merging_then_keeps_base() {
        let base = Settings::default();
        let merged = base.merge_with(&RawSettings::default());
        assert_eq!(merged, base);
    }

    #[test]
    fn given_overlay_fields_when_merging_then_overlay_wins() {
        let base = Settings::default();
        let overlay = RawSettings {
            data_dir: Some(PathBuf::from("/srv/maps")),
            max_source_bytes: Some(4096),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.data_dir, PathBuf::from("/srv/maps"));
        assert_eq!(merged.max_source_bytes, 4096);
        assert_eq!(merged.meta_dir, PathBuf::from("meta"));
        assert_eq!(merged.default_course, "CS10");
    }

    #[test]
    fn given_tilde_in_dirs_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            meta_dir: PathBuf::from("~/outlines/meta"),
            data_dir: PathBuf::from("$HOME/outlines/data"),
            ..Default::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.meta_dir.to_string_lossy().starts_with(&home));
        assert!(settings.data_dir.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.meta_dir.is_none());
    }

    #[test]
    fn given_settings_when_rendered_as_toml_then_round_trips() {
        let settings = Settings::default();
        let rendered = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, settings);
    }
}
