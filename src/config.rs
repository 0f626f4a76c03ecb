//! Tool configuration.
//!
//! Settings come from an optional `congregation.toml` merged over stock
//! defaults, then from command-line overrides. Every key is optional:
//!
//! ```toml
//! albums_path = "public/photos/albums"       # one folder per member
//! record_file = "checklist_congregation.yaml"
//! network_file = "ccc_network.yaml"
//! backup_malformed = true                    # keep a copy of an unreadable record file
//!
//! [meta]                                     # only used when `meta` is absent
//! church = "Shelter of Praise | Assembly of God"
//! house = "Ascend House"
//! created_by = "CCC Network Admin Team"
//! purpose = "To track congregation members' appointment, participation, and inclusion status"
//!
//! [rename]
//! extensions = ["jpg", "jpeg", "png"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "congregation.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Root of the photo albums; each subdirectory is one member.
    pub albums_path: PathBuf,
    /// The congregation checklist YAML, read and rewritten by `sync`.
    pub record_file: PathBuf,
    /// The house network YAML used by the `house` commands.
    pub network_file: PathBuf,
    /// Copy an unparseable record file aside before it is replaced.
    pub backup_malformed: bool,
    /// Values written into `meta` the first time a record file is created.
    pub meta: MetaDefaults,
    pub rename: RenameConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            albums_path: PathBuf::from("public/photos/albums"),
            record_file: PathBuf::from("checklist_congregation.yaml"),
            network_file: PathBuf::from("ccc_network.yaml"),
            backup_malformed: true,
            meta: MetaDefaults::default(),
            rename: RenameConfig::default(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, path) in [
            ("albums_path", &self.albums_path),
            ("record_file", &self.record_file),
            ("network_file", &self.network_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.rename.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "rename.extensions must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .rename
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.contains('.'))
        {
            return Err(ConfigError::Validation(format!(
                "rename.extensions entries are bare extensions without dots, got {bad:?}"
            )));
        }
        Ok(())
    }
}

/// Descriptive fields seeded into a new record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetaDefaults {
    pub church: String,
    pub house: String,
    pub created_by: String,
    pub purpose: String,
}

impl Default for MetaDefaults {
    fn default() -> Self {
        Self {
            church: "Shelter of Praise | Assembly of God".to_string(),
            house: "Ascend House".to_string(),
            created_by: "CCC Network Admin Team".to_string(),
            purpose: "To track congregation members' appointment, participation, and inclusion status".to_string(),
        }
    }
}

/// Settings for the `rename` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenameConfig {
    /// Extensions (case-insensitive, no dot) of files that get renumbered.
    pub extensions: Vec<String>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}

// =============================================================================
// Loading and merging
// =============================================================================

/// The stock defaults as a TOML table, the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SyncConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SyncConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SyncConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration.
///
/// With an explicit `path` the file must exist. Without one,
/// [`DEFAULT_CONFIG_FILE`] in the working directory is used if present and
/// the stock defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    let overlay = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.to_path_buf()));
            }
            Some(read_toml(p)?)
        }
        None => {
            let p = Path::new(DEFAULT_CONFIG_FILE);
            if p.exists() { Some(read_toml(p)?) } else { None }
        }
    };
    resolve_config(overlay)
}

fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// A fully commented stock `congregation.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# congregation-sync configuration
# ===============================
# All settings are optional. Values shown are the defaults.
# Unknown keys cause an error.

# Root of the photo albums. Every subdirectory holding at least one
# jpg/jpeg/png/gif/webp file is treated as one congregation member.
albums_path = "public/photos/albums"

# Checklist YAML kept in step with the albums by `congregation-sync sync`.
record_file = "checklist_congregation.yaml"

# House network YAML edited by `congregation-sync house ...`.
network_file = "ccc_network.yaml"

# When the checklist cannot be parsed it is rebuilt from scratch. With this
# on, the unreadable original is first copied to
# <record_file>.malformed-<YYYYMMDDHHMMSS>.
backup_malformed = true

# ---------------------------------------------------------------------------
# Document metadata, written only when the checklist has no `meta` yet
# ---------------------------------------------------------------------------
[meta]
church = "Shelter of Praise | Assembly of God"
house = "Ascend House"
created_by = "CCC Network Admin Team"
purpose = "To track congregation members' appointment, participation, and inclusion status"

# ---------------------------------------------------------------------------
# Sequential image renaming
# ---------------------------------------------------------------------------
[rename]
# Extensions (no dot, case-insensitive) of the files that get renumbered.
extensions = ["jpg", "jpeg", "png"]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        SyncConfig::default().validate().unwrap();
    }

    #[test]
    fn no_overlay_gives_defaults() {
        let config = resolve_config(None).unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn partial_overlay_keeps_other_defaults() {
        let overlay: toml::Value = toml::from_str(
            r#"
            albums_path = "photos"
            [meta]
            house = "Zion House"
            "#,
        )
        .unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(config.albums_path, PathBuf::from("photos"));
        assert_eq!(
            config.record_file,
            PathBuf::from("checklist_congregation.yaml")
        );
        assert_eq!(config.meta.house, "Zion House");
        assert_eq!(config.meta.church, MetaDefaults::default().church);
    }

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("album_path = \"typo\"").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn dotted_rename_extension_rejected() {
        let overlay: toml::Value = toml::from_str("[rename]\nextensions = [\".jpg\"]").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_record_file_rejected() {
        let overlay: toml::Value = toml::from_str("record_file = \"\"").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn merge_toml_replaces_scalars_and_merges_tables() {
        let base: toml::Value = toml::from_str("a = 1\n[t]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("a = 5\n[t]\ny = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(5));
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn explicit_missing_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn explicit_config_file_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("c.toml");
        fs::write(&path, "backup_malformed = false\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert!(!config.backup_malformed);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(Some(value)).unwrap();
        assert_eq!(config, SyncConfig::default());
    }
}
