//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/variantree/variantree.toml`
//! 3. Local config: `<page_dir>/.variantree.toml` (next to the page file)
//! 4. Environment variables: `VARIANTREE_*` prefix

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::FieldKind;

/// Unified configuration for variantree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Page file used when a command is given none
    pub default_page: Option<PathBuf>,
    /// Print node handles next to names in tree output
    pub show_ids: bool,
    /// Attribute keys handed to the renderer as element properties;
    /// everything else is style
    pub html_keys: Vec<String>,
    /// Attribute field overrides, merged over the built-in fieldset
    pub fields: BTreeMap<String, FieldKind>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_page: None,
            show_ids: false,
            html_keys: vec!["src".into(), "text".into()],
            fields: BTreeMap::new(),
        }
    }
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_page: Option<PathBuf>,
    pub show_ids: Option<bool>,
    pub html_keys: Option<Vec<String>>,
    pub fields: Option<BTreeMap<String, FieldKind>>,
}

/// Get the XDG config directory for variantree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "variantree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("variantree.toml"))
}

/// Get the path to the local config file in a page directory.
pub fn local_config_path(page_dir: &Path) -> PathBuf {
    page_dir.join(".variantree.toml")
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

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        // Convert to sorted Vec for deterministic output
        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay config onto self (base) with union semantics.
    ///
    /// - Scalars: overlay wins if Some, otherwise keep base
    /// - `html_keys`: union merge with negation support
    /// - `fields`: per-key, overlay wins
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut fields = self.fields.clone();
        if let Some(extra) = &overlay.fields {
            fields.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self {
            default_page: overlay
                .default_page
                .clone()
                .or_else(|| self.default_page.clone()),
            show_ids: overlay.show_ids.unwrap_or(self.show_ids),
            html_keys: overlay
                .html_keys
                .as_ref()
                .map(|o| Self::merge_array(&self.html_keys, o))
                .unwrap_or_else(|| self.html_keys.clone()),
            fields,
        }
    }

    /// Apply global config onto defaults with REPLACE semantics.
    ///
    /// Defaults are just examples. Global config defines the real baseline,
    /// local config (using `merge_with()`) then adds page-specific entries.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            default_page: global
                .default_page
                .clone()
                .or_else(|| self.default_page.clone()),
            show_ids: global.show_ids.unwrap_or(self.show_ids),
            html_keys: global
                .html_keys
                .clone()
                .unwrap_or_else(|| self.html_keys.clone()),
            fields: global.fields.clone().unwrap_or_else(|| self.fields.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `page_dir` - Optional directory of the page file, for local config
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE (global defines the real baseline)
    /// - Global → Local: UNION with negation support
    /// - Any → Env vars: REPLACE (explicit user override)
    pub fn load(page_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Load global config (REPLACES defaults)
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        // 3. Load and merge local config (UNION with global)
        if let Some(dir) = page_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Apply environment variables (replaces - explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Load ONLY the local config file of a page directory, if it exists.
    ///
    /// Merged onto compiled defaults, without global config or env vars.
    pub fn load_local_only(page_dir: &Path) -> Result<Option<Self>, ApplicationError> {
        let local_path = local_config_path(page_dir);
        if !local_path.exists() {
            return Ok(None);
        }
        let raw = load_raw_settings(&local_path)?;
        let mut settings = Self::default().merge_with(&raw);
        settings.expand_paths();
        Ok(Some(settings))
    }

    /// Apply VARIANTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("VARIANTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("html_keys"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("default_page") {
            settings.default_page = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("show_ids") {
            settings.show_ids = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("html_keys") {
            settings.html_keys = val;
        }

        Ok(settings)
    }

    fn expand_paths(&mut self) {
        if let Some(page) = &self.default_page {
            self.default_page = Some(expand_path(page));
        }
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
