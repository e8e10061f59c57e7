//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.json`. The user's file is
//! sparse: it is deep-merged over the stock defaults, so it only needs the keys
//! it wants to change. Unknown keys are rejected to catch typos early.
//! A user `menuitems` replaces the stock menu seed rather than merging into it.
//!
//! ## Configuration Options
//!
//! ```json
//! {
//!   "src_path": "content",
//!   "build_path": "output",
//!   "theme_path": "theme",
//!   "home": "home",
//!   "archive": "archive",
//!   "menuitems": { "home": "", "archive": "archive" },
//!   "thumbnail_size": [800, 800],
//!   "thumbnail_quality": 95,
//!   "mangle_image_name": false,
//!   "markdown_extensions": ["meta", "fenced_code", "tables"],
//!   "post_url": "{{post_url}}",
//!   "build_date_template": "{{build_date}}",
//!   "remote_bucket": null,
//!   "site": { "name": "My site" }
//! }
//! ```
//!
//! Relative paths resolve against the directory that holds `config.json`.
//! Everything under `site` is forwarded to templates untouched.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up by default.
pub const CONFIG_FILE: &str = "config.json";

/// Markdown extension names understood by [`crate::markdown::MarkdownConverter`].
pub const KNOWN_MARKDOWN_EXTENSIONS: &[&str] = &[
    "meta",
    "fenced_code",
    "codehilite",
    "tables",
    "footnotes",
    "strikethrough",
    "del",
    "tasklists",
    "smarty",
    "smart_punctuation",
    "math",
    "mdx_math",
    "attr_list",
    "heading_attributes",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.json`.
///
/// All fields have defaults. This is the immutable base every render context
/// is built from; nothing mutates it once loading is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content root, holding `posts/`, `pages/`, `images/` and `data/`.
    pub src_path: PathBuf,
    /// Output root.
    pub build_path: PathBuf,
    /// Theme root. Templates live in `<theme_path>/templates`.
    pub theme_path: PathBuf,
    /// Identifier of the page rendered at the site root.
    pub home: String,
    /// Identifier of the archive page.
    pub archive: String,
    /// Navigation seed; discovered pages are appended after these.
    pub menuitems: Menu,
    /// Thumbnail bound as `[width, height]`.
    pub thumbnail_size: [u32; 2],
    /// JPEG quality used when saving thumbnails (1-100).
    pub thumbnail_quality: u32,
    /// Rename gallery images to `<index>-<sha7>.<ext>`.
    pub mangle_image_name: bool,
    /// Markdown extensions to enable, see [`KNOWN_MARKDOWN_EXTENSIONS`].
    pub markdown_extensions: Vec<String>,
    /// Token in post bodies replaced by the post's own URL.
    pub post_url: String,
    /// Token in page bodies replaced by the build date.
    pub build_date_template: String,
    /// Optional remote bucket synced into the site root before discovery.
    pub remote_bucket: Option<String>,
    /// Free-form values forwarded to templates.
    pub site: Map<String, Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            src_path: PathBuf::from("content"),
            build_path: PathBuf::from("output"),
            theme_path: PathBuf::from("theme"),
            home: "home".to_string(),
            archive: "archive".to_string(),
            menuitems: Menu::from_pairs([("home", ""), ("archive", "archive")]),
            thumbnail_size: [800, 800],
            thumbnail_quality: 95,
            mangle_image_name: false,
            markdown_extensions: vec![
                "meta".to_string(),
                "fenced_code".to_string(),
                "tables".to_string(),
            ],
            post_url: "{{post_url}}".to_string(),
            build_date_template: "{{build_date}}".to_string(),
            remote_bucket: None,
            site: Map::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnail_size[0] == 0 || self.thumbnail_size[1] == 0 {
            return Err(ConfigError::Validation(
                "thumbnail_size values must be non-zero".into(),
            ));
        }
        if self.thumbnail_quality == 0 || self.thumbnail_quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnail_quality must be 1-100".into(),
            ));
        }
        if self.home.is_empty() {
            return Err(ConfigError::Validation("home must not be empty".into()));
        }
        if self.post_url.is_empty() || self.build_date_template.is_empty() {
            return Err(ConfigError::Validation(
                "placeholder tokens must not be empty".into(),
            ));
        }
        if let Some(unknown) = self
            .markdown_extensions
            .iter()
            .find(|ext| !KNOWN_MARKDOWN_EXTENSIONS.contains(&ext.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "unknown markdown extension: {unknown}"
            )));
        }
        Ok(())
    }

    /// Thumbnail bound as a `(width, height)` tuple.
    pub fn thumbnail_bound(&self) -> (u32, u32) {
        (self.thumbnail_size[0], self.thumbnail_size[1])
    }
}

/// Ordered mapping from page identifier to output link.
///
/// Serialized as a JSON object so templates can iterate it as
/// `menuitems.items()`; insertion order is preserved both ways.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Menu {
    entries: Vec<(String, String)>,
}

impl Menu {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(name, link)| (name.to_string(), link.to_string()))
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, link)| link.as_str())
    }

    /// Append an entry unless the name is already present.
    pub fn insert_missing(&mut self, name: &str, link: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name.to_string(), link.to_string()));
        true
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, l)| (n.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for Menu {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let entries = map
            .into_iter()
            .map(|(name, link)| match link {
                Value::String(link) => Ok((name, link)),
                other => Err(format!("menu item {name} must map to a string, got {other}")),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }
}

impl Serialize for Menu {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, link) in &self.entries {
            map.serialize_entry(name, link)?;
        }
        map.end()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a JSON object.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<Value, ConfigError> {
    Ok(serde_json::to_value(SiteConfig::default())?)
}

/// Top-level keys whose user value replaces the stock value as a whole.
///
/// A menu is a list the user curates, so `{"home": ""}` means a menu with
/// only `home`, not the stock seed with `home` re-stated.
const REPLACED_KEYS: &[&str] = &["menuitems"];

/// Recursively merge `overlay` on top of `base`.
///
/// - Objects are merged key-by-key (overlay keys override base keys).
/// - Non-object values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved, in their position.
/// - New overlay keys are appended in overlay order.
pub fn merge_json(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_val) => *base_val = merge_json(base_val.take(), overlay_val),
                    None => {
                        base_map.insert(key, overlay_val);
                    }
                }
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge a user config over the stock defaults.
///
/// Like [`merge_json`], except that [`REPLACED_KEYS`] given by the user
/// replace the stock value instead of merging into it.
pub fn merge_config(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(mut overlay_map)) => {
            for key in REPLACED_KEYS {
                if let Some(user) = overlay_map.shift_remove(*key) {
                    base_map.insert(key.to_string(), user);
                }
            }
            merge_json(Value::Object(base_map), Value::Object(overlay_map))
        }
        (base, overlay) => merge_json(base, overlay),
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(base: Value, overlay: Option<Value>) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_config(base, ov),
        None => base,
    };
    let config: SiteConfig = serde_json::from_value(merged)?;
    config.validate()?;
    Ok(config)
}

/// Load a config file, merge it over stock defaults, reject unknown keys and
/// validate the result. A missing file is an error: a site without a config
/// has no idea where its content lives.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let overlay: Value = serde_json::from_str(&content)?;
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Returns a stock `config.json` with every key at its default value.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_json() -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(&SiteConfig::default())?)
}
