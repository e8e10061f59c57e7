//! Metadata normalization.
//!
//! Front matter arrives as a multimap of strings ([`RawMeta`]). Normalization
//! turns it into typed, single-valued [`Meta`]:
//!
//! | Field | Rule |
//! |---|---|
//! | empty value | skipped, the field stays absent |
//! | `data`, `image` = `"false"` | [`MetaValue::Flag`]`(false)` |
//! | `date` | parsed as `YYYY-MM-DD` into [`MetaValue::Date`] |
//! | `tags` | split on `,`, trimmed, empties dropped → [`MetaValue::List`] |
//! | anything else | collapsed to its last value → [`MetaValue::Text`] |
//!
//! Normalization is a pure function. The tags and category it encounters are
//! handed back in [`Normalized`] so the caller can fold them into the site
//! [`Taxonomy`]; nothing is written to shared state from here.

use crate::markdown::RawMeta;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Date format accepted in front matter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields whose literal `"false"` means "explicitly off".
const SENTINEL_FIELDS: &[&str] = &["data", "image"];

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid date '{value}' (expected YYYY-MM-DD): {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A single normalized metadata value.
///
/// Serializes untagged so templates see plain strings, booleans and lists.
/// Dates serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Flag(bool),
    Date(NaiveDate),
    Text(String),
    List(Vec<String>),
    Size([u32; 2]),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Present and meaningful: not `false`, not an empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => !s.is_empty(),
            _ => true,
        }
    }
}

/// Publication status of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Draft,
    Published,
    Other(String),
}

impl Status {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("published") => Self::Published,
            Some("draft") => Self::Draft,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other(String::new()),
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Normalized metadata of one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Meta(BTreeMap<String, MetaValue>);

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.0.insert(key.into(), value);
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaValue::as_str)
    }

    /// Truthiness as used by the classifier: absent, `false` and `""` are all off.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(MetaValue::is_truthy)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self.get("date") {
            Some(MetaValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self.get("tags") {
            Some(MetaValue::List(tags)) => tags,
            _ => &[],
        }
    }

    pub fn status(&self) -> Status {
        Status::parse(self.text("status"))
    }

    /// Page kind, used to pick the page template.
    pub fn kind(&self) -> Option<&str> {
        self.text("type").filter(|t| !t.is_empty())
    }

    /// Output path relative to the build root. Empty for the site root.
    pub fn path(&self) -> &str {
        self.text("path").unwrap_or_default()
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.insert("path", MetaValue::Text(path.into()));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Result of normalizing one item's front matter.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub meta: Meta,
    pub tags: Vec<String>,
    pub category: Option<String>,
}

/// Convert raw front matter into typed metadata.
pub fn normalize(raw: RawMeta) -> Result<Normalized, FormatError> {
    let mut meta = Meta::new();
    let mut tags = Vec::new();
    let mut category = None;

    for (key, mut values) in raw {
        let Some(value) = values.pop() else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        if SENTINEL_FIELDS.contains(&key.as_str()) && values.is_empty() && value == "false" {
            meta.insert(key, MetaValue::Flag(false));
            continue;
        }

        match key.as_str() {
            "date" => {
                let date = NaiveDate::parse_from_str(&value, DATE_FORMAT)
                    .map_err(|source| FormatError::InvalidDate {
                        value: value.clone(),
                        source,
                    })?;
                meta.insert(key, MetaValue::Date(date));
            }
            "tags" => {
                let list = split_tags(&value);
                tags.extend(list.iter().cloned());
                meta.insert(key, MetaValue::List(list));
            }
            "category" => {
                category = Some(value.clone());
                meta.insert(key, MetaValue::Text(value));
            }
            _ => meta.insert(key, MetaValue::Text(value)),
        }
    }

    Ok(Normalized {
        meta,
        tags,
        category,
    })
}

/// Split a comma-separated tag list. Whitespace around tags is trimmed.
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Every tag and category seen across the site, for templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    pub tags: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl Taxonomy {
    /// Fold one item's tags and category in.
    pub fn absorb(&mut self, normalized: &Normalized) {
        self.tags.extend(normalized.tags.iter().cloned());
        if let Some(category) = &normalized.category {
            self.categories.insert(category.clone());
        }
    }
}
