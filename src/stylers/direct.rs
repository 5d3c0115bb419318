use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{StyleField, Styler};
use crate::colors::{compose, Attribute};
use crate::error::CompilationError;
use crate::pipeline::config::Severity;

/// Default terminal styles, by style-map key.
const DEFAULT_STYLES: &[(&str, &str)] = &[
    ("date", "yellow"),
    ("source", "blue"),
    ("req_id", "bold"),
    ("msg_op", "magenta"),
    ("msg_num", "bold"),
    ("msg_content", "bold"),
    ("msg_type", "yellow"),
    ("lvl_DEBUG", "cyan"),
    ("lvl_INFO", "green"),
    ("lvl_ERROR", "red"),
    ("lvl_WARNING", "magenta"),
    ("lvl_other", "white"),
];

/// A style entry in a YAML file: `"bold yellow"` or `[bold, yellow]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StyleEntry {
    Words(String),
    List(Vec<String>),
}

impl StyleEntry {
    fn names(&self) -> Vec<&str> {
        match self {
            StyleEntry::Words(words) => words.split_whitespace().collect(),
            StyleEntry::List(list) => list.iter().flat_map(|s| s.split_whitespace()).collect(),
        }
    }
}

fn parse_attributes(field: &str, names: &[&str]) -> Result<Vec<Attribute>, CompilationError> {
    names
        .iter()
        .map(|name| {
            name.parse::<Attribute>()
                .map_err(|e| CompilationError::StyleConfig(format!("{}: {}", field, e)))
        })
        .collect()
}

/// Terminal attributes to apply per field, in application order.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleMap {
    styles: IndexMap<StyleField, Vec<Attribute>>,
}

impl Default for StyleMap {
    fn default() -> Self {
        let mut styles = IndexMap::new();
        for (field, words) in DEFAULT_STYLES {
            let Ok(key) = field.parse::<StyleField>() else {
                continue;
            };
            let attrs: Vec<Attribute> = words
                .split_whitespace()
                .filter_map(|name| name.parse().ok())
                .collect();
            styles.insert(key, attrs);
        }
        StyleMap { styles }
    }
}

impl StyleMap {
    pub fn empty() -> Self {
        StyleMap {
            styles: IndexMap::new(),
        }
    }

    pub fn get(&self, field: StyleField) -> Option<&[Attribute]> {
        self.styles.get(&field).map(Vec::as_slice)
    }

    pub fn set(&mut self, field: StyleField, attributes: Vec<Attribute>) {
        self.styles.insert(field, attributes);
    }

    /// Defaults overlaid with the entries of a YAML mapping.
    pub fn from_yaml(yaml: &str) -> Result<Self, CompilationError> {
        let entries: IndexMap<String, StyleEntry> = serde_yaml::from_str(yaml)?;
        let mut map = StyleMap::default();

        for (name, entry) in &entries {
            let field: StyleField = name
                .parse()
                .map_err(CompilationError::StyleConfig)?;
            map.set(field, parse_attributes(name, &entry.names())?);
        }
        Ok(map)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, CompilationError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CompilationError::StyleConfig(format!("{}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }
}

/// ANSI terminal styler driven by a [`StyleMap`].
///
/// Unmapped fields are left as is, except severity styles, which fall back
/// to `lvl_other`.
#[derive(Debug, Clone, Default)]
pub struct DirectStyler {
    map: StyleMap,
}

impl DirectStyler {
    pub fn new(map: StyleMap) -> Self {
        DirectStyler { map }
    }

    fn attributes(&self, field: StyleField) -> &[Attribute] {
        match (self.map.get(field), field) {
            (Some(attrs), _) => attrs,
            (None, StyleField::Lvl(_)) => self.map.get(StyleField::LvlOther).unwrap_or(&[]),
            (None, _) => &[],
        }
    }
}

impl Styler for DirectStyler {
    fn style(&self, field: StyleField, text: &str) -> String {
        compose(self.attributes(field), text)
    }

    fn wrap(&self, text: &str, _severity: Severity) -> String {
        text.to_string()
    }
}
