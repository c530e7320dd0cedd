//! Placeholder registry.
//!
//! Placeholders are keyed by `(name, definition)`. Writing a value that is
//! not a string invokes the placeholder `(kind, kind)` of its value kind, so
//! the defaults below decide how ints, lists and objects are printed and a
//! template can override them with `@define_placeholder(int) ...`.

use crate::block::BlockId;
use indexmap::IndexMap;
use std::fmt;

/// Name of the argument binding when a placeholder declares no parameter.
pub const PARAMETER_NAME: &str = "__param__";

/// Built-in placeholder bodies, registered when a session starts.
pub(crate) const DEFAULT_PLACEHOLDERS: &[(&str, &str)] = &[
    ("int", "@var(__param__.toString())"),
    ("long", "@var(__param__.toString())"),
    ("double", "@var(__param__.toString())"),
    ("char", "@var(__param__.toString())"),
    ("boolean", "@var(__param__.toString())"),
    ("list", "@var(__param__.joinToString())"),
    ("mutable_list", "@var(__param__.joinToString())"),
    ("object", "@var(__param__.toString())"),
    ("function", "@var(__param__.toString())"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderKey {
    pub name: String,
    pub definition: String,
}

impl PlaceholderKey {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }

    /// The default definition of `name`.
    pub fn default_for(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            definition: name.clone(),
            name,
        }
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.definition {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.name, self.definition)
        }
    }
}

/// A registered body and its optional parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderEntry {
    pub(crate) body: BlockId,
    pub(crate) parameter: Option<String>,
}

impl PlaceholderEntry {
    pub(crate) fn new(body: BlockId, parameter: Option<String>) -> Self {
        Self { body, parameter }
    }

    pub fn body(&self) -> BlockId {
        self.body
    }

    /// The name the argument is bound to on invocation.
    pub fn parameter(&self) -> &str {
        self.parameter.as_deref().unwrap_or(PARAMETER_NAME)
    }
}

#[derive(Debug, Default)]
pub struct PlaceholderRegistry {
    entries: IndexMap<PlaceholderKey, PlaceholderEntry>,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry`, replacing any previous entry under `key`.
    pub(crate) fn register(&mut self, key: PlaceholderKey, entry: PlaceholderEntry) {
        self.entries.insert(key, entry);
    }

    pub fn get(&self, key: &PlaceholderKey) -> Option<&PlaceholderEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, name: &str, definition: &str) -> bool {
        self.entries
            .contains_key(&PlaceholderKey::new(name, definition))
    }

    pub fn keys(&self) -> impl Iterator<Item = &PlaceholderKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_overwrites() {
        let mut registry = PlaceholderRegistry::new();
        let key = PlaceholderKey::default_for("row");
        registry.register(key.clone(), PlaceholderEntry::new(BlockId(1), None));
        registry.register(
            key.clone(),
            PlaceholderEntry::new(BlockId(2), Some("item".to_string())),
        );
        assert_eq!(registry.len(), 1);
        let entry = registry.get(&key).unwrap();
        assert_eq!(entry.body(), BlockId(2));
        assert_eq!(entry.parameter(), "item");
    }

    #[test]
    fn test_keys_are_name_and_definition() {
        let mut registry = PlaceholderRegistry::new();
        registry.register(
            PlaceholderKey::new("row", "compact"),
            PlaceholderEntry::new(BlockId(0), None),
        );
        assert!(registry.contains("row", "compact"));
        assert!(!registry.contains("row", "row"));
        assert_eq!(PlaceholderKey::new("row", "compact").to_string(), "row/compact");
        assert_eq!(
            registry.get(&PlaceholderKey::new("row", "compact")).unwrap().parameter(),
            PARAMETER_NAME
        );
    }

    #[test]
    fn test_defaults_cover_every_non_string_kind() {
        assert_eq!(DEFAULT_PLACEHOLDERS.len(), 9);
        assert!(DEFAULT_PLACEHOLDERS.iter().all(|(kind, _)| *kind != "string"));
    }
}
