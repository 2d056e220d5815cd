//! engine::options
//!
//! Normalized option values handed to command handlers.
//!
//! Flags arrive in kebab-case (`--upload-path`). They are stored under a
//! snake_case key (`upload_path`) in one flat map.

use std::collections::BTreeMap;

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A string-valued option.
    Text(String),
    /// A boolean flag.
    Flag(bool),
}

/// Convert a kebab-case flag name into its internal key.
pub fn normalize_key(flag: &str) -> String {
    flag.trim_start_matches('-').replace('-', "_").to_ascii_lowercase()
}

/// Flat, normalized option map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    values: BTreeMap<String, OptionValue>,
}

impl OptionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under the normalized form of `flag`.
    pub fn insert(&mut self, flag: &str, value: OptionValue) {
        self.values.insert(normalize_key(flag), value);
    }

    /// Builder-style text insert.
    pub fn with_text(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.insert(flag, OptionValue::Text(value.into()));
        self
    }

    /// Builder-style flag insert.
    pub fn with_flag(mut self, flag: &str, value: bool) -> Self {
        self.insert(flag, OptionValue::Flag(value));
        self
    }

    /// Raw lookup. `key` may be given in either form.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(&normalize_key(key))
    }

    /// Text value, treating empty strings as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(OptionValue::Text(v)) if !v.trim().is_empty() => Some(v.as_str()),
            _ => None,
        }
    }

    /// Flag value, if the flag was given at all.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(OptionValue::Flag(v)) => Some(*v),
            Some(OptionValue::Text(v)) => parse_bool(v),
            None => None,
        }
    }

    /// Flag value, defaulting to `false`.
    pub fn is_set(&self, key: &str) -> bool {
        self.flag(key).unwrap_or(false)
    }

    /// Check whether a usable value is present.
    pub fn has_value(&self, key: &str) -> bool {
        match self.get(key) {
            Some(OptionValue::Text(v)) => !v.trim().is_empty(),
            Some(OptionValue::Flag(v)) => *v,
            None => false,
        }
    }

    /// Iterate over normalized keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of options present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether no options are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_flags_become_snake_keys() {
        assert_eq!(normalize_key("upload-path"), "upload_path");
        assert_eq!(normalize_key("--hermes-disabled"), "hermes_disabled");
        assert_eq!(normalize_key("Ci-Token"), "ci_token");
    }

    #[test]
    fn lookup_accepts_either_form() {
        let map = OptionMap::new().with_text("upload-path", "/v1");
        assert_eq!(map.text("upload-path"), Some("/v1"));
        assert_eq!(map.text("upload_path"), Some("/v1"));
    }

    #[test]
    fn empty_text_is_absent() {
        let map = OptionMap::new().with_text("release-note", "  ");
        assert_eq!(map.text("release-note"), None);
        assert!(!map.has_value("release-note"));
    }

    #[test]
    fn flags_default_to_false() {
        let map = OptionMap::new().with_flag("sourcemap", true);
        assert!(map.is_set("sourcemap"));
        assert!(!map.is_set("keep-artifacts"));
        assert_eq!(map.flag("keep-artifacts"), None);
    }

    #[test]
    fn textual_booleans_are_parsed() {
        let map = OptionMap::new()
            .with_text("is-paused", "false")
            .with_text("is-mandatory", "TRUE")
            .with_text("is-rolled-back", "maybe");
        assert_eq!(map.flag("is-paused"), Some(false));
        assert_eq!(map.flag("is-mandatory"), Some(true));
        assert_eq!(map.flag("is-rolled-back"), None);
    }
}
