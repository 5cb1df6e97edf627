//! Shared value types passed between the resolver, the scanner and the
//! attribute adapters.
//!
//! None of these outlive a single call. The host builds a [`RewriteConfig`]
//! from its settings store every time it asks for a rewrite.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Per-call rewrite settings.
///
/// When `enabled` is false or `production_base_url` is empty every operation
/// in this crate is the identity transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteConfig {
    pub enabled: bool,
    pub production_base_url: String,
}

impl RewriteConfig {
    pub fn new(enabled: bool, production_base_url: impl Into<String>) -> Self {
        Self {
            enabled,
            production_base_url: production_base_url.into(),
        }
    }

    /// A config that never rewrites anything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether any rewriting should happen at all.
    pub fn should_redirect(&self) -> bool {
        self.enabled && !self.production_base_url.is_empty()
    }

    /// Production base with any trailing `/` removed.
    pub fn production_base(&self) -> &str {
        self.production_base_url.trim_end_matches('/')
    }
}

/// One comma-separated candidate of a `srcset` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrcsetEntry {
    pub url: String,
    /// Width or density token (`800w`, `2x`), kept verbatim.
    pub descriptor: Option<String>,
}

impl fmt::Display for SrcsetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.descriptor {
            Some(d) => write!(f, "{} {}", self.url, d),
            None => f.write_str(&self.url),
        }
    }
}

/// Image-size descriptor handed out by the host for an attachment:
/// `(url, width, height, is_intermediate)`.
///
/// Serialized as a four element JSON array, matching the tuple shape the
/// host uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize(
    pub String,
    pub u32,
    pub u32,
    /// True when the URL points at a resized variant rather than the original.
    pub bool,
);

impl ImageSize {
    pub fn url(&self) -> &str {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.1
    }

    pub fn height(&self) -> u32 {
        self.2
    }
}

/// Attributes of an `<img>`-like element, in the order the host supplied them.
///
/// Only `src` and `srcset` mean anything to this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAttributes {
    entries: Vec<(String, String)>,
}

impl ImageAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Set `name`, replacing the value in place if it exists so the order
    /// is kept, appending otherwise.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(slot) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ImageAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = ImageAttributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

impl Serialize for ImageAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct AttributesVisitor;

impl<'de> Visitor<'de> for AttributesVisitor {
    type Value = ImageAttributes;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute names to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut attrs = ImageAttributes::new();
        while let Some((k, v)) = access.next_entry::<String, String>()? {
            attrs.insert(k, v);
        }
        Ok(attrs)
    }
}

impl<'de> Deserialize<'de> for ImageAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_redirect_requires_enabled_and_url() {
        assert!(RewriteConfig::new(true, "https://prod.com").should_redirect());
        assert!(!RewriteConfig::new(false, "https://prod.com").should_redirect());
        assert!(!RewriteConfig::new(true, "").should_redirect());
        assert!(!RewriteConfig::disabled().should_redirect());
    }

    #[test]
    fn production_base_strips_trailing_slash() {
        assert_eq!(
            RewriteConfig::new(true, "https://prod.com/").production_base(),
            "https://prod.com"
        );
        assert_eq!(
            RewriteConfig::new(true, "https://prod.com").production_base(),
            "https://prod.com"
        );
    }

    #[test]
    fn srcset_entry_display() {
        let with = SrcsetEntry {
            url: "a.jpg".into(),
            descriptor: Some("2x".into()),
        };
        let without = SrcsetEntry {
            url: "a.jpg".into(),
            descriptor: None,
        };
        assert_eq!(with.to_string(), "a.jpg 2x");
        assert_eq!(without.to_string(), "a.jpg");
    }

    #[test]
    fn image_size_is_a_json_array() {
        let size = ImageSize("/a.jpg".into(), 800, 600, true);
        let json = serde_json::to_string(&size).unwrap();
        assert_eq!(json, r#"["/a.jpg",800,600,true]"#);
        let back: ImageSize = serde_json::from_str(&json).unwrap();
        assert_eq!(back.url(), "/a.jpg");
        assert_eq!(back.width(), 800);
        assert_eq!(back.height(), 600);
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let attrs: ImageAttributes = [("alt", "x"), ("src", "/a.jpg"), ("class", "wide")]
            .into_iter()
            .collect();
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["alt", "src", "class"]);
    }

    #[test]
    fn attributes_insert_replaces_in_place() {
        let mut attrs: ImageAttributes = [("src", "/a.jpg"), ("alt", "x")].into_iter().collect();
        attrs.insert("src", "/b.jpg");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.iter().next(), Some(("src", "/b.jpg")));
    }

    #[test]
    fn attributes_json_keeps_order() {
        let json = r#"{"width":"800","src":"/a.jpg","alt":"Dawn"}"#;
        let attrs: ImageAttributes = serde_json::from_str(json).unwrap();
        assert_eq!(attrs.get("src"), Some("/a.jpg"));
        assert_eq!(serde_json::to_string(&attrs).unwrap(), json);
    }

    #[test]
    fn attributes_reject_non_string_values() {
        let result: Result<ImageAttributes, _> = serde_json::from_str(r#"{"width":800}"#);
        assert!(result.is_err());
    }
}
