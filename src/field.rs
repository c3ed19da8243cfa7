use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{PluckError, Result};

/// Prefix of the persisted storage keys (`selector_price`, `selector_sku`, ...)
pub const STORAGE_KEY_PREFIX: &str = "selector_";

/// A semantic slot of product data the operator can capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Sku,
    Price,
    Image,
    ProductName,
    AttributeSection1,
    AttributeSection2,
}

impl FieldName {
    pub const ALL: [FieldName; 6] = [
        FieldName::Sku,
        FieldName::Price,
        FieldName::Image,
        FieldName::ProductName,
        FieldName::AttributeSection1,
        FieldName::AttributeSection2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Sku => "sku",
            FieldName::Price => "price",
            FieldName::Image => "image",
            FieldName::ProductName => "productName",
            FieldName::AttributeSection1 => "attributeSection1",
            FieldName::AttributeSection2 => "attributeSection2",
        }
    }

    /// Attribute sections hold free-text spec blobs that get parsed into maps
    pub fn is_attribute_section(&self) -> bool {
        matches!(self, FieldName::AttributeSection1 | FieldName::AttributeSection2)
    }

    /// Key used by the selector storage format
    pub fn storage_key(&self) -> String {
        format!("{}{}", STORAGE_KEY_PREFIX, self.as_str())
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = PluckError;

    fn from_str(s: &str) -> Result<Self> {
        FieldName::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| PluckError::UnknownField(s.to_string()))
    }
}

/// Field → selector mapping supplied per extraction call.
///
/// An entry with a blank selector still counts as requested: the crawl reports
/// it with a `null` value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorMap(BTreeMap<FieldName, String>);

impl SelectorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FieldName, selector: impl Into<String>) {
        self.0.insert(field, selector.into());
    }

    /// The captured selector for a field, `None` when absent or blank
    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.0
            .get(&field)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Fields present in the map, blank or not
    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.0.iter().map(|(f, s)| (*f, s.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with a non-blank selector
    pub fn captured_count(&self) -> usize {
        self.0.values().filter(|s| !s.trim().is_empty()).count()
    }

    /// Convert to the persisted `selector_<field>` format, dropping blank entries
    pub fn to_storage(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter(|(_, s)| !s.trim().is_empty())
            .map(|(f, s)| (f.storage_key(), s.clone()))
            .collect()
    }

    /// Read the persisted format. Keys without the prefix or naming an unknown
    /// field are ignored.
    pub fn from_storage<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = Self::new();
        for (key, selector) in entries {
            let Some(name) = key.strip_prefix(STORAGE_KEY_PREFIX) else {
                continue;
            };
            if let Ok(field) = name.parse::<FieldName>() {
                map.insert(field, selector);
            }
        }
        map
    }

    /// Parse a selector file in either the plain or the storage format
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        if !raw.is_empty() && raw.keys().all(|k| k.starts_with(STORAGE_KEY_PREFIX)) {
            return Ok(Self::from_storage(
                raw.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            ));
        }

        let mut map = Self::new();
        for (key, selector) in raw {
            map.insert(key.parse::<FieldName>()?, selector);
        }
        Ok(map)
    }
}

impl FromIterator<(FieldName, String)> for SelectorMap {
    fn from_iter<T: IntoIterator<Item = (FieldName, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_round_trips_through_str() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
        assert!("color".parse::<FieldName>().is_err());
    }

    #[test]
    fn test_field_name_serde_is_camel_case() {
        let json = serde_json::to_string(&FieldName::ProductName).unwrap();
        assert_eq!(json, "\"productName\"");
    }

    #[test]
    fn test_attribute_sections() {
        let sections: Vec<FieldName> = FieldName::ALL
            .into_iter()
            .filter(|f| f.is_attribute_section())
            .collect();
        assert_eq!(sections, vec![FieldName::AttributeSection1, FieldName::AttributeSection2]);
    }

    #[test]
    fn test_blank_selector_is_not_captured() {
        let mut map = SelectorMap::new();
        map.insert(FieldName::Price, "  ");
        map.insert(FieldName::Sku, ".sku");

        assert_eq!(map.get(FieldName::Price), None);
        assert_eq!(map.get(FieldName::Sku), Some(".sku"));
        assert_eq!(map.fields().count(), 2);
        assert_eq!(map.captured_count(), 1);
    }

    #[test]
    fn test_storage_format() {
        let mut map = SelectorMap::new();
        map.insert(FieldName::ProductName, "h1.title");
        map.insert(FieldName::Image, "");

        let stored = map.to_storage();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.get("selector_productName").map(String::as_str), Some("h1.title"));

        let restored = SelectorMap::from_storage(
            [("selector_productName", "h1.title"), ("crawler_urls", "[]"), ("selector_bogus", "x")],
        );
        assert_eq!(restored.get(FieldName::ProductName), Some("h1.title"));
        assert_eq!(restored.fields().count(), 1);
    }

    #[test]
    fn test_from_json_accepts_both_formats() {
        let plain = SelectorMap::from_json(r#"{"price": ".price", "sku": ""}"#).unwrap();
        assert_eq!(plain.get(FieldName::Price), Some(".price"));
        assert_eq!(plain.fields().count(), 2);

        let stored = SelectorMap::from_json(r#"{"selector_price": ".price"}"#).unwrap();
        assert_eq!(stored.get(FieldName::Price), Some(".price"));

        assert!(SelectorMap::from_json(r#"{"colour": ".c"}"#).is_err());
    }
}
