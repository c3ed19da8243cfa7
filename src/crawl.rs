//! Crawl a loaded page with a selector map and assemble the extraction record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::extract::{extract_field, FieldFailure};
use crate::field::{FieldName, SelectorMap};
use crate::page::Page;
use crate::sku::resolve_sku;
use crate::specs::{parse_spec_block, SpecMap};

/// Everything extracted from one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    pub source_url: String,
    pub timestamp: DateTime<Utc>,
    pub page_title: String,
    /// Every requested field, `null` when extraction failed. Attribute
    /// sections are moved out into `tech_specs`/`tech_specs_2`.
    pub fields: BTreeMap<FieldName, Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_specs: Option<SpecMap>,
    #[serde(rename = "techSpecs2", default, skip_serializing_if = "Option::is_none")]
    pub tech_specs_2: Option<SpecMap>,
}

impl ExtractionRecord {
    pub fn field(&self, field: FieldName) -> Option<&str> {
        self.fields.get(&field).and_then(|v| v.as_deref())
    }

    /// Requested fields that came back empty
    pub fn missing_fields(&self) -> Vec<FieldName> {
        self.fields
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(f, _)| *f)
            .collect()
    }
}

/// Extract every field named in `selectors`.
///
/// Fields fail independently: a selector that matches nothing leaves only its
/// own field `null`. The SKU is always reported, with URL-borne identifiers
/// taking precedence over the captured selector.
pub fn crawl_page(page: &Page, selectors: &SelectorMap) -> ExtractionRecord {
    crawl_page_at(page, selectors, Utc::now())
}

pub fn crawl_page_at(page: &Page, selectors: &SelectorMap, timestamp: DateTime<Utc>) -> ExtractionRecord {
    info!(url = %page.url(), fields = selectors.fields().count(), "crawling page");

    let mut fields = BTreeMap::new();
    for field in selectors.fields() {
        let value = match extract_field(page, selectors, field) {
            Ok(value) => Some(value),
            Err(FieldFailure::NotCaptured) => None,
            Err(failure) => {
                warn!(field = %field, "{}", failure);
                None
            }
        };
        fields.insert(field, value);
    }

    let sku = resolve_sku(page, fields.remove(&FieldName::Sku).flatten());
    fields.insert(FieldName::Sku, sku);

    let mut sections = BTreeMap::new();
    fields.retain(|field, value| {
        if field.is_attribute_section() {
            sections.insert(*field, value.take());
            return false;
        }
        true
    });
    let tech_specs = parse_section(&mut sections, FieldName::AttributeSection1);
    let tech_specs_2 = parse_section(&mut sections, FieldName::AttributeSection2);

    ExtractionRecord {
        source_url: page.url().to_string(),
        timestamp,
        page_title: page.title(),
        fields,
        tech_specs,
        tech_specs_2,
    }
}

/// Parse a requested attribute section; `None` when it was not requested
fn parse_section(
    sections: &mut BTreeMap<FieldName, Option<String>>,
    section: FieldName,
) -> Option<SpecMap> {
    let raw = sections.remove(&section)?;
    let specs = raw.as_deref().map(parse_spec_block).unwrap_or_default();
    info!(field = %section, specs = specs.len(), "parsed attribute section");
    Some(specs)
}
