//! SKU auto-detection from the page URL, meta tags and data attributes.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use tracing::{debug, info};

use crate::page::Page;

/// A named SKU pattern; capture group 1 holds the identifier
pub struct SkuRule {
    pub name: &'static str,
    pub pattern: Regex,
}

fn rule(name: &'static str, pattern: &str) -> SkuRule {
    SkuRule {
        name,
        pattern: Regex::new(pattern).expect("Invalid SKU pattern"),
    }
}

/// Ordered SKU patterns shared by the URL and meta-tag sources
pub static SKU_RULES: Lazy<Vec<SkuRule>> = Lazy::new(|| {
    vec![
        // key=value forms (query strings, paths)
        rule("sku-id", r"(?i)sku[_-]?id[=:]\s*([a-zA-Z0-9\-_]+)"),
        rule("product-id", r"(?i)product[_-]?id[=:]\s*([a-zA-Z0-9\-_]+)"),
        rule("item-id", r"(?i)item[_-]?id[=:]\s*([a-zA-Z0-9\-_]+)"),
        // embedded JSON
        rule("json-sku", r#"(?i)"sku":\s*"([^"]+)""#),
        rule("json-product-id", r#"(?i)"productId":\s*"([^"]+)""#),
        rule("json-item-id", r#"(?i)"itemId":\s*"([^"]+)""#),
        // serialized data attributes
        rule("attr-sku", r#"(?i)data-sku[=:]\s*"([^"]+)""#),
        rule("attr-product-id", r#"(?i)data-product-id[=:]\s*"([^"]+)""#),
        rule("attr-item-id", r#"(?i)data-item-id[=:]\s*"([^"]+)""#),
    ]
});

/// Attributes read directly off elements, in priority order
pub const SKU_ATTRIBUTES: [&str; 3] = ["data-sku", "data-product-id", "data-item-id"];

static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("Invalid meta selector"));

static SKU_ATTR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[data-sku], [data-product-id], [data-item-id]")
        .expect("Invalid SKU attribute selector")
});

/// Where an auto-detected SKU came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkuSource {
    Url,
    MetaTag,
    DataAttribute,
}

/// First match of any rule against `text`
pub fn match_sku(text: &str) -> Option<(&'static str, String)> {
    SKU_RULES.iter().find_map(|rule| {
        rule.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|sku| !sku.is_empty())
            .map(|sku| (rule.name, sku))
    })
}

/// SKU from the page URL alone
pub fn sku_from_url(page: &Page) -> Option<String> {
    let (rule, sku) = match_sku(page.url().as_str())?;
    info!(rule, sku = %sku, "auto-detected SKU from URL");
    Some(sku)
}

fn sku_from_meta(page: &Page) -> Option<String> {
    page.document().select(&META_SELECTOR).find_map(|meta| {
        let el = meta.value();
        let content = el
            .attr("content")
            .filter(|c| !c.is_empty())
            .or_else(|| el.attr("value"))
            .unwrap_or("");
        let (rule, sku) = match_sku(content)?;
        info!(rule, sku = %sku, "auto-detected SKU from meta tag");
        Some(sku)
    })
}

fn sku_from_attributes(page: &Page) -> Option<String> {
    page.document().select(&SKU_ATTR_SELECTOR).find_map(|el| {
        let sku = SKU_ATTRIBUTES
            .iter()
            .find_map(|name| el.value().attr(name).filter(|v| !v.is_empty()))?;
        info!(sku, "auto-detected SKU from data attribute");
        Some(sku.to_string())
    })
}

/// Search URL, meta tags, then data attributes
pub fn auto_detect_sku(page: &Page) -> Option<(SkuSource, String)> {
    let found = sku_from_url(page)
        .map(|sku| (SkuSource::Url, sku))
        .or_else(|| sku_from_meta(page).map(|sku| (SkuSource::MetaTag, sku)))
        .or_else(|| sku_from_attributes(page).map(|sku| (SkuSource::DataAttribute, sku)));

    if found.is_none() {
        debug!("no SKU auto-detected");
    }
    found
}

/// Final SKU for a crawl. A URL-borne SKU always wins; otherwise a non-empty
/// selector-derived value is kept, and only then the full search is used.
pub fn resolve_sku(page: &Page, extracted: Option<String>) -> Option<String> {
    if let Some(sku) = sku_from_url(page) {
        return Some(sku);
    }
    if let Some(sku) = extracted.filter(|s| !s.is_empty()) {
        return Some(sku);
    }
    auto_detect_sku(page).map(|(_, sku)| sku)
}
