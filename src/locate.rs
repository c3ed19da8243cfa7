//! Resolve a stored selector back to an element, falling back to generic
//! per-field heuristics when the page markup has drifted.

use scraper::ElementRef;
use tracing::{debug, info};

use crate::field::FieldName;
use crate::page::Page;

/// Price hints, tried in order
pub const PRICE_FALLBACKS: &[&str] = &[
    r#"[data-testid*="price"]"#,
    r#"[class*="price"]"#,
    r#"[class*="Price"]"#,
    r#"span[class*="price"]"#,
    r#"div[class*="price"]"#,
    "[data-price]",
    ".price",
    ".Price",
    r#"[class*="cost"]"#,
    r#"[class*="Cost"]"#,
];

/// Image hints, tried in order; the last entries accept any image at all
pub const IMAGE_FALLBACKS: &[&str] = &[
    r#"img[src*="product"]"#,
    r#"img[src*="image"]"#,
    r#"img[data-src*="product"]"#,
    r#"img[data-src*="image"]"#,
    r#"[class*="product-image"]"#,
    r#"[class*="ProductImage"]"#,
    r#"[class*="main-image"]"#,
    r#"[class*="MainImage"]"#,
    "img:first-of-type",
    "img",
];

/// SKU hints. Kept specific so unrelated elements are not picked up.
pub const SKU_FALLBACKS: &[&str] = &[
    "[data-sku]",
    "[data-product-id]",
    "[data-item-id]",
    r#"[class*="sku"][class*="product"]"#,
    r#"[class*="SKU"][class*="product"]"#,
    r#"[class*="product-id"]"#,
    r#"[class*="ProductId"]"#,
    r#"[class*="sku-number"]"#,
    r#"[class*="SKU-number"]"#,
    r#"[class*="sku-id"]"#,
    r#"[class*="SKU-id"]"#,
];

/// Fallback table for a field. Fields without a generic heuristic fail closed.
pub fn fallbacks_for(field: FieldName) -> &'static [&'static str] {
    match field {
        FieldName::Price => PRICE_FALLBACKS,
        FieldName::Image => IMAGE_FALLBACKS,
        FieldName::Sku => SKU_FALLBACKS,
        FieldName::ProductName | FieldName::AttributeSection1 | FieldName::AttributeSection2 => &[],
    }
}

/// How an element was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    Exact,
    Fallback(&'static str),
}

/// Find the element for `field`: the exact selector first, then the field's
/// fallback patterns in order.
pub fn locate<'a>(page: &'a Page, selector: &str, field: FieldName) -> Option<ElementRef<'a>> {
    locate_with_source(page, selector, field).map(|(el, _)| el)
}

pub fn locate_with_source<'a>(
    page: &'a Page,
    selector: &str,
    field: FieldName,
) -> Option<(ElementRef<'a>, Located)> {
    if let Some(el) = page.select_first(selector) {
        return Some((el, Located::Exact));
    }

    debug!(field = %field, selector, "selector matched nothing");

    for pattern in fallbacks_for(field) {
        if let Some(el) = page.select_first(pattern) {
            info!(field = %field, fallback = *pattern, "found element with fallback selector");
            return Some((el, Located::Fallback(pattern)));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <html><body>
            <h1 class="title">Acme TV</h1>
            <div class="product-price-box"><span class="amount">$499</span></div>
            <img src="/static/logo.png">
            <img src="/media/product-123.jpg">
            <span data-sku="SKU-9">Model</span>
        </body></html>
    "#;

    fn page() -> Page {
        Page::parse("https://shop.example/p", HTML).unwrap()
    }

    #[test]
    fn test_exact_match_first() {
        let page = page();
        let (el, how) = locate_with_source(&page, "h1.title", FieldName::ProductName).unwrap();
        assert_eq!(el.value().name(), "h1");
        assert_eq!(how, Located::Exact);
    }

    #[test]
    fn test_price_fallback() {
        let page = page();
        let (el, how) = locate_with_source(&page, ".gone", FieldName::Price).unwrap();
        assert_eq!(el.value().attr("class"), Some("product-price-box"));
        assert_eq!(how, Located::Fallback(r#"[class*="price"]"#));
    }

    #[test]
    fn test_image_fallback_prefers_product_images() {
        let page = page();
        let el = locate(&page, "#hero", FieldName::Image).unwrap();
        assert_eq!(el.value().attr("src"), Some("/media/product-123.jpg"));
    }

    #[test]
    fn test_sku_fallback() {
        let page = page();
        let el = locate(&page, ".sku", FieldName::Sku).unwrap();
        assert_eq!(el.value().attr("data-sku"), Some("SKU-9"));
    }

    #[test]
    fn test_fields_without_fallbacks_fail_closed() {
        let page = page();
        assert!(locate(&page, "h2.name", FieldName::ProductName).is_none());
        assert!(locate(&page, ".specs", FieldName::AttributeSection1).is_none());
        assert!(locate(&page, ".specs", FieldName::AttributeSection2).is_none());
    }

    #[test]
    fn test_invalid_selector_still_uses_fallbacks() {
        let page = page();
        assert!(locate(&page, "span[[[", FieldName::Sku).is_some());
        assert!(locate(&page, "span[[[", FieldName::ProductName).is_none());
    }
}
