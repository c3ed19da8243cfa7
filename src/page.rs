//! Parsed page handle shared by capture and extraction.
//!
//! The core never fetches anything: a collaborator hands over the page URL and
//! its HTML, and every algorithm works against this snapshot.

use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::warn;
use url::Url;

use crate::error::{PluckError, Result};

/// Subtrees whose text never renders
const NON_RENDERED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Invalid title selector"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex pattern"));

/// A loaded page: its address plus the parsed document tree
pub struct Page {
    url: Url,
    html: Html,
}

impl Page {
    /// Parse `html` as the document served at `url`
    pub fn parse(url: &str, html: &str) -> Result<Self> {
        Ok(Self::from_parts(Url::parse(url)?, html))
    }

    pub fn from_parts(url: Url, html: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.html
    }

    /// `scheme://host[:port]`, or `null` for opaque origins
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Document title with whitespace collapsed, empty when there is none
    pub fn title(&self) -> String {
        self.html
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| collapse_whitespace(&raw_text(el)))
            .unwrap_or_default()
    }

    /// Parse a selector string, reporting syntax errors
    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| PluckError::InvalidSelector(format!("'{}' ({:?})", selector, e)))
    }

    /// First element in document order matching `selector`.
    /// An unparsable selector matches nothing.
    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let parsed = self.parse_lenient(selector)?;
        self.html.select(&parsed).next()
    }

    pub fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match self.parse_lenient(selector) {
            Some(parsed) => self.html.select(&parsed).collect(),
            None => Vec::new(),
        }
    }

    /// Number of elements matching `selector`
    pub fn count(&self, selector: &str) -> usize {
        match self.parse_lenient(selector) {
            Some(parsed) => self.html.select(&parsed).count(),
            None => 0,
        }
    }

    /// Look an element up again by its node id
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Resolve a possibly relative reference against the page URL
    pub fn resolve(&self, reference: &str) -> Option<String> {
        self.url.join(reference).ok().map(String::from)
    }

    fn parse_lenient(&self, selector: &str) -> Option<Selector> {
        match Self::parse_selector(selector) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

/// Text the user would see: descendant text minus script/style-like subtrees
pub fn rendered_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_rendered(*el, &mut out);
    out
}

fn collect_rendered(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if NON_RENDERED_TAGS.contains(&e.name()) => {}
            Node::Element(_) => collect_rendered(child, out),
            _ => {}
        }
    }
}

/// Every descendant text node, concatenated
pub fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Collapse whitespace runs into single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <html><head><title>
            Acme   TV
        </title></head>
        <body>
            <div class="price">$499<script>var x = 1;</script><style>.a{}</style></div>
            <div class="price">$599</div>
        </body></html>
    "#;

    #[test]
    fn test_title_and_origin() {
        let page = Page::parse("https://shop.example:8443/p/1?x=2", HTML).unwrap();
        assert_eq!(page.title(), "Acme TV");
        assert_eq!(page.origin(), "https://shop.example:8443");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let page = Page::parse("https://shop.example/", "<p>hi</p>").unwrap();
        assert_eq!(page.title(), "");
    }

    #[test]
    fn test_select_helpers() {
        let page = Page::parse("https://shop.example/", HTML).unwrap();
        assert_eq!(page.count("div.price"), 2);
        assert_eq!(page.select_all("div.price").len(), 2);
        assert!(page.select_first("div.missing").is_none());
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let page = Page::parse("https://shop.example/", HTML).unwrap();
        assert_eq!(page.count("div[[["), 0);
        assert!(page.select_first("div[[[").is_none());
        assert!(Page::parse_selector("div[[[").is_err());
    }

    #[test]
    fn test_rendered_text_skips_scripts() {
        let page = Page::parse("https://shop.example/", HTML).unwrap();
        let el = page.select_first("div.price").unwrap();
        assert_eq!(rendered_text(el), "$499");
        assert!(raw_text(el).contains("var x = 1;"));
    }

    #[test]
    fn test_element_lookup_by_id() {
        let page = Page::parse("https://shop.example/", HTML).unwrap();
        let el = page.select_first("div.price").unwrap();
        let again = page.element(el.id()).unwrap();
        assert_eq!(again.id(), el.id());
    }

    #[test]
    fn test_resolve_relative() {
        let page = Page::parse("https://shop.example/p/1", HTML).unwrap();
        assert_eq!(
            page.resolve("img/a.png").as_deref(),
            Some("https://shop.example/p/img/a.png")
        );
    }
}
