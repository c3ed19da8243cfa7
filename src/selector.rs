//! Selector synthesis for an element the operator clicked.
//!
//! Candidates are tried from cheapest and most stable (ids, semantic classes,
//! data attributes) to a positional path that always produces something.
//! Every candidate except the id and the positional path must match exactly
//! one element in the current document.

use scraper::ElementRef;
use tracing::debug;

use crate::page::Page;

/// How many ancestor levels the positional path spans, the element included
const PATH_DEPTH: usize = 3;

/// Attribute namespace tried for `tag[data-x="v"]` candidates
const DATA_ATTR_PREFIX: &str = "data-";

/// A deny-list rule for class tokens that carry no identity.
///
/// Utility stems match whole tokens or `stem-*` only, never a bare prefix:
/// `price`, `header` and `wrapper` stay usable even though they start with
/// the `p`, `h` and `w` stems. This is narrower than a plain prefix filter on
/// purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRule {
    /// Framework-internal or generated prefix (`js-`, `react-`, ...)
    Prefix(&'static str),
    /// Utility stem: matches `stem` itself and `stem-*` (`flex`, `text-lg`, `w-full`)
    Utility(&'static str),
    /// Variant-qualified utilities such as `hover:underline` or `md:flex`
    Variant,
}

impl ClassRule {
    pub fn matches(&self, token: &str) -> bool {
        match self {
            ClassRule::Prefix(prefix) => token.starts_with(prefix),
            ClassRule::Utility(stem) => {
                let token = token.strip_prefix('-').unwrap_or(token);
                token == *stem
                    || token
                        .strip_prefix(stem)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            ClassRule::Variant => token.contains(':'),
        }
    }
}

/// Ordered deny-list applied to class tokens
pub const CLASS_DENY_RULES: &[ClassRule] = &[
    ClassRule::Prefix("js-"),
    ClassRule::Prefix("react-"),
    ClassRule::Prefix("ng-"),
    ClassRule::Prefix("t3V0AOwowrTfUzPn"),
    ClassRule::Variant,
    // spacing
    ClassRule::Utility("p"),
    ClassRule::Utility("px"),
    ClassRule::Utility("py"),
    ClassRule::Utility("pt"),
    ClassRule::Utility("pb"),
    ClassRule::Utility("pl"),
    ClassRule::Utility("pr"),
    ClassRule::Utility("m"),
    ClassRule::Utility("mx"),
    ClassRule::Utility("my"),
    ClassRule::Utility("mt"),
    ClassRule::Utility("mb"),
    ClassRule::Utility("ml"),
    ClassRule::Utility("mr"),
    ClassRule::Utility("gap"),
    ClassRule::Utility("space"),
    // layout
    ClassRule::Utility("flex"),
    ClassRule::Utility("grid"),
    ClassRule::Utility("block"),
    ClassRule::Utility("inline"),
    ClassRule::Utility("inline-block"),
    ClassRule::Utility("items"),
    ClassRule::Utility("justify"),
    ClassRule::Utility("absolute"),
    ClassRule::Utility("relative"),
    ClassRule::Utility("fixed"),
    ClassRule::Utility("sticky"),
    ClassRule::Utility("z"),
    ClassRule::Utility("w"),
    ClassRule::Utility("h"),
    ClassRule::Utility("max"),
    ClassRule::Utility("min"),
    ClassRule::Utility("overflow"),
    ClassRule::Utility("hidden"),
    ClassRule::Utility("visible"),
    ClassRule::Utility("scroll"),
    ClassRule::Utility("auto"),
    // decoration and motion
    ClassRule::Utility("bg"),
    ClassRule::Utility("border"),
    ClassRule::Utility("rounded"),
    ClassRule::Utility("shadow"),
    ClassRule::Utility("opacity"),
    ClassRule::Utility("hover"),
    ClassRule::Utility("focus"),
    ClassRule::Utility("transition"),
    ClassRule::Utility("duration"),
    ClassRule::Utility("ease"),
    ClassRule::Utility("transform"),
    ClassRule::Utility("scale"),
    ClassRule::Utility("rotate"),
    ClassRule::Utility("translate"),
    // typography
    ClassRule::Utility("text"),
    ClassRule::Utility("font"),
    ClassRule::Utility("leading"),
    ClassRule::Utility("tracking"),
    ClassRule::Utility("truncate"),
    ClassRule::Utility("whitespace"),
    ClassRule::Utility("break"),
    ClassRule::Utility("hyphens"),
    ClassRule::Utility("italic"),
    ClassRule::Utility("not"),
    ClassRule::Utility("underline"),
    ClassRule::Utility("line-through"),
    ClassRule::Utility("uppercase"),
    ClassRule::Utility("lowercase"),
    ClassRule::Utility("capitalize"),
    ClassRule::Utility("normal"),
    ClassRule::Utility("bold"),
    ClassRule::Utility("semibold"),
    ClassRule::Utility("medium"),
    ClassRule::Utility("light"),
    ClassRule::Utility("thin"),
    ClassRule::Utility("extralight"),
    // palette
    ClassRule::Utility("black"),
    ClassRule::Utility("white"),
    ClassRule::Utility("gray"),
    ClassRule::Utility("slate"),
    ClassRule::Utility("zinc"),
    ClassRule::Utility("neutral"),
    ClassRule::Utility("stone"),
    ClassRule::Utility("red"),
    ClassRule::Utility("orange"),
    ClassRule::Utility("amber"),
    ClassRule::Utility("yellow"),
    ClassRule::Utility("lime"),
    ClassRule::Utility("green"),
    ClassRule::Utility("emerald"),
    ClassRule::Utility("teal"),
    ClassRule::Utility("cyan"),
    ClassRule::Utility("sky"),
    ClassRule::Utility("blue"),
    ClassRule::Utility("indigo"),
    ClassRule::Utility("violet"),
    ClassRule::Utility("purple"),
    ClassRule::Utility("fuchsia"),
    ClassRule::Utility("pink"),
    ClassRule::Utility("rose"),
];

/// Whether a class token is a utility/framework class to skip
pub fn is_utility_class(token: &str) -> bool {
    CLASS_DENY_RULES.iter().any(|rule| rule.matches(token))
}

/// Which rule produced a synthesized selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorTier {
    Id,
    Class,
    DataAttribute,
    ClassSet,
    Role,
    /// Positional path, not verified for uniqueness
    Path,
}

impl SelectorTier {
    /// Whether the selector was checked to match exactly one element
    pub fn is_verified(&self) -> bool {
        !matches!(self, SelectorTier::Id | SelectorTier::Path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    pub selector: String,
    pub tier: SelectorTier,
}

/// Build a selector for `el`
pub fn synthesize(page: &Page, el: ElementRef<'_>) -> String {
    synthesize_with_tier(page, el).selector
}

/// Build a selector for `el`, reporting which rule produced it
pub fn synthesize_with_tier(page: &Page, el: ElementRef<'_>) -> Synthesized {
    let element = el.value();
    let tag = element.name();

    let found = |selector: String, tier: SelectorTier| {
        debug!(selector = %selector, ?tier, "synthesized selector");
        Synthesized { selector, tier }
    };

    if let Some(id) = element.id().filter(|id| !id.is_empty()) {
        return found(format!("#{}", escape_ident(id)), SelectorTier::Id);
    }

    let classes = stable_classes(el);

    for class in &classes {
        let candidate = format!("{}.{}", tag, escape_ident(class));
        if page.count(&candidate) == 1 {
            return found(candidate, SelectorTier::Class);
        }
    }

    for (name, value) in element.attrs() {
        if !name.starts_with(DATA_ATTR_PREFIX) {
            continue;
        }
        let candidate = format!("{}[{}=\"{}\"]", tag, escape_ident(name), escape_string(value));
        if page.count(&candidate) == 1 {
            return found(candidate, SelectorTier::DataAttribute);
        }
    }

    if !classes.is_empty() {
        let candidate = format!("{}{}", tag, class_suffix(&classes));
        if page.count(&candidate) == 1 {
            return found(candidate, SelectorTier::ClassSet);
        }
    }

    if let Some(role) = element.attr("role") {
        let candidate = format!("{}[role=\"{}\"]", tag, escape_string(role));
        if page.count(&candidate) == 1 {
            return found(candidate, SelectorTier::Role);
        }
    }

    found(positional_path(el), SelectorTier::Path)
}

/// Class tokens in DOM order with utility/framework classes removed
pub fn stable_classes<'a>(el: ElementRef<'a>) -> Vec<&'a str> {
    el.value()
        .attr("class")
        .map(|classes| {
            classes
                .split_whitespace()
                .filter(|c| !is_utility_class(c))
                .collect()
        })
        .unwrap_or_default()
}

fn class_suffix(classes: &[&str]) -> String {
    classes
        .iter()
        .map(|c| format!(".{}", escape_ident(c)))
        .collect()
}

/// `tag.classes:nth-of-type(n)` segments from up to three levels of
/// ancestry, outermost first, joined with the descendant combinator
fn positional_path(el: ElementRef<'_>) -> String {
    let mut segments = Vec::with_capacity(PATH_DEPTH);
    let mut current = Some(el);

    while let Some(node) = current {
        if segments.len() == PATH_DEPTH {
            break;
        }
        let tag = node.value().name();
        let position = 1 + node
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|sibling| sibling.value().name() == tag)
            .count();

        segments.push(format!(
            "{}{}:nth-of-type({})",
            tag,
            class_suffix(&stable_classes(node)),
            position
        ));
        current = node.parent().and_then(ElementRef::wrap);
    }

    segments.reverse();
    segments.join(" ")
}

/// Serialize a CSS identifier (CSSOM "serialize an identifier")
pub fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let chars: Vec<char> = ident.chars().collect();

    if chars == ['-'] {
        return "\\-".to_string();
    }

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{:x} ", c as u32)),
            '0'..='9' if i == 0 || (i == 1 && chars[0] == '-') => {
                out.push_str(&format!("\\{:x} ", c as u32))
            }
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

/// Escape a value for use inside a double-quoted CSS string
fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            c => out.push(c),
        }
    }
    out
}
