//! # Compound selector parsing and matching.
//!
//! Supports the subset the pagination markup actually needs: a single
//! compound step made of a tag name (or `*`), `#id`, `.class`, `[attr]` and
//! `[attr=value]` in any combination:
//!
//! ```text
//! table            #feed            .next_page_list
//! tr.next_page_list[data-link]      *[data-link="/page/2"]
//! ```
//!
//! ## Rules
//! - Combinators (whitespace, `>`, `+`, `~`), selector lists (`,`) and
//!   pseudo-classes (`:`) are rejected with
//!   [`DomError::UnsupportedSelector`]; they are not silently ignored.
//! - Tag names match case-insensitively (stored lowercased).
//! - Attribute values may be quoted with `"` or `'`, or left bare.
//! - Only element nodes can match; text nodes and the root never do.

use std::str::FromStr;

use super::error::DomError;
use super::node::ElementData;

/// A parsed compound selector step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCheck>,
}

/// One `[attr]` / `[attr=value]` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCheck {
    Exists { name: String },
    Eq { name: String, value: String },
}

impl Selector {
    /// Parses a compound selector.
    ///
    /// # Example
    /// ```
    /// use scrollvisor::Selector;
    ///
    /// let sel = Selector::parse("tr.next_page_list[data-link]").unwrap();
    /// # let _ = sel;
    /// assert!(Selector::parse("ul li").is_err()); // combinators unsupported
    /// ```
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomError::EmptySelector);
        }
        if trimmed
            .bytes()
            .any(|b| b.is_ascii_whitespace() || matches!(b, b'>' | b'+' | b'~' | b',' | b':'))
        {
            return Err(DomError::UnsupportedSelector {
                selector: input.to_string(),
            });
        }

        let bytes = trimmed.as_bytes();
        let mut sel = Selector::default();
        let mut i = 0usize;

        while i < bytes.len() {
            match bytes[i] {
                b'*' => {
                    if sel.universal || sel.tag.is_some() {
                        return Err(malformed(input));
                    }
                    sel.universal = true;
                    i += 1;
                }
                b'#' => {
                    i += 1;
                    let (id, next) = parse_ident(trimmed, i).ok_or_else(|| malformed(input))?;
                    if sel.id.replace(id).is_some() {
                        return Err(malformed(input));
                    }
                    i = next;
                }
                b'.' => {
                    i += 1;
                    let (class, next) = parse_ident(trimmed, i).ok_or_else(|| malformed(input))?;
                    sel.classes.push(class);
                    i = next;
                }
                b'[' => {
                    let (check, next) = parse_attr_check(trimmed, i).ok_or_else(|| malformed(input))?;
                    sel.attrs.push(check);
                    i = next;
                }
                _ => {
                    // A bare ident is a tag name; it may only open the step.
                    if sel.tag.is_some() || sel.universal || sel.id.is_some() || !sel.classes.is_empty()
                    {
                        return Err(malformed(input));
                    }
                    let (tag, next) = parse_ident(trimmed, i).ok_or_else(|| malformed(input))?;
                    sel.tag = Some(tag.to_ascii_lowercase());
                    i = next;
                }
            }
        }

        Ok(sel)
    }

    /// Selector matching exactly one class, built without going through the
    /// string parser. Used for configured marker/slot class names.
    pub fn class(name: &str) -> Self {
        Selector {
            classes: vec![name.to_string()],
            ..Selector::default()
        }
    }

    /// True if the given element satisfies every condition of this step.
    pub(super) fn matches_element(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        for class in &self.classes {
            if !element.has_class(class) {
                return false;
            }
        }
        for check in &self.attrs {
            let ok = match check {
                AttrCheck::Exists { name } => element.attr(name).is_some(),
                AttrCheck::Eq { name, value } => element.attr(name) == Some(value.as_str()),
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

fn malformed(input: &str) -> DomError {
    DomError::MalformedSelector {
        selector: input.to_string(),
    }
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut i = start;
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    if i == start {
        return None;
    }
    Some((src[start..i].to_string(), i))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Parses `[name]` or `[name=value]` starting at the opening bracket.
fn parse_attr_check(src: &str, start: usize) -> Option<(AttrCheck, usize)> {
    let bytes = src.as_bytes();
    let mut i = start + 1;

    let (name, next) = parse_ident(src, i)?;
    i = next;

    match bytes.get(i)? {
        b']' => Some((AttrCheck::Exists { name }, i + 1)),
        b'=' => {
            i += 1;
            let (value, next) = parse_attr_value(src, i)?;
            i = next;
            if bytes.get(i) != Some(&b']') {
                return None;
            }
            Some((AttrCheck::Eq { name, value }, i + 1))
        }
        _ => None,
    }
}

fn parse_attr_value(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    match bytes.get(start) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let mut i = start + 1;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            if i >= bytes.len() {
                return None;
            }
            Some((src[start + 1..i].to_string(), i + 1))
        }
        Some(_) => {
            let mut i = start;
            while i < bytes.len() && bytes[i] != b']' {
                i += 1;
            }
            Some((src[start..i].to_string(), i))
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
        let mut el = ElementData::new(tag.to_string());
        for (name, value) in attrs {
            el.set_attr(name, value);
        }
        el
    }

    #[test]
    fn test_parse_tag_only() {
        let sel = Selector::parse("table").unwrap();
        assert!(sel.matches_element(&element("table", &[])));
        assert!(!sel.matches_element(&element("div", &[])));
    }

    #[test]
    fn test_parse_class_and_id() {
        let sel = Selector::parse("#feed").unwrap();
        assert!(sel.matches_element(&element("div", &[("id", "feed")])));
        assert!(!sel.matches_element(&element("div", &[("id", "other")])));

        let sel = Selector::parse(".next_page_list").unwrap();
        assert!(sel.matches_element(&element("tr", &[("class", "row next_page_list")])));
        assert!(!sel.matches_element(&element("tr", &[("class", "next_page_listing")])));
    }

    #[test]
    fn test_parse_attr_conditions() {
        let exists = Selector::parse("[data-link]").unwrap();
        assert!(exists.matches_element(&element("tr", &[("data-link", "/page/2")])));
        assert!(!exists.matches_element(&element("tr", &[])));

        let eq = Selector::parse("[data-link=\"/page/2\"]").unwrap();
        assert!(eq.matches_element(&element("tr", &[("data-link", "/page/2")])));
        assert!(!eq.matches_element(&element("tr", &[("data-link", "/page/3")])));

        let bare = Selector::parse("[data-link=/page/2]").unwrap();
        assert!(bare.matches_element(&element("tr", &[("data-link", "/page/2")])));
    }

    #[test]
    fn test_parse_compound() {
        let sel = Selector::parse("tr.next_page_list[data-link]").unwrap();
        assert!(sel.matches_element(&element(
            "tr",
            &[("class", "next_page_list"), ("data-link", "/p")]
        )));
        assert!(!sel.matches_element(&element("tr", &[("class", "next_page_list")])));
        assert!(!sel.matches_element(&element(
            "td",
            &[("class", "next_page_list"), ("data-link", "/p")]
        )));
    }

    #[test]
    fn test_universal_matches_any_element() {
        let sel = Selector::parse("*").unwrap();
        assert!(sel.matches_element(&element("tr", &[])));
        assert!(sel.matches_element(&element("span", &[])));
    }

    #[test]
    fn test_tag_matching_is_case_insensitive() {
        let sel = Selector::parse("TABLE").unwrap();
        assert!(sel.matches_element(&element("table", &[])));
    }

    #[test]
    fn test_rejects_combinators_and_lists() {
        assert!(matches!(
            Selector::parse("ul li"),
            Err(DomError::UnsupportedSelector { .. })
        ));
        assert!(matches!(
            Selector::parse("ul > li"),
            Err(DomError::UnsupportedSelector { .. })
        ));
        assert!(matches!(
            Selector::parse("a, b"),
            Err(DomError::UnsupportedSelector { .. })
        ));
        assert!(matches!(
            Selector::parse("li:first-child"),
            Err(DomError::UnsupportedSelector { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_and_malformed() {
        assert!(matches!(Selector::parse("   "), Err(DomError::EmptySelector)));
        assert!(matches!(
            Selector::parse("[data-link"),
            Err(DomError::MalformedSelector { .. })
        ));
        assert!(matches!(
            Selector::parse("."),
            Err(DomError::MalformedSelector { .. })
        ));
        assert!(matches!(
            Selector::parse("div#"),
            Err(DomError::MalformedSelector { .. })
        ));
        // Tag after other conditions is malformed, same as in CSS.
        assert!(matches!(
            Selector::parse(".a div"),
            Err(DomError::UnsupportedSelector { .. })
        ));
    }

    #[test]
    fn test_class_constructor_matches_parser() {
        assert_eq!(Selector::class("loading_tbody"), Selector::parse(".loading_tbody").unwrap());
    }
}
