//! HTML fragment parsing and serialization.
//!
//! A small stack-based parser tuned for server-rendered list markup: start/end
//! tags, quoted/unquoted/bare attributes, the HTML void set, comments, doctype
//! skipping, and a compact character-reference set. Stray end tags unwind the
//! open stack leniently, the way browsers recover. Script elements get no
//! raw-text handling; page fragments are list markup, not programs.

use super::document::Document;
use super::error::DomError;
use super::node::{ElementData, NodeKind};

/// Parses markup into a fresh document whose root children are the fragment's
/// top-level nodes.
pub(super) fn parse(html: &str) -> Result<Document, DomError> {
    let mut doc = Document::new();
    let mut stack = vec![doc.root()];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            match find_subslice(bytes, i + 4, b"-->") {
                Some(end) => i = end + 3,
                None => return Err(parse_error("unclosed comment")),
            }
            continue;
        }

        if starts_with_at(bytes, i, b"<!") {
            // Doctype or bogus markup declaration: skip to the closing '>'.
            while i < bytes.len() && bytes[i] != b'>' {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(parse_error("unclosed markup declaration"));
            }
            i += 1;
            continue;
        }

        if bytes[i] == b'<' {
            if starts_with_at(bytes, i, b"</") {
                let (tag, next) = parse_end_tag(html, i)?;
                i = next;

                // Lenient unwind: pop until the matching open tag, or give up at
                // the bottom without erroring (browsers drop stray end tags).
                while stack.len() > 1 {
                    let top = stack[stack.len() - 1];
                    let matched = doc.tag_name(top).map(|t| t == tag).unwrap_or(false);
                    stack.pop();
                    if matched {
                        break;
                    }
                }
                continue;
            }

            let (tag, attrs, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            let parent = stack[stack.len() - 1];
            let mut data = ElementData::new(tag.clone());
            for (name, value) in attrs {
                data.set_attr(&name, &value);
            }
            let node = doc.create_node(Some(parent), NodeKind::Element(data));

            if !self_closing && !is_void_tag(&tag) {
                stack.push(node);
            }
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }
        let text = html
            .get(start..i)
            .ok_or_else(|| parse_error("invalid text segment"))?;
        if !text.is_empty() {
            let parent = stack[stack.len() - 1];
            doc.create_node(Some(parent), NodeKind::Text(decode_entities(text)));
        }
    }

    Ok(doc)
}

fn parse_start_tag(html: &str, at: usize) -> Result<(String, Vec<(String, String)>, bool, usize), DomError> {
    let bytes = html.as_bytes();
    let mut i = at + 1;

    skip_ws(bytes, &mut i);
    let tag_start = i;
    while i < bytes.len() && is_tag_byte(bytes[i]) {
        i += 1;
    }
    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| parse_error("invalid tag name"))?
        .to_ascii_lowercase();
    if tag.is_empty() {
        return Err(parse_error("empty tag name"));
    }

    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(parse_error("unclosed start tag"));
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>') {
            self_closing = true;
            i += 2;
            break;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_byte(bytes[i]) {
            i += 1;
        }
        let name = html
            .get(name_start..i)
            .ok_or_else(|| parse_error("invalid attribute name"))?
            .to_ascii_lowercase();
        if name.is_empty() {
            return Err(parse_error("invalid attribute name"));
        }

        skip_ws(bytes, &mut i);
        let value = if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, bytes, &mut i)?
        } else {
            // Bare attribute, e.g. <input disabled>.
            String::new()
        };

        attrs.push((name, value));
    }

    Ok((tag, attrs, self_closing, i))
}

fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize), DomError> {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    skip_ws(bytes, &mut i);

    let tag_start = i;
    while i < bytes.len() && is_tag_byte(bytes[i]) {
        i += 1;
    }
    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| parse_error("invalid end tag"))?
        .to_ascii_lowercase();

    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(parse_error("unclosed end tag"));
    }
    Ok((tag, i + 1))
}

fn parse_attr_value(html: &str, bytes: &[u8], i: &mut usize) -> Result<String, DomError> {
    if *i >= bytes.len() {
        return Err(parse_error("missing attribute value"));
    }

    if bytes[*i] == b'"' || bytes[*i] == b'\'' {
        let quote = bytes[*i];
        *i += 1;
        let start = *i;
        while *i < bytes.len() && bytes[*i] != quote {
            *i += 1;
        }
        if *i >= bytes.len() {
            return Err(parse_error("unclosed quoted attribute value"));
        }
        let value = html
            .get(start..*i)
            .ok_or_else(|| parse_error("invalid attribute value"))?;
        *i += 1;
        return Ok(decode_entities(value));
    }

    let start = *i;
    while *i < bytes.len()
        && !bytes[*i].is_ascii_whitespace()
        && bytes[*i] != b'>'
        && !(bytes[*i] == b'/' && bytes.get(*i + 1) == Some(&b'>'))
    {
        *i += 1;
    }
    let value = html
        .get(start..*i)
        .ok_or_else(|| parse_error("invalid attribute value"))?;
    Ok(decode_entities(value))
}

// ---- Serialization ----

pub(super) fn serialize(doc: &Document, node: super::NodeId, out: &mut String) {
    match &doc.node(node).kind {
        NodeKind::Root => {
            for child in &doc.node(node).children {
                serialize(doc, *child, out);
            }
        }
        NodeKind::Text(text) => escape_text(text, out),
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');

            let children = &doc.node(node).children;
            if is_void_tag(&element.tag) && children.is_empty() {
                return;
            }
            for child in children {
                serialize(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn escape_text(src: &str, out: &mut String) {
    for ch in src.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(src: &str, out: &mut String) {
    for ch in src.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

// ---- Character references ----

fn decode_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let bytes = src.as_bytes();
    let mut out = String::with_capacity(src.len());
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'&' {
            if let Some(semi) = find_byte(bytes, i + 1, b';') {
                if let Some(decoded) = src.get(i + 1..semi).and_then(decode_entity) {
                    out.push(decoded);
                    i = semi + 1;
                    continue;
                }
            }
            out.push('&');
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i] != b'&' {
            i += 1;
        }
        if let Some(chunk) = src.get(start..i) {
            out.push_str(chunk);
        }
    }

    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let rest = name.strip_prefix('#')?;
            let code = if let Some(hex) = rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                rest.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

// ---- Scanning helpers ----

fn parse_error(message: &str) -> DomError {
    DomError::Parse {
        message: message.to_string(),
    }
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_attr_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    at + needle.len() <= bytes.len() && &bytes[at..at + needle.len()] == needle
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from > bytes.len() {
        return None;
    }
    let mut i = from;
    while i + needle.len() <= bytes.len() {
        if &bytes[i..i + needle.len()] == needle {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    (from..bytes.len()).find(|&i| bytes[i] == needle)
}
