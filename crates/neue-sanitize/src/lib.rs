//! Allow-list HTML sanitizer for neue.
//!
//! The HTML writer only emits a fixed vocabulary of tags, classes and inline
//! styles. [`sanitize`] re-parses assembled HTML with html5ever and
//! re-serializes only that vocabulary:
//! - allowed elements keep their allowed attributes;
//! - unknown elements are unwrapped, keeping their children;
//! - script-like elements are dropped with their content;
//! - `href`/`src` must be relative or use `http`, `https` or `mailto`;
//! - `style` keeps only the declarations the writer produces.
//!
//! Anything stripped is logged at `warn`: the writer should never produce it.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Elements that may appear in output, with the attributes they may carry.
const ALLOWED: &[(&str, &[&str])] = &[
    ("a", &["href", "class"]),
    ("b", &[]),
    ("blockquote", &[]),
    ("br", &[]),
    ("div", &["class"]),
    ("figcaption", &[]),
    ("figure", &["class"]),
    ("h1", &[]),
    ("h2", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "class"]),
    ("li", &["class"]),
    ("ol", &[]),
    ("p", &["class"]),
    ("path", &["d"]),
    ("small", &[]),
    ("span", &["class", "style"]),
    ("strike", &[]),
    ("svg", &["class", "width", "role", "fill", "viewBox"]),
    ("ul", &["class"]),
];

/// Elements serialized without a closing tag.
const VOID: &[&str] = &["br", "img"];

/// Elements removed together with everything inside them.
const DROPPED: &[&str] = &[
    "head", "script", "style", "template", "iframe", "object", "embed", "noscript", "noembed",
    "noframes", "textarea", "title", "xmp", "plaintext", "video", "audio", "math", "select",
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Sanitize an HTML fragment against the allow-list.
pub fn sanitize(html: &str) -> String {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let mut out = String::with_capacity(html.len());
    write_children(&dom.document, &mut out);
    out
}

/// Attributes allowed on `tag`, or `None` when the tag itself is not allowed.
pub fn allowed_attributes(tag: &str) -> Option<&'static [&'static str]> {
    ALLOWED
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
}

fn write_children(handle: &Handle, out: &mut String) {
    for child in handle.children.borrow().iter() {
        write_node(child, out);
    }
}

fn write_node(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Document => write_children(handle, out),
        NodeData::Text { contents } => escape_text(&contents.borrow(), out),
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            if matches!(tag, "html" | "body") {
                write_children(handle, out);
                return;
            }
            if DROPPED.contains(&tag) {
                if tag != "head" || !handle.children.borrow().is_empty() {
                    tracing::warn!(tag, "dropped disallowed element with its content");
                }
                return;
            }
            let Some(allowed) = allowed_attributes(tag) else {
                tracing::warn!(tag, "unwrapped disallowed element");
                write_children(handle, out);
                return;
            };

            out.push('<');
            out.push_str(tag);
            for attr in attrs.borrow().iter() {
                let attr_name = attr.name.local.as_ref();
                let Some(&attr_name) = allowed.iter().find(|a| **a == attr_name) else {
                    tracing::warn!(tag, attr = attr_name, "stripped disallowed attribute");
                    continue;
                };
                let Some(value) = clean_attribute(attr_name, &attr.value) else {
                    tracing::warn!(tag, attr = attr_name, "stripped unsafe attribute value");
                    continue;
                };
                out.push(' ');
                out.push_str(attr_name);
                out.push_str("=\"");
                escape_attr(&value, out);
                out.push('"');
            }
            out.push('>');

            if VOID.contains(&tag) {
                return;
            }
            write_children(handle, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeData::Comment { .. } => {}
        NodeData::Doctype { .. } => {}
        NodeData::ProcessingInstruction { .. } => {}
    }
}

fn clean_attribute(name: &str, value: &str) -> Option<String> {
    match name {
        "href" | "src" => is_safe_url(value).then(|| value.to_string()),
        "style" => clean_style(value),
        _ => Some(value.to_string()),
    }
}

/// Whether `url` is relative or uses an allowed scheme.
pub fn is_safe_url(url: &str) -> bool {
    // Browsers ignore whitespace and control characters inside the scheme.
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();
    let Some(colon) = compact.find(':') else {
        return true;
    };
    if compact[..colon].contains(['/', '?', '#']) {
        return true;
    }
    let scheme = compact[..colon].to_ascii_lowercase();
    URL_SCHEMES.contains(&scheme.as_str())
}

/// Keep only the inline style declarations the writer emits.
fn clean_style(style: &str) -> Option<String> {
    let kept: Vec<String> = style
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            let ok = match property.as_str() {
                "color" => is_hex_color(&value),
                "text-decoration" => value == "underline",
                "width" => is_percentage(&value),
                _ => false,
            };
            ok.then(|| format!("{property}:{value}"))
        })
        .collect();
    (!kept.is_empty()).then(|| kept.join(";"))
}

fn is_hex_color(value: &str) -> bool {
    value.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
    })
}

fn is_percentage(value: &str) -> bool {
    value.strip_suffix('%').is_some_and(|digits| {
        !digits.is_empty() && digits.len() <= 3 && digits.chars().all(|c| c.is_ascii_digit())
    })
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
