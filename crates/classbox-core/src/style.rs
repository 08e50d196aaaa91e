//! Node style compilation.
//!
//! Declarations from class definitions come first, inline declarations second. A later
//! occurrence of a key overrides the value but keeps the position of the first occurrence.

use crate::model::Node;
use indexmap::IndexMap;
use std::fmt::Write as _;

pub fn parse_style_decl(s: &str) -> Option<(&str, &str)> {
    let s = s.trim().trim_end_matches(';').trim();
    if s.is_empty() {
        return None;
    }
    let (k, v) = s.split_once(':')?;
    let k = k.trim();
    let v = v.trim();
    if k.is_empty() || v.is_empty() {
        return None;
    }
    Some((k, v))
}

/// Keys that style the label text rather than the shape.
pub fn is_label_style_key(key: &str) -> bool {
    matches!(
        key,
        "color"
            | "font-size"
            | "font-family"
            | "font-weight"
            | "font-style"
            | "text-decoration"
            | "text-align"
            | "text-transform"
            | "line-height"
            | "letter-spacing"
            | "word-spacing"
            | "text-shadow"
            | "text-overflow"
            | "white-space"
            | "word-wrap"
            | "word-break"
            | "overflow-wrap"
            | "hyphens"
    )
}

pub fn compile_styles(node: &Node) -> IndexMap<String, String> {
    let mut map: IndexMap<String, String> = IndexMap::new();
    for decl in node
        .css_compiled_styles
        .iter()
        .chain(node.css_styles.iter())
    {
        let Some((k, v)) = parse_style_decl(decl) else {
            continue;
        };
        map.insert(k.to_string(), v.to_string());
    }
    map
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledStyles {
    pub label_styles: String,
    pub node_styles: String,
}

pub fn styles_to_string(node: &Node) -> CompiledStyles {
    fn push_decl(out: &mut String, k: &str, v: &str) {
        if !out.is_empty() {
            out.push(';');
        }
        let _ = write!(out, "{k}:{v} !important");
    }

    let mut out = CompiledStyles::default();
    for (k, v) in &compile_styles(node) {
        if is_label_style_key(k) {
            push_decl(&mut out.label_styles, k, v);
            continue;
        }
        push_decl(&mut out.node_styles, k, v);
    }
    out
}

/// Value of the first `color` declaration in a `;`-separated style string.
pub fn find_color_decl(styles: &str) -> Option<&str> {
    styles
        .split(';')
        .filter_map(parse_style_decl)
        .find(|(k, _)| k.eq_ignore_ascii_case("color"))
        .map(|(_, v)| v)
}
