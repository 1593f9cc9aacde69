//! Scanning raw strings for `$nodeName.field.path` references.
//!
//! Grammar: `$` followed by an identifier (`[A-Za-z_][A-Za-z0-9_]*`), then any
//! number of `.segment` (`[A-Za-z0-9_$]+`) or `[digits]` accessors. A `$`
//! preceded by a backslash is escaped. Anything that does not match is plain
//! text; there is no error case.
//!
//! All offsets are character offsets, not byte offsets.

use serde::{Deserialize, Serialize};

/// One reference occurrence inside a raw string, spanning `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceMatch {
    pub full: String,
    pub node_name: String,
    pub field_path: Option<String>,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    Text {
        value: String,
    },
    Variable {
        value: String,
        #[serde(rename = "nodeName")]
        node_name: String,
        #[serde(rename = "fieldPath", default, skip_serializing_if = "Option::is_none")]
        field_path: Option<String>,
    },
}

impl Segment {
    pub fn raw(&self) -> &str {
        match self {
            Segment::Text { value } | Segment::Variable { value, .. } => value,
        }
    }
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// True when the `$` at `index` is preceded by a backslash.
pub(crate) fn is_escaped(chars: &[char], index: usize) -> bool {
    index > 0 && chars[index - 1] == '\\'
}

/// End (exclusive) of a reference starting with `$` at `start`, if any.
fn scan_reference(chars: &[char], start: usize) -> Option<usize> {
    if chars.get(start) != Some(&'$') || is_escaped(chars, start) {
        return None;
    }
    let mut i = start + 1;
    if !chars.get(i).copied().is_some_and(is_identifier_start) {
        return None;
    }
    while chars.get(i).copied().is_some_and(is_identifier_char) {
        i += 1;
    }

    loop {
        match chars.get(i) {
            Some('.') if chars.get(i + 1).copied().is_some_and(is_path_char) => {
                i += 1;
                while chars.get(i).copied().is_some_and(is_path_char) {
                    i += 1;
                }
            }
            Some('[') => {
                let mut j = i + 1;
                while chars.get(j).is_some_and(char::is_ascii_digit) {
                    j += 1;
                }
                if j > i + 1 && chars.get(j) == Some(&']') {
                    i = j + 1;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    Some(i)
}

/// Every non-escaped reference in `raw`, in order.
pub fn find_references(raw: &str) -> Vec<ReferenceMatch> {
    let chars: Vec<char> = raw.chars().collect();
    let mut matches = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match scan_reference(&chars, i) {
            Some(end) => {
                let full: String = chars[i..end].iter().collect();
                let (node_name, field_path) = split_reference(&full);
                matches.push(ReferenceMatch {
                    node_name: node_name.to_string(),
                    field_path: field_path.map(String::from),
                    full,
                    start: i,
                    end,
                });
                i = end;
            }
            None => i += 1,
        }
    }

    matches
}

/// Split `$Node.a.b` into `("Node", Some("a.b"))`; `$Node[0].a` into
/// `("Node", Some("[0].a"))`.
pub fn split_reference(full: &str) -> (&str, Option<&str>) {
    let body = full.strip_prefix('$').unwrap_or(full);
    let name_len = body
        .find(|c: char| !is_identifier_char(c))
        .unwrap_or(body.len());
    let (name, rest) = body.split_at(name_len);
    let path = rest.strip_prefix('.').unwrap_or(rest);
    (name, Some(path).filter(|p| !p.is_empty()))
}

/// Alternating text/variable segments covering all of `raw`.
pub fn segment_value(raw: &str) -> Vec<Segment> {
    let chars: Vec<char> = raw.chars().collect();
    let mut segments = Vec::new();
    let mut cursor = 0;

    for m in find_references(raw) {
        if m.start > cursor {
            segments.push(Segment::Text {
                value: chars[cursor..m.start].iter().collect(),
            });
        }
        cursor = m.end;
        segments.push(Segment::Variable {
            value: m.full,
            node_name: m.node_name,
            field_path: m.field_path,
        });
    }

    if cursor < chars.len() {
        segments.push(Segment::Text {
            value: chars[cursor..].iter().collect(),
        });
    }

    segments
}

/// Concatenate segments back into the raw string.
pub fn join_segments(segments: &[Segment]) -> String {
    segments.iter().map(Segment::raw).collect()
}

/// Friendly token label: `Node > field > path`.
pub fn display_label(node_name: &str, field_path: Option<&str>) -> String {
    let mut label = node_name.to_string();
    if let Some(path) = field_path {
        for part in path.split('.').filter(|p| !p.is_empty()) {
            label.push_str(" > ");
            label.push_str(part);
        }
    }
    label
}
