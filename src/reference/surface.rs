//! The rich editable surface a reference field renders into.
//!
//! One block per line. Inside a block, text is literal content and each
//! reference is an atomic token carrying its raw string as opaque data, so
//! extraction never depends on the rendered label. Zero-width marker
//! characters keep adjacent tokens apart and give the caret somewhere to land
//! at a line edge next to a token; they never count towards the raw value.

use serde::{Deserialize, Serialize};

use super::parse::{Segment, display_label};

/// Invisible spacer between adjacent tokens.
pub const MARKER: char = '\u{200B}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Inline {
    Text { text: String },
    Token { raw: String, label: String },
    /// Soft line break inside a block.
    LineBreak,
    /// Stand-in rendered on an empty line so the line survives.
    Placeholder,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text { text: text.into() }
    }

    pub fn marker() -> Self {
        Inline::text(MARKER)
    }

    /// Characters this node contributes to the raw value.
    pub fn raw_length(&self) -> usize {
        match self {
            Inline::Text { text } => text.chars().filter(|&c| c != MARKER).count(),
            Inline::Token { raw, .. } => raw.chars().count(),
            Inline::LineBreak => 1,
            Inline::Placeholder => 0,
        }
    }

    fn push_raw(&self, out: &mut String) {
        match self {
            Inline::Text { text } => out.extend(text.chars().filter(|&c| c != MARKER)),
            Inline::Token { raw, .. } => out.push_str(raw),
            Inline::LineBreak => out.push('\n'),
            Inline::Placeholder => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub children: Vec<Inline>,
}

impl Block {
    pub fn raw_length(&self) -> usize {
        self.children.iter().map(Inline::raw_length).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    pub blocks: Vec<Block>,
}

impl Default for Surface {
    fn default() -> Self {
        render(&[])
    }
}

impl Surface {
    /// Raw length of the whole surface, counting one newline per block boundary.
    pub fn raw_length(&self) -> usize {
        let content: usize = self.blocks.iter().map(Block::raw_length).sum();
        content + self.blocks.len().saturating_sub(1)
    }

    /// Raw offset at which block `index` starts.
    pub fn block_start(&self, index: usize) -> usize {
        self.blocks
            .iter()
            .take(index)
            .map(|b| b.raw_length() + 1)
            .sum()
    }

    /// Decode the surface back into its raw string.
    pub fn extract_raw(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for child in &block.children {
                child.push_raw(&mut out);
            }
        }
        out
    }
}

/// Encode segments into a surface.
pub fn render(segments: &[Segment]) -> Surface {
    let mut lines: Vec<Vec<Inline>> = vec![Vec::new()];

    for segment in segments {
        match segment {
            Segment::Text { value } => {
                for (i, piece) in value.split('\n').enumerate() {
                    if i > 0 {
                        lines.push(Vec::new());
                    }
                    if !piece.is_empty() {
                        if let Some(line) = lines.last_mut() {
                            line.push(Inline::text(piece));
                        }
                    }
                }
            }
            Segment::Variable {
                value,
                node_name,
                field_path,
            } => {
                if let Some(line) = lines.last_mut() {
                    line.push(Inline::Token {
                        raw: value.clone(),
                        label: display_label(node_name, field_path.as_deref()),
                    });
                }
            }
        }
    }

    Surface {
        blocks: lines.into_iter().map(layout_line).collect(),
    }
}

fn layout_line(line: Vec<Inline>) -> Block {
    if line.is_empty() {
        return Block {
            children: vec![Inline::Placeholder],
        };
    }

    let is_token = |n: Option<&Inline>| matches!(n, Some(Inline::Token { .. }));
    let mut children = Vec::with_capacity(line.len() + 2);
    if is_token(line.first()) {
        children.push(Inline::marker());
    }
    let ends_with_token = is_token(line.last());
    for node in line {
        if is_token(Some(&node)) && is_token(children.last()) {
            children.push(Inline::marker());
        }
        children.push(node);
    }
    if ends_with_token {
        children.push(Inline::marker());
    }
    Block { children }
}

// =============================================================================
// NATIVE POSITIONS
// =============================================================================

/// The node a native position is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "index", rename_all = "camelCase")]
pub enum SurfaceNode {
    /// Offset counts blocks.
    Root,
    /// Offset counts children of the block.
    Block(usize),
    /// A child of a block. For text the offset counts characters, markers
    /// included; for anything else it is 0 (before) or 1 (after).
    Inline(usize, usize),
}

/// A native `(node, offset)` caret address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfacePosition {
    pub node: SurfaceNode,
    pub offset: usize,
}

impl SurfacePosition {
    pub fn new(node: SurfaceNode, offset: usize) -> Self {
        SurfacePosition { node, offset }
    }
}

// =============================================================================
// NATIVE EDITS
// =============================================================================
//
// These mirror what a browser contenteditable does to the surface when the
// user types or presses backspace. The editor never patches the surface
// itself; it decodes the result and re-renders.

impl Surface {
    /// Insert literal text at `at`, returning the caret after it.
    pub fn insert_text(&mut self, at: SurfacePosition, text: &str) -> Option<SurfacePosition> {
        let inserted = text.chars().count();
        let (b, i) = match at.node {
            SurfaceNode::Inline(b, i) => {
                let child = self.blocks.get_mut(b)?.children.get_mut(i)?;
                if let Inline::Text { text: existing } = child {
                    let byte = byte_index(existing, at.offset)?;
                    existing.insert_str(byte, text);
                    return Some(SurfacePosition::new(at.node, at.offset + inserted));
                }
                (b, if at.offset == 0 { i } else { i + 1 })
            }
            SurfaceNode::Block(b) => (b, at.offset),
            SurfaceNode::Root => {
                let b = at.offset.min(self.blocks.len().checked_sub(1)?);
                (b, 0)
            }
        };

        let block = self.blocks.get_mut(b)?;
        if i > block.children.len() {
            return None;
        }
        if block.children == [Inline::Placeholder] {
            block.children.clear();
        }
        let i = i.min(block.children.len());

        if let Some(Inline::Text { text: existing }) = i.checked_sub(1).and_then(|p| block.children.get_mut(p)) {
            existing.push_str(text);
            let end = existing.chars().count();
            return Some(SurfacePosition::new(SurfaceNode::Inline(b, i - 1), end));
        }
        block.children.insert(i, Inline::text(text));
        Some(SurfacePosition::new(SurfaceNode::Inline(b, i), inserted))
    }

    /// Delete the character or token before `at`, returning the new caret.
    ///
    /// Markers are removed together with the visible character next to them;
    /// at the start of a block the block is joined onto the previous one.
    pub fn delete_backward(&mut self, at: SurfacePosition) -> Option<SurfacePosition> {
        let (b, i) = match at.node {
            SurfaceNode::Inline(b, i) => {
                let child = self.blocks.get_mut(b)?.children.get_mut(i)?;
                if let Inline::Text { text } = child {
                    let mut chars: Vec<char> = text.chars().collect();
                    let mut k = at.offset.min(chars.len());
                    while k > 0 && chars[k - 1] == MARKER {
                        k -= 1;
                        chars.remove(k);
                    }
                    if k > 0 {
                        k -= 1;
                        chars.remove(k);
                        *text = chars.into_iter().collect();
                        return Some(SurfacePosition::new(at.node, k));
                    }
                    *text = chars.into_iter().collect();
                    (b, i)
                } else {
                    (b, if at.offset == 0 { i } else { i + 1 })
                }
            }
            SurfaceNode::Block(b) => (b, at.offset),
            SurfaceNode::Root => return None,
        };

        let block = self.blocks.get_mut(b)?;
        let mut i = i.min(block.children.len());
        while i > 0 {
            match &mut block.children[i - 1] {
                Inline::Text { text } => {
                    let mut chars: Vec<char> = text.chars().collect();
                    while chars.last() == Some(&MARKER) {
                        chars.pop();
                    }
                    if chars.pop().is_some() {
                        let end = chars.len();
                        *text = chars.into_iter().collect();
                        return Some(SurfacePosition::new(SurfaceNode::Inline(b, i - 1), end));
                    }
                    block.children.remove(i - 1);
                    i -= 1;
                }
                Inline::Placeholder => {
                    block.children.remove(i - 1);
                    i -= 1;
                }
                Inline::Token { .. } | Inline::LineBreak => {
                    block.children.remove(i - 1);
                    return Some(SurfacePosition::new(SurfaceNode::Block(b), i - 1));
                }
            }
        }

        if b == 0 {
            return Some(SurfacePosition::new(SurfaceNode::Block(0), 0));
        }
        let removed = self.blocks.remove(b);
        let previous = &mut self.blocks[b - 1];
        if previous.children == [Inline::Placeholder] {
            previous.children.clear();
        }
        let join_at = previous.children.len();
        previous
            .children
            .extend(removed.children.into_iter().filter(|c| *c != Inline::Placeholder));
        if previous.children.is_empty() {
            previous.children.push(Inline::Placeholder);
        }
        Some(SurfacePosition::new(SurfaceNode::Block(b - 1), join_at))
    }
}

fn byte_index(s: &str, char_offset: usize) -> Option<usize> {
    if char_offset == s.chars().count() {
        return Some(s.len());
    }
    s.char_indices().nth(char_offset).map(|(i, _)| i)
}
