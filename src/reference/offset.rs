//! Raw offset ↔ native surface position mapping.
//!
//! Both directions walk the same raw-length accounting: text counts its
//! non-marker characters, a token counts its raw reference, a line break
//! counts 1, a placeholder 0, and every block after the first adds 1 for the
//! implicit newline. Tokens and line breaks are atomic: a caret resolves to
//! just before or just after them, never inside.

use super::surface::{Inline, MARKER, Surface, SurfaceNode, SurfacePosition};

/// Native position for raw offset `offset`, or `None` past the end.
///
/// Offsets strictly inside a token snap to the position after it.
pub fn offset_to_position(surface: &Surface, offset: usize) -> Option<SurfacePosition> {
    if surface.blocks.is_empty() {
        return (offset == 0).then(|| SurfacePosition::new(SurfaceNode::Root, 0));
    }

    let mut acc = 0;
    for (b, block) in surface.blocks.iter().enumerate() {
        if b > 0 {
            acc += 1;
        }
        let len = block.raw_length();
        if offset <= acc + len {
            return Some(position_in_block(b, &block.children, offset - acc));
        }
        acc += len;
    }
    None
}

fn position_in_block(b: usize, children: &[Inline], mut local: usize) -> SurfacePosition {
    for (i, child) in children.iter().enumerate() {
        let len = child.raw_length();
        match child {
            Inline::Text { text } if local <= len => {
                return SurfacePosition::new(SurfaceNode::Inline(b, i), char_index_for(text, local));
            }
            Inline::Token { .. } if local < len => {
                let after = if local == 0 { i } else { i + 1 };
                return SurfacePosition::new(SurfaceNode::Block(b), after);
            }
            Inline::LineBreak | Inline::Placeholder if local == 0 => {
                return SurfacePosition::new(SurfaceNode::Block(b), i);
            }
            _ => local -= len,
        }
    }
    SurfacePosition::new(SurfaceNode::Block(b), children.len())
}

/// Index of the character after the `visible`-th non-marker character.
fn char_index_for(text: &str, visible: usize) -> usize {
    let mut seen = 0;
    for (index, c) in text.chars().enumerate() {
        if seen == visible {
            return index;
        }
        if c != MARKER {
            seen += 1;
        }
    }
    text.chars().count()
}

/// Raw offset of a native position, or `None` if it does not address the
/// surface.
pub fn position_to_offset(surface: &Surface, position: SurfacePosition) -> Option<usize> {
    match position.node {
        SurfaceNode::Root => {
            if position.offset > surface.blocks.len() {
                return None;
            }
            if position.offset == surface.blocks.len() {
                return Some(surface.raw_length());
            }
            Some(surface.block_start(position.offset))
        }
        SurfaceNode::Block(b) => {
            let block = surface.blocks.get(b)?;
            if position.offset > block.children.len() {
                return None;
            }
            let before: usize = block.children[..position.offset]
                .iter()
                .map(Inline::raw_length)
                .sum();
            Some(surface.block_start(b) + before)
        }
        SurfaceNode::Inline(b, i) => {
            let block = surface.blocks.get(b)?;
            let child = block.children.get(i)?;
            let before: usize = block.children[..i].iter().map(Inline::raw_length).sum();
            let within = match child {
                Inline::Text { text } => {
                    if position.offset > text.chars().count() {
                        return None;
                    }
                    text.chars()
                        .take(position.offset)
                        .filter(|&c| c != MARKER)
                        .count()
                }
                atomic if position.offset > 0 => atomic.raw_length(),
                _ => 0,
            };
            Some(surface.block_start(b) + before + within)
        }
    }
}
