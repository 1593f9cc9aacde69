//! `$node.field` references inside free-text configuration values, and the
//! editing model for fields that show them as tokens.

pub mod editor;
pub mod offset;
pub mod parse;
pub mod surface;

pub use editor::{AutocompleteQuery, ClipboardData, InputOutcome, ReferenceEditor, detect_trigger};
pub use offset::{offset_to_position, position_to_offset};
pub use parse::{
    ReferenceMatch, Segment, display_label, find_references, is_identifier_char, is_identifier_start, join_segments,
    segment_value, split_reference,
};
pub use surface::{Block, Inline, MARKER, Surface, SurfaceNode, SurfacePosition, render};
