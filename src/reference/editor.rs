//! Editing state for one reference-aware text field.
//!
//! Every mutation goes the same way: decode the surface (or take the current
//! raw value), change the raw string, re-render the surface from its
//! segments. The surface is never patched in place by the editor, so what is
//! displayed and what is stored cannot drift apart.
//!
//! Caret restoration after an insertion is deferred: the new raw offset is
//! parked in `pending_cursor` and resolved by `next_frame()` once the host
//! has painted the re-rendered surface.

use serde::{Deserialize, Serialize};

use super::offset::{offset_to_position, position_to_offset};
use super::parse::{ReferenceMatch, Segment, find_references, is_escaped, is_identifier_start, segment_value};
use super::surface::{Surface, SurfacePosition, render};

/// An open `$` autocomplete: the `$` sits at raw offset `start`, `query` is
/// what was typed after it up to the caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteQuery {
    pub start: usize,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOutcome {
    pub changed: bool,
    pub autocomplete: Option<AutocompleteQuery>,
}

/// Clipboard contents offered by a paste event. Only plain text is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardData {
    pub plain: Option<String>,
    pub html: Option<String>,
}

impl ClipboardData {
    pub fn plain(text: impl Into<String>) -> Self {
        ClipboardData {
            plain: Some(text.into()),
            html: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceEditor {
    raw: String,
    surface: Surface,
    matches: Vec<ReferenceMatch>,
    selection: Option<SurfacePosition>,
    autocomplete: Option<AutocompleteQuery>,
    pending_cursor: Option<usize>,
}

impl ReferenceEditor {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        ReferenceEditor {
            surface: render(&segment_value(&raw)),
            matches: find_references(&raw),
            raw,
            selection: None,
            autocomplete: None,
            pending_cursor: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.raw
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn matches(&self) -> &[ReferenceMatch] {
        &self.matches
    }

    pub fn segments(&self) -> Vec<Segment> {
        segment_value(&self.raw)
    }

    pub fn selection(&self) -> Option<SurfacePosition> {
        self.selection
    }

    pub fn autocomplete(&self) -> Option<&AutocompleteQuery> {
        self.autocomplete.as_ref()
    }

    pub fn pending_cursor(&self) -> Option<usize> {
        self.pending_cursor
    }

    /// Raw offset of the caret, if it is inside the surface.
    pub fn cursor_offset(&self) -> Option<usize> {
        self.selection
            .and_then(|pos| position_to_offset(&self.surface, pos))
    }

    /// Replace the value from outside the field (undo, external update).
    pub fn set_value(&mut self, raw: impl Into<String>) {
        self.commit(raw.into());
        self.selection = None;
        self.autocomplete = None;
        self.pending_cursor = None;
    }

    /// Native selection change.
    pub fn set_selection(&mut self, selection: Option<SurfacePosition>) {
        self.selection = selection;
        if self.cursor_offset().is_none() {
            if selection.is_some() {
                tracing::warn!(?selection, "selection outside the reference surface");
            }
            self.selection = None;
            self.autocomplete = None;
        }
    }

    /// Reconcile after the host mutated the surface natively (typing).
    ///
    /// `surface` and `selection` are the post-edit state of the host surface.
    pub fn handle_input(&mut self, surface: Surface, selection: Option<SurfacePosition>) -> InputOutcome {
        let raw = surface.extract_raw();
        let caret = selection.and_then(|pos| position_to_offset(&surface, pos));
        if selection.is_some() && caret.is_none() {
            tracing::warn!(?selection, "input caret could not be mapped to a raw offset");
        }

        let changed = raw != self.raw;
        self.commit(raw);
        self.selection = caret.and_then(|o| offset_to_position(&self.surface, o));
        if changed {
            self.autocomplete = caret.and_then(|o| detect_trigger(&self.raw, o));
        }

        InputOutcome {
            changed,
            autocomplete: self.autocomplete.clone(),
        }
    }

    /// Type `text` at the caret, or at the end when there is none.
    pub fn type_text(&mut self, text: &str) -> InputOutcome {
        let mut surface = self.surface.clone();
        let at = self.caret_or_end();
        let caret = at.and_then(|pos| surface.insert_text(pos, text));
        self.handle_input(surface, caret)
    }

    /// Backspace at the caret. Tokens go as a whole.
    pub fn backspace(&mut self) -> InputOutcome {
        let mut surface = self.surface.clone();
        let at = self.caret_or_end();
        let caret = at.and_then(|pos| surface.delete_backward(pos));
        self.handle_input(surface, caret)
    }

    /// Accept an autocomplete suggestion.
    ///
    /// Replaces the `$`-to-caret span when it is still valid, otherwise
    /// inserts at the caret (or the end).
    pub fn accept_suggestion(&mut self, path: &str) {
        let cursor = self.cursor_offset();
        let span = self.autocomplete.take().and_then(|ac| {
            let end = cursor?;
            let still_open = detect_trigger(&self.raw, end).is_some_and(|t| t.start == ac.start);
            still_open.then_some((ac.start, end))
        });

        match span {
            Some((start, end)) => self.replace_range(start, end, path),
            None => self.insert_at_cursor(path),
        }
    }

    /// Insert a reference chosen from the variable picker at the caret.
    pub fn insert_reference(&mut self, path: &str) {
        self.autocomplete = None;
        self.insert_at_cursor(path);
    }

    /// Remove the `index`-th reference token. Returns false if there is none.
    pub fn remove_token(&mut self, index: usize) -> bool {
        let Some(m) = self.matches.get(index) else {
            return false;
        };
        let (start, end) = (m.start, m.end);
        self.autocomplete = None;
        self.replace_range(start, end, "");
        true
    }

    /// Paste clipboard contents as plain text. Structured content is dropped.
    pub fn paste(&mut self, clipboard: &ClipboardData) -> bool {
        let Some(text) = clipboard.plain.as_deref().filter(|t| !t.is_empty()) else {
            return false;
        };
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.autocomplete = None;
        self.insert_at_cursor(&text);
        true
    }

    /// Resolve the parked caret against the re-rendered surface.
    pub fn next_frame(&mut self) -> Option<SurfacePosition> {
        if let Some(offset) = self.pending_cursor.take() {
            self.selection = offset_to_position(&self.surface, offset);
            if self.selection.is_none() {
                tracing::warn!(offset, "pending caret no longer fits the surface");
            }
        }
        self.selection
    }

    fn caret_or_end(&self) -> Option<SurfacePosition> {
        self.selection
            .filter(|pos| position_to_offset(&self.surface, *pos).is_some())
            .or_else(|| offset_to_position(&self.surface, self.surface.raw_length()))
    }

    fn insert_at_cursor(&mut self, text: &str) {
        let at = self
            .cursor_offset()
            .unwrap_or_else(|| self.raw.chars().count());
        self.replace_range(at, at, text);
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        let chars: Vec<char> = self.raw.chars().collect();
        let end = end.min(chars.len());
        let start = start.min(end);
        let mut next: String = chars[..start].iter().collect();
        next.push_str(text);
        next.extend(&chars[end..]);

        tracing::debug!(start, end, inserted = text.len(), "reference field edited");
        self.commit(next);
        self.selection = None;
        self.pending_cursor = Some(start + text.chars().count());
    }

    fn commit(&mut self, raw: String) {
        self.surface = render(&segment_value(&raw));
        self.matches = find_references(&raw);
        self.raw = raw;
    }
}

/// The open `$` trigger ending at raw offset `cursor`, if any.
///
/// Walks back from the caret to the nearest `$` with no whitespace in between.
/// An escaped `$` ends the walk. A `$` right after a `.` is a path segment such as `$item`, not
/// a trigger. The `$` must be followed by an identifier start, or be directly
/// before the caret.
pub fn detect_trigger(raw: &str, cursor: usize) -> Option<AutocompleteQuery> {
    let chars: Vec<char> = raw.chars().collect();
    if cursor > chars.len() {
        return None;
    }

    let mut i = cursor;
    while i > 0 {
        i -= 1;
        let c = chars[i];
        if c.is_whitespace() {
            return None;
        }
        if c != '$' || (i > 0 && chars[i - 1] == '.') {
            continue;
        }
        if is_escaped(&chars, i) {
            return None;
        }
        let opens = i + 1 == cursor || chars.get(i + 1).copied().is_some_and(is_identifier_start);
        return opens.then(|| AutocompleteQuery {
            start: i,
            query: chars[i + 1..cursor].iter().collect(),
        });
    }
    None
}
