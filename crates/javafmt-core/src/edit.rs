//! Token edit buffer
//!
//! Passes never mutate the token sequence. They record edits keyed by
//! original token indices and the buffer applies them all at once during
//! materialization, walking the original sequence token by token. Because
//! every edit refers to original indices, the order in which passes issue
//! edits does not affect where they land.

use std::collections::BTreeMap;

use crate::cst::Token;

/// One recorded edit against the original token sequence
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    /// Replace the inclusive index range with the given text
    Replace { start: usize, end: usize, text: String },
    /// Remove the inclusive index range
    Delete { start: usize, end: usize },
}

impl Edit {
    fn start(&self) -> usize {
        match self {
            Edit::Replace { start, .. } | Edit::Delete { start, .. } => *start,
        }
    }

    fn end(&self) -> usize {
        match self {
            Edit::Replace { end, .. } | Edit::Delete { end, .. } => *end,
        }
    }
}

/// Collects edits keyed by original token indices and applies them in one
/// materialization pass.
///
/// Conflict policy: for the same exact range the last recorded edit wins; an
/// edit whose range strictly contains another discards the inner one; between
/// intersecting edits where neither contains the other, the later one wins.
/// Insertions survive unless their anchor falls strictly inside a surviving
/// range edit.
#[derive(Debug, Default)]
pub struct TokenEditBuffer {
    /// Text inserted immediately before the keyed token, in issue order
    inserts: BTreeMap<usize, Vec<String>>,
    /// Range edits in issue order
    edits: Vec<Edit>,
}

impl TokenEditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert text immediately before the token at `index`.
    pub fn insert_before(&mut self, index: usize, text: impl Into<String>) {
        self.inserts.entry(index).or_default().push(text.into());
    }

    /// Replace the single token at `index` with new text.
    pub fn replace(&mut self, index: usize, text: impl Into<String>) {
        self.replace_range(index, index, text);
    }

    /// Replace the inclusive token range `start..=end` with new text.
    pub fn replace_range(&mut self, start: usize, end: usize, text: impl Into<String>) {
        debug_assert!(start <= end);
        self.edits.push(Edit::Replace {
            start,
            end,
            text: text.into(),
        });
    }

    /// Remove the token at `index` from the output.
    pub fn delete(&mut self, index: usize) {
        self.delete_range(index, index);
    }

    /// Remove the inclusive token range `start..=end` from the output.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end);
        self.edits.push(Edit::Delete { start, end });
    }

    /// True when no edit has been recorded.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.edits.is_empty()
    }

    /// Resolve conflicts between recorded range edits.
    fn resolve(&self) -> Vec<Edit> {
        let mut resolved: Vec<Edit> = Vec::new();
        for edit in &self.edits {
            let (s, e) = (edit.start(), edit.end());
            // An earlier edit strictly containing this one keeps precedence
            let shadowed = resolved
                .iter()
                .any(|r| r.start() <= s && e <= r.end() && (r.start() < s || e < r.end()));
            if shadowed {
                continue;
            }
            // This edit supersedes anything it contains or merely intersects
            resolved.retain(|r| r.end() < s || e < r.start());
            resolved.push(edit.clone());
        }
        resolved.sort_by_key(|r| r.start());
        resolved
    }

    /// Apply all edits against the original token sequence.
    pub fn materialize(&self, tokens: &[Token]) -> String {
        let resolved = self.resolve();
        let mut out = String::new();
        let mut next_edit = 0usize;

        let mut i = 0usize;
        while i < tokens.len() {
            let covering = resolved.get(next_edit).filter(|r| r.start() == i);
            // Inserts anchored at the start of a range edit go before it
            let suppressed_by = resolved
                .iter()
                .find(|r| r.start() < i && i <= r.end());
            if suppressed_by.is_none() {
                if let Some(texts) = self.inserts.get(&i) {
                    for text in texts {
                        out.push_str(text);
                    }
                }
            }
            match covering {
                Some(Edit::Replace { end, text, .. }) => {
                    out.push_str(text);
                    i = end + 1;
                    next_edit += 1;
                }
                Some(Edit::Delete { end, .. }) => {
                    i = end + 1;
                    next_edit += 1;
                }
                None => {
                    out.push_str(&tokens[i].text);
                    i += 1;
                }
            }
        }
        // Inserts anchored one past the last token append at the end
        if let Some(texts) = self.inserts.get(&tokens.len()) {
            for text in texts {
                out.push_str(text);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::lex;

    fn apply(source: &str, f: impl FnOnce(&mut TokenEditBuffer)) -> String {
        let tokens = lex(source);
        let mut buffer = TokenEditBuffer::new();
        f(&mut buffer);
        buffer.materialize(&tokens)
    }

    #[test]
    fn no_edits_reproduces_input_exactly() {
        let source = "class A {\n    int x = 1; // keep\n}\n";
        assert_eq!(apply(source, |_| {}), source);
    }

    #[test]
    fn insert_before_and_replace_and_delete() {
        // tokens: a(0) ws(1) b(2) ws(3) c(4)
        let out = apply("a b c", |buf| {
            buf.insert_before(2, ">>");
            buf.replace(2, "B");
            buf.delete(3);
        });
        assert_eq!(out, "a >>Bc");
    }

    #[test]
    fn last_edit_wins_for_identical_ranges() {
        let out = apply("a b c", |buf| {
            buf.replace(2, "first");
            buf.replace(2, "second");
        });
        assert_eq!(out, "a second c");
    }

    #[test]
    fn outer_replace_discards_inner_edit() {
        // tokens: a(0) ws(1) b(2) ws(3) c(4)
        let out = apply("a b c", |buf| {
            buf.replace_range(0, 4, "whole");
            buf.replace(2, "inner");
        });
        assert_eq!(out, "whole");
    }

    #[test]
    fn later_edit_wins_on_overlap() {
        // tokens: a(0) ws(1) b(2) ws(3) c(4) ws(5) d(6)
        let out = apply("a b c d", |buf| {
            buf.replace_range(0, 2, "left");
            buf.replace_range(2, 4, "right");
        });
        // The later edit discards the earlier one entirely; tokens the earlier
        // edit covered but the later does not are emitted unchanged.
        assert_eq!(out, "a right d");
    }

    #[test]
    fn insert_inside_replaced_range_is_dropped() {
        let out = apply("a b c", |buf| {
            buf.replace_range(0, 4, "X");
            buf.insert_before(2, "lost");
        });
        assert_eq!(out, "X");
    }

    #[test]
    fn insert_at_range_start_survives() {
        let out = apply("a b c", |buf| {
            buf.replace_range(2, 4, "Y");
            buf.insert_before(2, "pre-");
        });
        assert_eq!(out, "a pre-Y");
    }

    #[test]
    fn insert_at_end_of_sequence() {
        let out = apply("a", |buf| {
            buf.insert_before(1, "\n");
        });
        assert_eq!(out, "a\n");
    }

    #[test]
    fn multiple_inserts_at_same_index_keep_issue_order() {
        let out = apply("a b", |buf| {
            buf.insert_before(2, "1");
            buf.insert_before(2, "2");
        });
        assert_eq!(out, "a 12b");
    }

    #[test]
    fn delete_range_spans_multiple_tokens() {
        let out = apply("a b c d", |buf| {
            buf.delete_range(1, 4);
        });
        assert_eq!(out, "a d");
    }
}
