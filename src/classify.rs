// src/classify.rs
//! Line classification engine.
//!
//! A [`Classifier`] scans a file's lines left to right against one
//! [`LanguageDefinition`], deciding for each line whether it is code, a
//! comment, or blank. Block-comment state carries across lines; string
//! state is line-local (a quote never spans lines). The scanner is a total
//! function over text: it never fails, whatever the input.

use crate::language::LanguageDefinition;
use crate::stats::LineTally;

/// Classification of a single input line.
///
/// A line gets exactly one class. Any code content on a line promotes the
/// whole line to `Code`, even when the line also opens or closes a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Code,
    Comment,
    Blank,
}

/// Per-file scanner state. Created at the start of a file scan, discarded
/// at the end; never shared across files.
#[derive(Debug, Default)]
struct ScanState {
    /// Index of the active block pair while inside a block comment.
    block: Option<usize>,
    /// Nesting depth for languages whose block comments nest.
    depth: usize,
}

pub struct Classifier<'a> {
    def: &'a LanguageDefinition,
    state: ScanState,
}

impl<'a> Classifier<'a> {
    pub fn new(def: &'a LanguageDefinition) -> Self {
        Self {
            def,
            state: ScanState::default(),
        }
    }

    /// Classify every line and return the tally.
    pub fn tally<'s>(&mut self, lines: impl IntoIterator<Item = &'s str>) -> LineTally {
        let mut tally = LineTally::default();
        for line in lines {
            tally.record(self.next_line(line));
        }
        tally
    }

    /// Like [`Self::tally`], but also returns the per-line classification
    /// for callers needing line-level detail.
    pub fn tally_detailed<'s>(
        &mut self,
        lines: impl IntoIterator<Item = &'s str>,
    ) -> (LineTally, Vec<LineKind>) {
        let mut tally = LineTally::default();
        let mut kinds = Vec::new();
        for line in lines {
            let kind = self.next_line(line);
            tally.record(kind);
            kinds.push(kind);
        }
        (tally, kinds)
    }

    /// Classify one line, advancing block-comment state.
    pub fn next_line(&mut self, line: &str) -> LineKind {
        // Pure-data formats: comment detection is not meaningful, every
        // non-blank line counts as content.
        if self.def.nocode {
            return if line.trim().is_empty() {
                LineKind::Blank
            } else {
                LineKind::Code
            };
        }

        let opened_in_block = self.state.block.is_some();
        if !opened_in_block && line.trim().is_empty() {
            return LineKind::Blank;
        }

        let bytes = line.as_bytes();
        let mut saw_code = false;
        let mut saw_comment = opened_in_block;
        let mut in_string: Option<u8> = None;
        let mut i = 0;

        while i < bytes.len() {
            if let Some(pair) = self.state.block {
                saw_comment = true;
                match self.scan_block_body(bytes, i, pair) {
                    // Block closed mid-line: rescan the remainder as fresh
                    // content.
                    Some(next) => i = next,
                    None => i = bytes.len(),
                }
                continue;
            }

            if let Some(quote) = in_string {
                if bytes[i] == b'\\' {
                    i = (i + 2).min(bytes.len());
                } else {
                    if bytes[i] == quote {
                        in_string = None;
                    }
                    i += 1;
                }
                continue;
            }

            let marker = self
                .def
                .line_markers
                .iter()
                .find(|m| token_at(bytes, i, m.as_bytes()));
            let block = self
                .def
                .block_pairs
                .iter()
                .position(|(start, _)| token_at(bytes, i, start.as_bytes()));

            match (marker, block) {
                // Both claim this offset (e.g. Lua `--` vs `--[[`): the
                // longer token wins.
                (Some(m), Some(p)) if self.def.block_pairs[p].0.len() > m.len() => {
                    saw_comment = true;
                    self.open_block(p);
                    i += self.def.block_pairs[p].0.len();
                }
                (Some(_), _) => {
                    // Everything from the marker to end of line is comment;
                    // no state carries to the next line.
                    saw_comment = true;
                    break;
                }
                (None, Some(p)) => {
                    saw_comment = true;
                    self.open_block(p);
                    i += self.def.block_pairs[p].0.len();
                }
                (None, None) => {
                    let b = bytes[i];
                    if b < 0x80 && self.def.quotes.contains(&(b as char)) {
                        in_string = Some(b);
                        saw_code = true;
                    } else if !b.is_ascii_whitespace() {
                        saw_code = true;
                    }
                    i += 1;
                }
            }
        }

        if saw_code {
            LineKind::Code
        } else if saw_comment {
            LineKind::Comment
        } else {
            LineKind::Blank
        }
    }

    fn open_block(&mut self, pair: usize) {
        self.state.block = Some(pair);
        self.state.depth = 1;
    }

    /// Scan inside an open block comment from `from`. Returns the offset
    /// just past the closing delimiter, or `None` when the line ends with
    /// the block still open.
    fn scan_block_body(&mut self, bytes: &[u8], from: usize, pair: usize) -> Option<usize> {
        let (start, end) = &self.def.block_pairs[pair];
        let mut i = from;
        while i < bytes.len() {
            if self.def.nested && start != end && token_at(bytes, i, start.as_bytes()) {
                self.state.depth += 1;
                i += start.len();
                continue;
            }
            if token_at(bytes, i, end.as_bytes()) {
                i += end.len();
                if self.def.nested && self.state.depth > 1 {
                    self.state.depth -= 1;
                    continue;
                }
                self.state.block = None;
                self.state.depth = 0;
                return Some(i);
            }
            i += 1;
        }
        None
    }
}

fn token_at(bytes: &[u8], i: usize, token: &[u8]) -> bool {
    !token.is_empty() && bytes[i..].starts_with(token)
}
