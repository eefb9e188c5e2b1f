// src/stats.rs
use std::collections::BTreeMap;
use std::ops::AddAssign;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::classify::LineKind;

/// Code/comment/blank counts for one file or one aggregation bucket.
///
/// Invariant: `code + comment + blank` equals the number of lines recorded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineTally {
    pub code: u64,
    pub comment: u64,
    pub blank: u64,
}

impl LineTally {
    pub fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Code => self.code += 1,
            LineKind::Comment => self.comment += 1,
            LineKind::Blank => self.blank += 1,
        }
    }

    pub const fn total(&self) -> u64 {
        self.code + self.comment + self.blank
    }
}

impl AddAssign for LineTally {
    fn add_assign(&mut self, rhs: Self) {
        self.code += rhs.code;
        self.comment += rhs.comment;
        self.blank += rhs.blank;
    }
}

/// Per-language totals across the project.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct LanguageTally {
    pub files: u64,
    #[serde(flatten)]
    pub lines: LineTally,
}

impl AddAssign for LanguageTally {
    fn add_assign(&mut self, rhs: Self) {
        self.files += rhs.files;
        self.lines += rhs.lines;
    }
}

/// Grand total over all languages. Same shape as a language bucket; kept as
/// its own name because it obeys a stronger invariant (element-wise sum of
/// every language bucket after each merge).
pub type ProjectTotal = LanguageTally;

/// Why a file was left out of the tallies. Never fatal to the run.
#[derive(Debug)]
pub enum SkipReason {
    /// No language definition claims this filename or extension.
    Unrecognized,
    /// NUL byte found in the leading chunk.
    Binary,
    /// File exceeds the configured maximum size.
    TooLarge(u64),
    /// The file could not be read; the cause is kept for diagnostics.
    Unreadable(std::io::Error),
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unrecognized => "unrecognized",
            Self::Binary => "binary",
            Self::TooLarge(_) => "too-large",
            Self::Unreadable(_) => "unreadable",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrecognized => write!(f, "no language definition matched"),
            Self::Binary => write!(f, "binary content"),
            Self::TooLarge(size) => write!(f, "file too large ({size} bytes)"),
            Self::Unreadable(err) => write!(f, "unreadable: {err}"),
        }
    }
}

/// Result of processing one file.
#[derive(Debug)]
pub enum FileOutcome {
    Counted { language: String, lines: LineTally },
    Skipped { reason: SkipReason },
}

/// Run-wide accumulator. Owned by the scanner; merges are serialized at a
/// single point, so any file-processing order yields identical totals.
#[derive(Debug, Default)]
pub struct ScanTotals {
    pub languages: BTreeMap<String, LanguageTally>,
    pub total: ProjectTotal,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub attempted: u64,
    pub elapsed: Duration,
}

impl ScanTotals {
    /// Fold one file's outcome into the run totals. Addition only, so the
    /// merge is commutative and associative across files.
    pub fn merge(&mut self, path: PathBuf, outcome: FileOutcome) {
        self.attempted += 1;
        match outcome {
            FileOutcome::Counted { language, lines } => {
                let bucket = self.languages.entry(language).or_default();
                bucket.files += 1;
                bucket.lines += lines;
                self.total.files += 1;
                self.total.lines += lines;
            }
            FileOutcome::Skipped { reason } => self.skipped.push((path, reason)),
        }
    }

    /// Skip totals keyed by reason label, for the report sink.
    pub fn skip_counts(&self) -> BTreeMap<&'static str, u64> {
        let mut counts = BTreeMap::new();
        for (_, reason) in &self.skipped {
            *counts.entry(reason.label()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(code: u64, comment: u64, blank: u64) -> LineTally {
        LineTally { code, comment, blank }
    }

    #[test]
    fn line_tally_add_assign_is_componentwise() {
        let mut a = tally(1, 2, 3);
        a += tally(10, 20, 30);
        assert_eq!(a, tally(11, 22, 33));
        assert_eq!(a.total(), 66);
    }

    #[test]
    fn merge_counts_files_and_lines() {
        let mut totals = ScanTotals::default();
        totals.merge(
            PathBuf::from("a.rs"),
            FileOutcome::Counted {
                language: "Rust".into(),
                lines: tally(5, 2, 1),
            },
        );
        totals.merge(
            PathBuf::from("b.rs"),
            FileOutcome::Counted {
                language: "Rust".into(),
                lines: tally(3, 0, 0),
            },
        );
        totals.merge(
            PathBuf::from("c.py"),
            FileOutcome::Counted {
                language: "Python".into(),
                lines: tally(7, 1, 2),
            },
        );

        let rust = &totals.languages["Rust"];
        assert_eq!(rust.files, 2);
        assert_eq!(rust.lines, tally(8, 2, 1));
        assert_eq!(totals.total.files, 3);
        assert_eq!(totals.total.lines, tally(15, 3, 3));
        assert_eq!(totals.attempted, 3);
    }

    #[test]
    fn project_total_matches_sum_of_buckets() {
        let mut totals = ScanTotals::default();
        for (name, lang) in [("a.rs", "Rust"), ("b.py", "Python"), ("c.py", "Python")] {
            totals.merge(
                PathBuf::from(name),
                FileOutcome::Counted {
                    language: lang.into(),
                    lines: tally(2, 1, 1),
                },
            );
        }
        let mut summed = ProjectTotal::default();
        for bucket in totals.languages.values() {
            summed += *bucket;
        }
        assert_eq!(summed.files, totals.total.files);
        assert_eq!(summed.lines, totals.total.lines);
    }

    #[test]
    fn skips_do_not_touch_line_totals() {
        let mut totals = ScanTotals::default();
        totals.merge(
            PathBuf::from("img.png"),
            FileOutcome::Skipped {
                reason: SkipReason::Unrecognized,
            },
        );
        totals.merge(
            PathBuf::from("blob.rs"),
            FileOutcome::Skipped {
                reason: SkipReason::Binary,
            },
        );
        assert_eq!(totals.total.files, 0);
        assert_eq!(totals.total.lines, LineTally::default());
        assert_eq!(totals.attempted, 2);
        assert_eq!(totals.skip_counts()["unrecognized"], 1);
        assert_eq!(totals.skip_counts()["binary"], 1);
    }
}
