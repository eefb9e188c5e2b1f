// src/engine.rs
//! File aggregation and the parallel scan loop.
//!
//! A walker thread feeds file paths into a bounded channel; rayon workers
//! classify files independently (one [`Classifier`] per file, no shared
//! state); results are folded into [`ScanTotals`] at a single serialized
//! merge point, so processing order never changes the totals.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use rayon::prelude::*;

use crate::classify::Classifier;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::language::Registry;
use crate::stats::{FileOutcome, ScanTotals, SkipReason};

/// How many bytes of the head of a file are sniffed for NUL bytes.
const BINARY_SNIFF_LEN: usize = 1024;

/// Walk the tree under `config.root` and tally every recognized file.
pub fn run(config: &Config, registry: &Registry) -> Result<ScanTotals> {
    if !config.root.exists() {
        return Err(AppError::PathNotFound(config.root.clone()));
    }

    let started = Instant::now();
    let (tx, rx) = crossbeam_channel::bounded::<PathBuf>(1024);

    let walk = build_walker(config);
    let exclude_files = config.exclude_files.clone();
    std::thread::spawn(move || {
        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    eprintln!("walk error: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if exclude_files.iter().any(|re| re.is_match(&name)) {
                continue;
            }
            // Receiver dropped means the run was abandoned; stop walking.
            if tx.send(entry.into_path()).is_err() {
                break;
            }
        }
    });

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .map_err(|e| AppError::ThreadPool(e.to_string()))?;

    let outcomes: Vec<(PathBuf, FileOutcome)> = pool.install(|| {
        rx.into_iter()
            .par_bridge()
            .map(|path| {
                let outcome = process_file(&path, registry, config);
                (path, outcome)
            })
            .collect()
    });

    let mut totals = fold_outcomes(outcomes, config)?;
    totals.elapsed = started.elapsed();
    Ok(totals)
}

/// Serialized merge point. Under `--strict` an unreadable file aborts the
/// run instead of becoming a skip.
fn fold_outcomes(outcomes: Vec<(PathBuf, FileOutcome)>, config: &Config) -> Result<ScanTotals> {
    let mut totals = ScanTotals::default();
    for (path, outcome) in outcomes {
        match outcome {
            FileOutcome::Skipped {
                reason: SkipReason::Unreadable(source),
            } if config.strict => {
                return Err(AppError::FileRead { path, source });
            }
            FileOutcome::Skipped { reason } => {
                if config.verbose {
                    eprintln!("skipped {}: {}", path.display(), reason);
                }
                totals.merge(path, FileOutcome::Skipped { reason });
            }
            counted => totals.merge(path, counted),
        }
    }
    Ok(totals)
}

fn build_walker(config: &Config) -> ignore::Walk {
    let mut builder = WalkBuilder::new(&config.root);
    builder
        .hidden(!config.hidden)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false);
    let exclude_dirs = config.exclude_dirs.clone();
    builder.filter_entry(move |entry| {
        if entry.file_type().is_some_and(|t| t.is_dir()) {
            let name = entry.file_name().to_string_lossy();
            !exclude_dirs.iter().any(|dir| dir == name.as_ref())
        } else {
            true
        }
    });
    builder.build()
}

/// Classify one file. Expected problems come back as `Skipped`; the run
/// never fails because of a single file.
pub fn process_file(path: &Path, registry: &Registry, config: &Config) -> FileOutcome {
    let skipped = |reason| FileOutcome::Skipped { reason };

    let Some(filename) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return skipped(SkipReason::Unrecognized);
    };
    let Some(def) = registry.resolve(&filename) else {
        return skipped(SkipReason::Unrecognized);
    };

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) => return skipped(SkipReason::Unreadable(err)),
    };
    if metadata.len() > config.max_file_size {
        return skipped(SkipReason::TooLarge(metadata.len()));
    }

    // Single read pass; a failure discards any partial work for this file.
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => return skipped(SkipReason::Unreadable(err)),
    };
    if bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0) {
        return skipped(SkipReason::Binary);
    }

    // Malformed sequences are repaired with replacement characters; the
    // classifier never sees a decode failure.
    let text = String::from_utf8_lossy(&bytes);
    let lines = Classifier::new(def).tally(text.lines());
    FileOutcome::Counted {
        language: def.name.clone(),
        lines,
    }
}
