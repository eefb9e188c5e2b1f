// src/config.rs
use std::path::PathBuf;

use regex::Regex;

use crate::cli::{Args, OutputFormat};
use crate::error::{AppError, Result};

/// Run configuration derived from CLI arguments.
#[derive(Debug)]
pub struct Config {
    pub root: PathBuf,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<Regex>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub jobs: usize,
    pub max_file_size: u64,
    pub hidden: bool,
    pub verbose: bool,
    pub strict: bool,
}

impl TryFrom<&Args> for Config {
    type Error = AppError;

    fn try_from(args: &Args) -> Result<Self> {
        let exclude_dirs = split_list(&args.exclude);
        let exclude_files = args
            .exclude_files
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
            .into_iter()
            .map(|pattern| {
                // Patterns match from the start of the file name, not
                // anywhere inside it.
                Regex::new(&format!("^(?:{pattern})")).map_err(|e| AppError::InvalidPattern {
                    pattern,
                    details: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: args.path.clone(),
            exclude_dirs,
            exclude_files,
            format: args.format,
            output: args.output.clone(),
            jobs: args.jobs.unwrap_or_else(num_cpus::get).max(1),
            max_file_size: args.max_file_size,
            hidden: args.hidden,
            verbose: args.verbose,
            strict: args.strict,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> Config {
        let args = Args::parse_from(argv);
        Config::try_from(&args).unwrap()
    }

    #[test]
    fn defaults_cover_common_junk_directories() {
        let config = parse(&["loccount"]);
        assert!(config.exclude_dirs.iter().any(|d| d == "node_modules"));
        assert!(config.exclude_dirs.iter().any(|d| d == ".git"));
        assert!(config.exclude_files.is_empty());
        assert!(config.jobs >= 1);
    }

    #[test]
    fn exclude_list_is_trimmed_and_split() {
        let config = parse(&["loccount", "--exclude", "target, out ,,cache"]);
        assert_eq!(config.exclude_dirs, ["target", "out", "cache"]);
    }

    #[test]
    fn exclude_file_patterns_are_compiled() {
        let config = parse(&["loccount", "--exclude-files", r".*_gen\.rs,min\..*"]);
        assert_eq!(config.exclude_files.len(), 2);
        assert!(config.exclude_files[0].is_match("types_gen.rs"));
        assert!(!config.exclude_files[0].is_match("types.rs"));
    }

    #[test]
    fn exclude_patterns_anchor_at_the_name_start() {
        let config = parse(&["loccount", "--exclude-files", "test"]);
        assert!(config.exclude_files[0].is_match("test_helpers.rs"));
        assert!(!config.exclude_files[0].is_match("contest.rs"));
    }

    #[test]
    fn invalid_exclude_pattern_is_rejected() {
        let args = Args::parse_from(["loccount", "--exclude-files", "["]);
        let err = Config::try_from(&args).unwrap_err();
        assert!(matches!(err, AppError::InvalidPattern { .. }));
    }
}
