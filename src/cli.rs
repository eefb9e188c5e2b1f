// src/cli.rs
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
    Md,
}

#[derive(Parser, Debug)]
#[command(
    name = "loccount",
    version = crate::VERSION,
    about = "A fast, parallel tool for counting lines of source code"
)]
pub struct Args {
    /// Directory or file to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Comma-separated directory names to exclude
    #[arg(long, default_value = "node_modules,dist,build,venv,.git,__pycache__")]
    pub exclude: String,

    /// Comma-separated regex patterns for file names to exclude
    #[arg(long)]
    pub exclude_files: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "console")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Number of worker threads (defaults to available parallelism)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip files larger than this many bytes
    #[arg(long, default_value_t = 50 * 1024 * 1024)]
    pub max_file_size: u64,

    /// JSON file with extra language definitions
    #[arg(long)]
    pub languages: Option<PathBuf>,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Report each skipped file on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Fail the run on the first unreadable file
    #[arg(long)]
    pub strict: bool,

    /// List supported languages and exit
    #[arg(long)]
    pub list_languages: bool,
}
