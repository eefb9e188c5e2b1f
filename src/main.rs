// src/main.rs
use anyhow::Result;
use clap::Parser;

use loccount::cli::Args;
use loccount::config::Config;
use loccount::language::Registry;
use loccount::{engine, report};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let registry = Registry::load(args.languages.as_deref())?;
    if args.list_languages {
        let mut names: Vec<&str> = registry.definitions().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        for name in names {
            println!("{name}");
        }
        return Ok(());
    }

    let config = Config::try_from(&args)?;
    let totals = engine::run(&config, &registry)?;
    report::emit(&totals, &config, &registry)?;
    Ok(())
}
