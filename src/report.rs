// src/report.rs
//! Report sink: renders the final totals. Consumes [`ScanTotals`] plus the
//! registry (to mark languages where comment counts are not meaningful)
//! and never mutates either.

use std::io::Write;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::language::Registry;
use crate::stats::{LanguageTally, ScanTotals};

pub fn emit(totals: &ScanTotals, config: &Config, registry: &Registry) -> Result<()> {
    let mut writer = OutputWriter::create(config)?;
    match config.format {
        OutputFormat::Console => write_console(totals, registry, &mut writer)?,
        OutputFormat::Json => write_json(totals, &mut writer)?,
        OutputFormat::Md => write_markdown(totals, registry, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

struct OutputWriter(Box<dyn Write>);

impl OutputWriter {
    fn create(config: &Config) -> Result<Self> {
        let writer: Box<dyn Write> = if let Some(path) = &config.output {
            Box::new(std::io::BufWriter::new(std::fs::File::create(path)?))
        } else {
            Box::new(std::io::BufWriter::new(std::io::stdout()))
        };
        Ok(Self(writer))
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

/// Languages sorted by code lines descending, name as tie-break.
fn sorted_rows(totals: &ScanTotals) -> Vec<(&str, &LanguageTally)> {
    let mut rows: Vec<_> = totals
        .languages
        .iter()
        .map(|(name, tally)| (name.as_str(), tally))
        .collect();
    rows.sort_by(|a, b| b.1.lines.code.cmp(&a.1.lines.code).then(a.0.cmp(b.0)));
    rows
}

fn comment_cell(name: &str, tally: &LanguageTally, registry: &Registry) -> String {
    let nocode = registry.definitions().any(|def| def.name == name && def.nocode);
    if nocode {
        "-".to_string()
    } else {
        group_digits(tally.lines.comment)
    }
}

fn code_share(tally: &LanguageTally, totals: &ScanTotals) -> f64 {
    if totals.total.lines.code == 0 {
        0.0
    } else {
        tally.lines.code as f64 * 100.0 / totals.total.lines.code as f64
    }
}

fn write_console(totals: &ScanTotals, registry: &Registry, out: &mut impl Write) -> Result<()> {
    let name_width = sorted_rows(totals)
        .iter()
        .map(|(name, _)| name.len())
        .chain(["Language".len()])
        .max()
        .unwrap_or(8);

    writeln!(out)?;
    writeln!(
        out,
        "{:<name_width$}  {:>8}  {:>10}  {:>10}  {:>10}  {:>7}",
        "Language", "Files", "Code", "Comment", "Blank", "%"
    )?;
    writeln!(out, "{}", "-".repeat(name_width + 54))?;

    for (name, tally) in sorted_rows(totals) {
        writeln!(
            out,
            "{:<name_width$}  {:>8}  {:>10}  {:>10}  {:>10}  {:>7.2}",
            name,
            group_digits(tally.files),
            group_digits(tally.lines.code),
            comment_cell(name, tally, registry),
            group_digits(tally.lines.blank),
            code_share(tally, totals),
        )?;
    }

    writeln!(out, "{}", "-".repeat(name_width + 54))?;
    writeln!(
        out,
        "{:<name_width$}  {:>8}  {:>10}  {:>10}  {:>10}  {:>7.2}",
        "Total",
        group_digits(totals.total.files),
        group_digits(totals.total.lines.code),
        group_digits(totals.total.lines.comment),
        group_digits(totals.total.lines.blank),
        if totals.total.lines.code == 0 { 0.0 } else { 100.0 },
    )?;

    writeln!(out)?;
    writeln!(out, "{}", summary_line(totals))?;
    Ok(())
}

fn write_markdown(totals: &ScanTotals, registry: &Registry, out: &mut impl Write) -> Result<()> {
    writeln!(out, "# Line Count Report")?;
    writeln!(out)?;
    writeln!(out, "| Language | Files | Code | Comment | Blank | % |")?;
    writeln!(out, "| --- | ---: | ---: | ---: | ---: | ---: |")?;
    for (name, tally) in sorted_rows(totals) {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.2} |",
            name,
            group_digits(tally.files),
            group_digits(tally.lines.code),
            comment_cell(name, tally, registry),
            group_digits(tally.lines.blank),
            code_share(tally, totals),
        )?;
    }
    writeln!(
        out,
        "| **Total** | **{}** | **{}** | **{}** | **{}** | |",
        group_digits(totals.total.files),
        group_digits(totals.total.lines.code),
        group_digits(totals.total.lines.comment),
        group_digits(totals.total.lines.blank),
    )?;
    writeln!(out)?;
    writeln!(out, "{}", summary_line(totals))?;
    Ok(())
}

fn write_json(totals: &ScanTotals, out: &mut impl Write) -> Result<()> {
    let elapsed = totals.elapsed.as_secs_f64();
    let total_lines = totals.total.lines.total();
    let rate = |n: u64| if elapsed > 0.0 { n as f64 / elapsed } else { 0.0 };

    let mut languages = serde_json::Map::new();
    for (name, tally) in &totals.languages {
        languages.insert(name.clone(), tally_json(tally));
    }

    let skipped: serde_json::Map<String, serde_json::Value> = totals
        .skip_counts()
        .into_iter()
        .map(|(label, count)| (label.to_string(), count.into()))
        .collect();

    let report = serde_json::json!({
        "languages": languages,
        "total": tally_json(&totals.total),
        "meta": {
            "generated_at": chrono::Local::now().to_rfc3339(),
            "elapsed_seconds": elapsed,
            "files_per_second": rate(totals.attempted),
            "lines_per_second": rate(total_lines),
            "files_attempted": totals.attempted,
            "files_skipped": totals.skipped.len(),
            "skipped": skipped,
        },
    });
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn tally_json(tally: &LanguageTally) -> serde_json::Value {
    serde_json::json!({
        "files": tally.files,
        "code": tally.lines.code,
        "comment": tally.lines.comment,
        "blank": tally.lines.blank,
        "total": tally.lines.total(),
    })
}

fn summary_line(totals: &ScanTotals) -> String {
    let skips = totals.skip_counts();
    let mut line = format!(
        "{} files scanned in {}",
        group_digits(totals.total.files),
        format_elapsed(totals.elapsed.as_secs_f64()),
    );
    if totals.elapsed.as_secs_f64() > 0.0 {
        let lines = totals.total.lines.total() as f64 / totals.elapsed.as_secs_f64();
        line.push_str(&format!(" ({lines:.0} lines/s)"));
    }
    if !skips.is_empty() {
        let detail: Vec<String> = skips
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect();
        line.push_str(&format!(
            "; {} skipped ({})",
            totals.skipped.len(),
            detail.join(", ")
        ));
    }
    line
}

/// Thousands separators, e.g. 1234567 -> "1,234,567".
fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn format_elapsed(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.2} ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{seconds:.2} s")
    } else {
        let minutes = (seconds / 60.0).floor() as u64;
        format!("{} m {:.2} s", minutes, seconds % 60.0)
    }
}
