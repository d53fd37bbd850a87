//! Process command - extract, display, export, and persist card rows.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use bizcard_core::batch::{BatchAccumulator, UploadFile};
use bizcard_core::sink::{CardStore, report_file_name, write_csv};
use bizcard_core::{AzureCardAnalyzer, Batch, Row, SupabaseTable};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input files or glob patterns (jpg, jpeg, png, pdf)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write the CSV report to this file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Persist extracted rows to the remote table
    #[arg(long)]
    store: bool,

    /// Skip the row table and print only the summary
    #[arg(long)]
    quiet: bool,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files = collect_files(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching card files found (jpg, jpeg, png, pdf)");
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let analyzer = AzureCardAnalyzer::new(&config.azure)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut acc = BatchAccumulator::new();
    for file in &files {
        match acc.process_file(&analyzer, file) {
            Ok(rows) => pb.println(format!(
                "{} {} processed ({} rows)",
                style("✓").green(),
                file.name,
                rows
            )),
            Err(error) => pb.println(format!(
                "{} Failed to process {}: {}",
                style("✗").red(),
                file.name,
                error
            )),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    let batch = acc.finish();

    if !args.quiet && !batch.rows.is_empty() {
        println!();
        print_rows(&batch.rows);
    }

    print_summary(&batch);

    if let Some(output) = &args.output {
        let path = resolve_output_path(output);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, write_csv(&batch.rows)?)?;
        println!(
            "{} CSV report written to {}",
            style("✓").green(),
            path.display()
        );
    }

    if args.store {
        let store = SupabaseTable::new(&config.storage)?;
        let written = store.insert(&batch.rows)?;
        println!(
            "{} Stored {} rows in table '{}'",
            style("✓").green(),
            written,
            config.storage.table
        );
    }

    debug!("total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Expand input arguments (paths or glob patterns) into uploadable files,
/// keeping only the supported card formats.
fn collect_files(inputs: &[String]) -> anyhow::Result<Vec<UploadFile>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for input in inputs {
        let as_path = PathBuf::from(input);
        if as_path.is_file() {
            paths.push(as_path);
            continue;
        }
        for entry in glob(input)? {
            paths.push(entry?);
        }
    }

    let mut files = Vec::new();
    for path in paths {
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if !matches!(suffix.as_str(), "jpg" | "jpeg" | "png" | "pdf") {
            debug!(file = %path.display(), "skipping unsupported file type");
            continue;
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("card")
            .to_string();

        files.push(UploadFile {
            name,
            bytes: fs::read(&path)?,
            suffix,
        });
    }

    Ok(files)
}

/// Default the CSV name to the timestamped report convention when the
/// target is a directory.
fn resolve_output_path(output: &Path) -> PathBuf {
    if output.is_dir() {
        output.join(report_file_name(Utc::now()))
    } else {
        output.to_path_buf()
    }
}

fn print_rows(rows: &[Row]) {
    println!(
        "{:<6} {:<24} {:<16} {:<36} {:>10}  {}",
        "card", "file", "field", "value", "confidence", "extracted at"
    );
    for row in rows {
        println!(
            "{:<6} {:<24} {:<16} {:<36} {:>10.2}  {}",
            row.card_number,
            truncate(&row.file_name, 24),
            truncate(&row.field_name, 16),
            truncate(&row.value, 36),
            row.confidence,
            row.extracted_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

fn print_summary(batch: &Batch) {
    println!();
    println!(
        "   Total Files: {}   Cards Processed: {}   Success Rate: {}%",
        style(batch.summary.files_submitted).cyan(),
        style(batch.summary.cards_processed).green(),
        style(batch.summary.success_rate).cyan()
    );

    let failures: Vec<_> = batch.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in failures {
            println!(
                "  - {}: {}",
                outcome.file_name,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
