//! coolclean - Find large files and duplicate files, then reclaim the space.
//!
//! Usage:
//!   coolclean big [PATH]       List the largest files and folders
//!   coolclean dupes [PATH]     Find duplicate files
//!   coolclean --help           Show help

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use coolclean_session::{ScanSession, SessionSettings};

#[derive(Parser)]
#[command(
    name = "coolclean",
    version,
    about = "Find large files and duplicate files",
    long_about = "coolclean shows what takes up space under a folder and which files \
                  are stored more than once.\n\n\
                  Defaults come from settings.toml in the user config directory; \
                  flags override them for a single run."
)]
struct Cli {
    /// Include hidden files and folders
    #[arg(long, global = true)]
    hidden: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List files and folders at or above a size threshold
    Big {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Minimum size to report (e.g., "100MB", "1GB")
        #[arg(short, long)]
        min_size: Option<String>,

        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Delete the listed entries after showing them
        #[arg(long)]
        delete: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Find files with identical content
    Dupes {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Minimum file size to consider (e.g., "1KB", "1MB")
        #[arg(short, long)]
        min_size: Option<String>,

        /// Maximum number of groups to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Delete every copy but the first in each shown group
        #[arg(long)]
        delete: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = SessionSettings::load();
    if cli.hidden {
        settings.include_hidden = true;
    }
    debug!("Settings: {settings:?}");

    match cli.command {
        Command::Big {
            path,
            min_size,
            top,
            delete,
            format,
        } => {
            if let Some(min_size) = min_size {
                settings.large_file_min_size = parse_size(&min_size)?;
            }
            run_big(settings, &path, top, delete, format).await?;
        }
        Command::Dupes {
            path,
            min_size,
            top,
            delete,
            format,
        } => {
            if let Some(min_size) = min_size {
                settings.duplicate_min_size = parse_size(&min_size)?;
            }
            run_dupes(settings, &path, top, delete, format).await?;
        }
    }

    Ok(())
}

/// Scan for large entries and print them.
async fn run_big(
    settings: SessionSettings,
    path: &PathBuf,
    top_n: usize,
    delete: bool,
    format: OutputFormat,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let threshold = settings.large_file_min_size;

    eprintln!(
        "Scanning {} for entries of {} or more...",
        path.display(),
        format_size(threshold)
    );

    let mut session = ScanSession::new(settings);
    if !session.start_top_level_large_file_scan(&path) {
        bail!("No scans left");
    }
    session.wait_large_file_scan().await;

    let state = session.large_files();
    if let Some(err) = &state.last_error {
        bail!("Scan failed: {err}");
    }
    let shown: Vec<_> = state.files.iter().take(top_n).cloned().collect();

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Large Entries under {}", path.display());
            println!("{}", "─".repeat(70));
            println!();

            if shown.is_empty() {
                println!(" Nothing at or above {}.", format_size(threshold));
            } else {
                for file in &shown {
                    let marker = if file.is_dir { "/" } else { "" };
                    println!(
                        " {:>10}  {}{}",
                        format_size(file.size),
                        file.path.display(),
                        marker
                    );
                }
                println!();
                println!(
                    " {} entries, {} total",
                    state.files.len(),
                    format_size(state.total_size())
                );
            }

            if let Some(summary) = &state.summary {
                println!(
                    " Visited {} entries in {:.2}s",
                    summary.entries_visited,
                    summary.elapsed.as_secs_f64()
                );
                if summary.warnings > 0 {
                    println!(" {} warning(s) during scan", summary.warnings);
                }
            }
            println!();
        }
        OutputFormat::Json => {
            let report = serde_json::json!({
                "root": path,
                "min_size": threshold,
                "total_size": state.total_size(),
                "entries": shown,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if delete {
        let mut freed = 0;
        for file in &shown {
            if session.delete_entry(file.id).await {
                freed += file.size;
            } else if let Some(err) = &session.large_files().last_error {
                eprintln!("{err}");
            }
        }
        eprintln!("Freed {}", format_size(freed));
    }

    Ok(())
}

/// Scan for duplicate files and print the groups.
async fn run_dupes(
    settings: SessionSettings,
    path: &PathBuf,
    top_n: usize,
    delete: bool,
    format: OutputFormat,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;

    eprintln!(
        "Finding duplicates under {} (min size: {})...",
        path.display(),
        format_size(settings.duplicate_min_size)
    );

    let mut session = ScanSession::new(settings);
    if !session.start_top_level_duplicate_scan(&path) {
        bail!("No scans left");
    }
    session.wait_duplicate_scan().await;

    let state = session.duplicates();
    if let Some(err) = &state.last_error {
        bail!("Scan failed: {err}");
    }
    let shown: Vec<_> = state.groups.iter().take(top_n).cloned().collect();

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Duplicate File Report");
            println!("{}", "─".repeat(70));
            println!();

            if shown.is_empty() {
                println!(" No duplicate files found.");
            } else {
                println!(
                    " Found {} duplicate groups, {} reclaimable",
                    state.groups.len(),
                    format_size(session.total_savings())
                );
                println!();

                for (i, group) in shown.iter().enumerate() {
                    println!(
                        " Group {} ({} files, {} each, {} reclaimable)",
                        i + 1,
                        group.count(),
                        format_size(group.size),
                        format_size(group.potential_savings())
                    );
                    for file in &group.files {
                        println!("   {}", file.path.display());
                    }
                    println!();
                }
            }
        }
        OutputFormat::Json => {
            let report = serde_json::json!({
                "root": path,
                "summary": state.summary,
                "groups": shown,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if delete {
        let mut freed = 0;
        for group in &shown {
            let result = session.delete_all_duplicates_in_group(group.id, true).await;
            freed += result.bytes_freed;
            for err in &result.errors {
                eprintln!("{err}");
            }
        }
        eprintln!("Freed {}", format_size(freed));
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let digits = s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');

    let multiplier: u64 = match &s[digits.len()..] {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        "T" | "TB" => 1024 * 1024 * 1024 * 1024,
        unit => bail!("Unknown size unit: {unit}"),
    };
    let num: f64 = digits
        .parse()
        .with_context(|| format!("Invalid size: {s}"))?;

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size("1kb").unwrap(), 1024);
        assert_eq!(parse_size("1.5M").unwrap(), 1024 * 1024 * 3 / 2);
        assert_eq!(parse_size(" 2GB ").unwrap(), 2 * 1024 * 1024 * 1024);
        assert!(parse_size("10 parsecs").is_err());
        assert!(parse_size("MB").is_err());
    }
}
