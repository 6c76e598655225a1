//! Command-line interface for durable-status.
//!
//! Reads status documents returned by an orchestration status query and
//! prints or validates them.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::{self, DisplaySettings};
use crate::domain::OrchestrationStatus;

/// durable-status - Inspect durable orchestration status documents
#[derive(Parser, Debug)]
#[command(name = "durable-status")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a status document
    Show {
        /// Status document (reads from stdin if not provided or "-")
        file: Option<PathBuf>,

        /// Print the execution history, if present
        #[arg(long)]
        history: bool,

        /// Maximum number of history events to print
        #[arg(long, env = "DURABLE_STATUS_HISTORY_LIMIT")]
        history_limit: Option<usize>,
    },

    /// Check that a status document parses
    Validate {
        /// Status document (reads from stdin if not provided or "-")
        file: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Show {
                file,
                history,
                history_limit,
            } => show_status(file.as_deref(), history, history_limit),
            Commands::Validate { file } => validate_status(file.as_deref()),
            Commands::Config => show_config(),
        }
    }
}

/// Read the document from a file, or stdin for `None` / `-`
fn read_document(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read status document: {}", path.display())),
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read status document from stdin")?;
            Ok(buffer)
        }
    }
}

fn load_status(file: Option<&Path>) -> Result<OrchestrationStatus> {
    let text = read_document(file)?;
    let source = file
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string());

    OrchestrationStatus::from_json(&text)
        .with_context(|| format!("Invalid status document: {}", source))
}

/// Show a status document
fn show_status(file: Option<&Path>, history: bool, history_limit: Option<usize>) -> Result<()> {
    let status = load_status(file)?;

    let mut settings = config::config()?.display.clone();
    if let Some(limit) = history_limit {
        settings.history_limit = limit;
    }

    let mut out = String::new();
    write_status(&mut out, &status, &settings, history)?;
    print!("{}", out);
    Ok(())
}

/// Check that a status document parses
fn validate_status(file: Option<&Path>) -> Result<()> {
    let status = load_status(file)?;
    println!("ok: {}", status.instance_id().unwrap_or("(no instance id)"));
    Ok(())
}

fn format_payload(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

/// Write a human-readable summary of a status record
fn write_status(
    out: &mut impl fmt::Write,
    status: &OrchestrationStatus,
    settings: &DisplaySettings,
    history: bool,
) -> fmt::Result {
    writeln!(out, "Instance ID: {}", status.instance_id().unwrap_or("-"))?;
    writeln!(out, "Name: {}", status.name().unwrap_or("-"))?;
    writeln!(
        out,
        "Status: {}",
        status
            .runtime_status()
            .map(|s| s.as_str())
            .unwrap_or("-")
    )?;
    writeln!(out, "Created: {}", status.created_time().to_rfc3339())?;
    writeln!(out, "Last updated: {}", status.last_updated_time().to_rfc3339())?;
    writeln!(out, "Input: {}", format_payload(status.input()))?;
    writeln!(out, "Output: {}", format_payload(status.output()))?;
    writeln!(out, "Custom status: {}", format_payload(status.custom_status()))?;

    if settings.show_extra && !status.extra_fields().is_empty() {
        writeln!(out, "\nExtra fields:")?;
        for (key, value) in status.extra_fields() {
            writeln!(out, "  {}: {}", key, value)?;
        }
    }

    if !history {
        return Ok(());
    }

    match status.history() {
        Some(events) => {
            writeln!(out, "\nHistory ({} events):", events.len())?;
            for (index, event) in events.iter().take(settings.history_limit).enumerate() {
                writeln!(out, "  {:>4}  {}", index, event)?;
            }
            if events.len() > settings.history_limit {
                writeln!(out, "  ... {} more", events.len() - settings.history_limit)?;
            }
        }
        None => writeln!(out, "\nHistory: (not included in document)")?,
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("durable-status configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Display:");
    println!("  History limit: {}", cfg.display.history_limit);
    println!("  Show extra:    {}", cfg.display.show_extra);

    Ok(())
}
