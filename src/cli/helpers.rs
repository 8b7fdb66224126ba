//! Shared helper functions for CLI commands
//!
//! Opening the data file, pushing flag values through a form, and printing
//! one record in the chosen format.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::record::{FieldName, Record};
use crate::core::store::Store;
use crate::core::{Config, Workspace};
use crate::dialog::{RecordDialog, SaveStatus};

/// Load the config and open the data file for a command
pub fn open_workspace(global: &GlobalOpts) -> Result<(Config, Workspace)> {
    let config = Config::load();
    let workspace = Workspace::from_config(&config, global.file.as_deref())?;
    Ok((config, workspace))
}

/// Run each given flag value through the form
///
/// Every field is tried so all problems are reported at once.
pub fn apply_edits<R: Record>(
    dialog: &mut RecordDialog<R>,
    store: &Store,
    edits: &[(R::Field, Option<&str>)],
) -> Result<()> {
    let mut failures = Vec::new();
    for (field, value) in edits {
        let Some(value) = value else { continue };
        if let Some(result) = dialog.edit_field(store, *field, *value)? {
            if !result.valid {
                failures.push(format!("{}: {}", field.label(), result.msg));
            }
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    for failure in &failures {
        eprintln!("{} {}", style("✗").red(), failure);
    }
    Err(miette::miette!(
        "{} not saved: {} invalid field(s)",
        R::KIND,
        failures.len()
    ))
}

/// Save the form and turn a failed status into an error
pub fn save_dialog<R: Record>(
    dialog: &mut RecordDialog<R>,
    store: &Store,
    done: &str,
) -> Result<()> {
    match dialog.save(store, done) {
        SaveStatus::Success => Ok(()),
        SaveStatus::RecordInvalid => {
            dialog.record().ensure_valid()?;
            Err(miette::miette!("{} is not valid", R::KIND))
        }
        SaveStatus::StoreRejected => Err(miette::miette!(
            "could not save {}: {}",
            R::KIND,
            dialog.last_error().unwrap_or("the data file refused the write")
        )),
        SaveStatus::UnknownDoneMode => {
            Err(miette::miette!("internal error: unknown done mode '{}'", done))
        }
    }
}

#[derive(Serialize)]
struct Shown<'a, P: Serialize> {
    record_id: i64,
    #[serde(flatten)]
    properties: &'a P,
}

/// Print one record as JSON, YAML or labelled lines
pub fn print_record<R: Record>(record: &R, global: &GlobalOpts) -> Result<()> {
    let properties = record.properties();
    let shown = Shown {
        record_id: record.record_id(),
        properties: &properties,
    };

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&shown).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&shown).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", record.record_id()),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Record").bold(), style(record.record_id()).cyan());
            for field in R::Field::ALL {
                let value = record.display_value(*field);
                if value.is_empty() {
                    continue;
                }
                println!("{}: {}", style(field.label()).bold(), value);
            }
            println!("{}", style("─".repeat(60)).dim());
        }
    }
    Ok(())
}

/// Print any serializable value in a machine format
///
/// Returns false for the human formats so the caller prints its own view.
pub fn print_machine<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Money with two decimals
pub fn format_money(amount: f64) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(12.5), "12.50");
        assert_eq!(format_money(-3.0), "-3.00");
    }
}
