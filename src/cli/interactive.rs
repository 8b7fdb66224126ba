//! Interactive form editing on the terminal
//!
//! Walks the fields of a [`RecordDialog`] with `dialoguer` prompts, offers
//! to save, and moves between records through the dialog's navigation so
//! unsaved edits are never dropped silently.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::core::record::{FieldName, Record};
use crate::core::store::Store;
use crate::dialog::{Navigation, Prompt, PromptAnswer, RecordDialog, SaveStatus};

/// Terminal implementation of the form prompts
pub struct TermPrompt {
    theme: ColorfulTheme,
}

impl TermPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TermPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TermPrompt {
    fn confirm_save(&mut self, message: &str) -> PromptAnswer {
        let selection = Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(&["Yes", "No", "Cancel"])
            .default(0)
            .interact_opt();
        match selection {
            Ok(Some(0)) => PromptAnswer::Yes,
            Ok(Some(1)) => PromptAnswer::No,
            _ => PromptAnswer::Cancel,
        }
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{} {}", style("!").yellow(), style(message).yellow());
    }
}

/// Edit records one after another until the user leaves
pub fn edit_session<R: Record>(store: &Store, mut dialog: RecordDialog<R>) -> Result<()> {
    let mut prompt = TermPrompt::new();

    loop {
        println!();
        println!("{}", style(dialog.title()).bold().cyan());
        edit_fields(store, &mut dialog, &prompt.theme)?;

        if dialog.save_enabled() {
            let save = Confirm::with_theme(&prompt.theme)
                .with_prompt(format!("Save {}?", R::KIND))
                .default(true)
                .interact()
                .into_diagnostic()?;
            if save {
                report_save(dialog.save(store, "stay"), &dialog);
            }
        }

        let next: String = Input::with_theme(&prompt.theme)
            .with_prompt(next_prompt::<R>())
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        let next = next.trim();
        if next.is_empty() {
            if dialog.save_enabled() {
                prompt.warn(&format!("Unsaved changes to this {} were dropped", R::KIND));
            }
            return Ok(());
        }

        match dialog.navigate(store, next, &mut prompt)? {
            Navigation::Cancelled => println!("{}", style("Staying on the current record").dim()),
            Navigation::SaveFailed(_) => {}
            Navigation::SavedAndLoaded => {
                println!("{} Saved {}", style("✓").green(), R::KIND)
            }
            Navigation::Loaded | Navigation::Discarded => {}
        }
    }
}

fn next_prompt<R: Record>() -> String {
    match R::KEY_FIELD {
        Some(field) => format!("Next {} (blank to finish)", field.label().to_lowercase()),
        None => format!("Next {} record id (blank to finish)", R::KIND),
    }
}

fn edit_fields<R: Record>(
    store: &Store,
    dialog: &mut RecordDialog<R>,
    theme: &ColorfulTheme,
) -> Result<()> {
    for field in R::Field::ALL {
        let current = dialog.widget(*field).text.clone();
        let value: String = Input::with_theme(theme)
            .with_prompt(field.label())
            .with_initial_text(current.clone())
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        if value == current {
            continue;
        }

        if let Some(result) = dialog.edit_field(store, *field, value.as_str())? {
            if !result.valid {
                let widget = dialog.widget(*field);
                eprintln!("{} {}", style("✗").red(), style(&widget.tooltip).yellow());
            }
        }
    }
    Ok(())
}

fn report_save<R: Record>(status: SaveStatus, dialog: &RecordDialog<R>) {
    match status {
        SaveStatus::Success => println!(
            "{} Saved {} {}",
            style("✓").green(),
            R::KIND,
            style(dialog.record().record_id()).cyan()
        ),
        SaveStatus::RecordInvalid => eprintln!(
            "{} {} not saved, fix: {}",
            style("✗").red(),
            R::KIND,
            dialog.record().invalid_fields().join(", ")
        ),
        SaveStatus::StoreRejected => eprintln!(
            "{} {} not saved: {}",
            style("✗").red(),
            R::KIND,
            dialog.last_error().unwrap_or("write refused")
        ),
        SaveStatus::UnknownDoneMode => {}
    }
}
