//! `ptrack condition` command - the list of item conditions

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{apply_edits, open_workspace, print_machine, save_dialog};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::record::Record;
use crate::core::record_set::RecordSet;
use crate::core::store::StoreError;
use crate::dialog::{DialogMode, RecordDialog};
use crate::entities::{Condition, ConditionField};

#[derive(Subcommand, Debug)]
pub enum ConditionCommands {
    /// Add a condition
    Add(AddArgs),

    /// List conditions
    List,

    /// Delete a condition
    Delete(NameArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Condition name
    pub name: String,

    /// Remarks
    #[arg(long, short = 'r')]
    pub remarks: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NameArgs {
    /// Condition name
    pub name: String,
}

/// Run a condition subcommand
pub fn run(cmd: ConditionCommands, global: &GlobalOpts) -> Result<()> {
    let (_config, workspace) = open_workspace(global)?;
    let store = workspace.store()?;

    match cmd {
        ConditionCommands::Add(args) => {
            if Condition::key_exists(store, &args.name)? {
                return Err(miette::miette!("condition {} already exists", args.name));
            }
            let mut dialog = RecordDialog::<Condition>::add();
            apply_edits(
                &mut dialog,
                store,
                &[
                    (ConditionField::Condition, Some(args.name.as_str())),
                    (ConditionField::Remarks, args.remarks.as_deref()),
                ],
            )?;
            save_dialog(&mut dialog, store, "close")?;
            println!(
                "{} Added condition {}",
                style("✓").green(),
                style(&args.name).cyan()
            );
        }
        ConditionCommands::List => {
            let conditions = RecordSet::<Condition>::all(store)?;
            let rows: Vec<_> = conditions.iter().map(|c| c.properties()).collect();
            if print_machine(&rows, global.format)? {
                return Ok(());
            }
            let mut table = Table::new("condition", &["Condition", "Remarks"]);
            for row in rows {
                table.push_row(vec![row.condition, row.remarks]);
            }
            table.print(global.format);
        }
        ConditionCommands::Delete(args) => {
            let mut dialog = RecordDialog::<Condition>::open_key(store, &args.name)?;
            if dialog.mode() == DialogMode::AddElement {
                return Err(StoreError::NotFound {
                    kind: Condition::KIND,
                    key: args.name,
                }
                .into());
            }
            dialog.delete(store)?;
            println!(
                "{} Deleted condition {}",
                style("✓").green(),
                style(&args.name).cyan()
            );
        }
    }
    Ok(())
}
