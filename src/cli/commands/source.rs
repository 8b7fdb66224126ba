//! `ptrack source` command - the list of vendors

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
use crate::entities::{Source, SourceField};

#[derive(Subcommand, Debug)]
pub enum SourceCommands {
    /// Add a vendor
    Add(AddArgs),

    /// List sources
    List,

    /// Delete a source
    Delete(NameArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Vendor name
    pub name: String,

    /// Remarks
    #[arg(long, short = 'r')]
    pub remarks: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NameArgs {
    /// Vendor name
    pub name: String,
}

/// Run a source subcommand
pub fn run(cmd: SourceCommands, global: &GlobalOpts) -> Result<()> {
    let (_config, workspace) = open_workspace(global)?;
    let store = workspace.store()?;

    match cmd {
        SourceCommands::Add(args) => {
            if Source::key_exists(store, &args.name)? {
                return Err(miette::miette!("source {} already exists", args.name));
            }
            let mut dialog = RecordDialog::<Source>::add();
            apply_edits(
                &mut dialog,
                store,
                &[
                    (SourceField::Source, Some(args.name.as_str())),
                    (SourceField::Remarks, args.remarks.as_deref()),
                ],
            )?;
            save_dialog(&mut dialog, store, "close")?;
            println!(
                "{} Added source {}",
                style("✓").green(),
                style(&args.name).cyan()
            );
        }
        SourceCommands::List => {
            let sources = RecordSet::<Source>::all(store)?;
            let rows: Vec<_> = sources.iter().map(|s| s.properties()).collect();
            if print_machine(&rows, global.format)? {
                return Ok(());
            }
            let mut table = Table::new("source", &["Source", "Remarks"]);
            for row in rows {
                table.push_row(vec![row.source, row.remarks]);
            }
            table.print(global.format);
        }
        SourceCommands::Delete(args) => {
            let mut dialog = RecordDialog::<Source>::open_key(store, &args.name)?;
            if dialog.mode() == DialogMode::AddElement {
                return Err(StoreError::NotFound {
                    kind: Source::KIND,
                    key: args.name,
                }
                .into());
            }
            dialog.delete(store)?;
            println!(
                "{} Deleted source {}",
                style("✓").green(),
                style(&args.name).cyan()
            );
        }
    }
    Ok(())
}
