//! `ptrack part` command - part catalogue

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    apply_edits, format_money, open_workspace, print_machine, print_record, save_dialog,
    truncate_str,
};
use crate::cli::interactive::edit_session;
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::bulk::change_part_number;
use crate::core::record::Record;
use crate::core::store::{Store, StoreError};
use crate::dialog::{DialogMode, RecordDialog};
use crate::entities::{Part, PartField};
use crate::page::parts_table;

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// Add a part to the catalogue
    New(NewArgs),

    /// Change a part's fields
    Edit(EditArgs),

    /// Show a part with where it is used and bought
    Show(KeyArgs),

    /// Delete a part
    Delete(KeyArgs),

    /// List parts with quantities in use
    List,

    /// Change a part number everywhere it is used
    Renumber(RenumberArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct PartFields {
    /// Description (required for a new part)
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Usual source (vendor)
    #[arg(long, short = 's')]
    pub source: Option<String>,

    /// Remarks
    #[arg(long, short = 'r')]
    pub remarks: Option<String>,
}

impl PartFields {
    fn edits(&self) -> Vec<(PartField, Option<&str>)> {
        vec![
            (PartField::Description, self.description.as_deref()),
            (PartField::Source, self.source.as_deref()),
            (PartField::Remarks, self.remarks.as_deref()),
        ]
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part number
    pub part_number: String,

    #[command(flatten)]
    pub fields: PartFields,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Part number
    pub part_number: String,

    /// Save under this number as a new part (use `renumber` to rename everywhere)
    #[arg(long)]
    pub number: Option<String>,

    #[command(flatten)]
    pub fields: PartFields,

    /// Edit in an interactive form
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    /// Part number
    pub part_number: String,
}

#[derive(clap::Args, Debug)]
pub struct RenumberArgs {
    /// Current part number
    pub old: String,

    /// New part number
    pub new: String,
}

/// Run a part subcommand
pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    let (_config, workspace) = open_workspace(global)?;
    let store = workspace.store()?;

    match cmd {
        PartCommands::New(args) => run_new(store, args),
        PartCommands::Edit(args) => run_edit(store, args),
        PartCommands::Show(args) => run_show(store, args, global),
        PartCommands::Delete(args) => run_delete(store, args),
        PartCommands::List => run_list(store, global),
        PartCommands::Renumber(args) => run_renumber(store, args),
    }
}

fn open_existing(store: &Store, part_number: &str) -> Result<RecordDialog<Part>> {
    let dialog = RecordDialog::<Part>::open_key(store, part_number)?;
    if dialog.mode() == DialogMode::AddElement {
        return Err(StoreError::NotFound {
            kind: Part::KIND,
            key: part_number.to_uppercase(),
        }
        .into());
    }
    Ok(dialog)
}

fn run_new(store: &Store, args: NewArgs) -> Result<()> {
    if Part::key_exists(store, &args.part_number)? {
        return Err(miette::miette!(
            "part {} already exists (use 'ptrack part edit')",
            args.part_number.to_uppercase()
        ));
    }

    let mut dialog = RecordDialog::<Part>::add();
    let mut edits = vec![(PartField::PartNumber, Some(args.part_number.as_str()))];
    edits.extend(args.fields.edits());
    apply_edits(&mut dialog, store, &edits)?;
    save_dialog(&mut dialog, store, "stay")?;

    println!(
        "{} Added part {}",
        style("✓").green(),
        style(dialog.record().part_number()).cyan()
    );
    Ok(())
}

fn run_edit(store: &Store, args: EditArgs) -> Result<()> {
    let mut dialog = open_existing(store, &args.part_number)?;
    if args.interactive {
        return edit_session(store, dialog);
    }

    let mut edits = vec![(PartField::PartNumber, args.number.as_deref())];
    edits.extend(args.fields.edits());
    apply_edits(&mut dialog, store, &edits)?;
    if !dialog.save_enabled() {
        println!("No changes made.");
        return Ok(());
    }

    let added = dialog.mode() == DialogMode::AddElement;
    save_dialog(&mut dialog, store, "stay")?;
    let verb = if added { "Added" } else { "Updated" };
    println!(
        "{} {} part {}",
        style("✓").green(),
        verb,
        style(dialog.record().part_number()).cyan()
    );
    Ok(())
}

fn run_show(store: &Store, args: KeyArgs, global: &GlobalOpts) -> Result<()> {
    let dialog = open_existing(store, &args.part_number)?;
    let part = dialog.record();
    print_record(part, global)?;
    if global.format != OutputFormat::Auto {
        return Ok(());
    }

    println!(
        "{}: {} ({} installed)",
        style("Total quantity").bold(),
        part.total_quantity(store)?,
        part.installed_quantity(store)?
    );

    let items = part.items(store)?;
    if !items.is_empty() {
        println!();
        println!("{} ({}):", style("Used at").bold(), items.len());
        for item in &items {
            println!(
                "  • {} x{} {}",
                style(item.assembly()).cyan(),
                item.quantity(),
                if item.installed() { "installed" } else { "" }
            );
        }
    }

    let lines = part.order_lines(store)?;
    if !lines.is_empty() {
        println!();
        println!("{} ({}):", style("Ordered on").bold(), lines.len());
        for line in &lines {
            println!(
                "  • {} line {}: {} @ {}",
                style(line.order_number()).cyan(),
                line.line(),
                line.quantity(),
                format_money(line.cost_each())
            );
        }
    }
    Ok(())
}

fn run_delete(store: &Store, args: KeyArgs) -> Result<()> {
    let mut dialog = open_existing(store, &args.part_number)?;
    let part_number = dialog.record().part_number().to_string();
    let in_use = dialog.record().items(store)?.len();

    dialog.delete(store)?;
    println!("{} Deleted part {}", style("✓").green(), style(&part_number).cyan());
    if in_use > 0 {
        println!(
            "{} {} item(s) still refer to {}",
            style("!").yellow(),
            in_use,
            part_number
        );
    }
    Ok(())
}

fn run_list(store: &Store, global: &GlobalOpts) -> Result<()> {
    let rows = parts_table(store)?;
    if print_machine(&rows, global.format)? {
        return Ok(());
    }

    let mut table = Table::new(
        "part",
        &["Part Number", "Description", "Source", "Qty", "Installed"],
    );
    for row in &rows {
        table.push_row(vec![
            row.part_number.clone(),
            truncate_str(&row.description, 40),
            row.source.clone(),
            row.total_quantity.to_string(),
            row.installed_quantity.to_string(),
        ]);
    }
    table.print(global.format);
    Ok(())
}

fn run_renumber(store: &Store, args: RenumberArgs) -> Result<()> {
    let outcome = change_part_number(store, &args.old, &args.new)?;

    if let Some(failure) = &outcome.failure {
        eprintln!(
            "{} Stopped after changing {} of {} record(s); earlier changes were kept",
            style("!").yellow(),
            outcome.changed,
            outcome.matched
        );
        return Err(miette::miette!(
            "{} {} could not be changed to {}: {}",
            failure.kind,
            failure.record_id,
            failure.target,
            failure.error
        ));
    }

    println!(
        "{} Changed {} to {} in {} record(s)",
        style("✓").green(),
        style(args.old.to_uppercase()).cyan(),
        style(args.new.to_uppercase()).cyan(),
        outcome.changed
    );
    Ok(())
}
