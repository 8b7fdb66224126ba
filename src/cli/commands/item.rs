//! `ptrack item` command - parts placed in the assembly tree

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    apply_edits, open_workspace, print_machine, print_record, save_dialog, truncate_str,
};
use crate::cli::interactive::edit_session;
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::record::Record;
use crate::core::store::{Store, StoreError};
use crate::dialog::{DialogMode, RecordDialog};
use crate::entities::{Item, ItemField};
use crate::page::assembly_tree;

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Place a part at an assembly position
    New(NewArgs),

    /// Change an item's fields
    Edit(EditArgs),

    /// Show an item and its part
    Show(IdArgs),

    /// Delete an item
    Delete(IdArgs),

    /// Show the assembly tree
    Tree(TreeArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct ItemFields {
    /// Part number
    #[arg(long, short = 'p')]
    pub part: Option<String>,

    /// Assembly code (letters only)
    #[arg(long, short = 'a')]
    pub assembly: Option<String>,

    /// Quantity, 0 to 100
    #[arg(long, short = 'n')]
    pub quantity: Option<String>,

    /// Condition
    #[arg(long, short = 'c')]
    pub condition: Option<String>,

    /// Installed (yes/no)
    #[arg(long)]
    pub installed: Option<String>,

    /// Storage box number, 0 to 99
    #[arg(long = "box", short = 'b')]
    pub box_number: Option<String>,

    /// Remarks
    #[arg(long, short = 'r')]
    pub remarks: Option<String>,
}

impl ItemFields {
    fn edits(&self) -> Vec<(ItemField, Option<&str>)> {
        vec![
            (ItemField::PartNumber, self.part.as_deref()),
            (ItemField::Assembly, self.assembly.as_deref()),
            (ItemField::Quantity, self.quantity.as_deref()),
            (ItemField::Condition, self.condition.as_deref()),
            (ItemField::Installed, self.installed.as_deref()),
            (ItemField::Box, self.box_number.as_deref()),
            (ItemField::Remarks, self.remarks.as_deref()),
        ]
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: ItemFields,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Item record id
    pub id: i64,

    #[command(flatten)]
    pub fields: ItemFields,

    /// Edit in an interactive form
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Item record id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Only codes under this assembly
    #[arg(long, short = 'a')]
    pub assembly: Option<String>,
}

/// Run an item subcommand
pub fn run(cmd: ItemCommands, global: &GlobalOpts) -> Result<()> {
    let (_config, workspace) = open_workspace(global)?;
    let store = workspace.store()?;

    match cmd {
        ItemCommands::New(args) => run_new(store, args),
        ItemCommands::Edit(args) => run_edit(store, args),
        ItemCommands::Show(args) => run_show(store, args, global),
        ItemCommands::Delete(args) => run_delete(store, args),
        ItemCommands::Tree(args) => run_tree(store, args, global),
    }
}

fn open_existing(store: &Store, id: i64) -> Result<RecordDialog<Item>> {
    let dialog = RecordDialog::<Item>::open_key(store, &id.to_string())?;
    if dialog.mode() == DialogMode::AddElement {
        return Err(StoreError::NotFound {
            kind: Item::KIND,
            key: id.to_string(),
        }
        .into());
    }
    Ok(dialog)
}

fn run_new(store: &Store, args: NewArgs) -> Result<()> {
    let mut dialog = RecordDialog::<Item>::add();
    apply_edits(&mut dialog, store, &args.fields.edits())?;
    save_dialog(&mut dialog, store, "stay")?;

    let item = dialog.record();
    println!(
        "{} Added item {} ({} at {})",
        style("✓").green(),
        style(item.record_id()).cyan(),
        item.part_number(),
        style(item.assembly()).yellow()
    );
    if item.part(store)?.record_id() == 0 {
        println!(
            "{} part {} is not in the catalogue",
            style("!").yellow(),
            item.part_number()
        );
    }
    Ok(())
}

fn run_edit(store: &Store, args: EditArgs) -> Result<()> {
    let mut dialog = open_existing(store, args.id)?;
    if args.interactive {
        return edit_session(store, dialog);
    }

    apply_edits(&mut dialog, store, &args.fields.edits())?;
    if !dialog.save_enabled() {
        println!("No changes made.");
        return Ok(());
    }
    save_dialog(&mut dialog, store, "stay")?;
    println!(
        "{} Updated item {}",
        style("✓").green(),
        style(args.id).cyan()
    );
    Ok(())
}

fn run_show(store: &Store, args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let dialog = open_existing(store, args.id)?;
    let item = dialog.record();
    print_record(item, global)?;
    if global.format != OutputFormat::Auto {
        return Ok(());
    }

    let part = item.part(store)?;
    if part.record_id() == 0 {
        println!("{}", style("Part is not in the catalogue").yellow());
    } else {
        println!("{}: {}", style("Description").bold(), part.description());
        if !part.remarks().is_empty() {
            println!("{}: {}", style("Part remarks").bold(), part.remarks());
        }
    }
    Ok(())
}

fn run_delete(store: &Store, args: IdArgs) -> Result<()> {
    let mut dialog = open_existing(store, args.id)?;
    dialog.delete(store)?;
    println!("{} Deleted item {}", style("✓").green(), style(args.id).cyan());
    Ok(())
}

fn run_tree(store: &Store, args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let rows = assembly_tree(store, args.assembly.as_deref().unwrap_or(""))?;
    if print_machine(&rows, global.format)? {
        return Ok(());
    }

    if global.format == OutputFormat::Auto {
        if rows.is_empty() {
            println!("No items found.");
        }
        for row in &rows {
            println!(
                "{}{} {} {} x{}{}",
                "  ".repeat(row.depth),
                style(&row.assembly).cyan(),
                row.part_number,
                style(truncate_str(&row.description, 40)).dim(),
                row.quantity,
                if row.installed { " [installed]" } else { "" }
            );
        }
        return Ok(());
    }

    let mut table = Table::new(
        "item",
        &["Item", "Assembly", "Part Number", "Description", "Quantity", "Installed"],
    );
    for row in &rows {
        table.push_row(vec![
            row.record_id.to_string(),
            row.assembly.clone(),
            row.part_number.clone(),
            row.description.clone(),
            row.quantity.to_string(),
            if row.installed { "X" } else { "" }.to_string(),
        ]);
    }
    table.print(global.format);
    Ok(())
}
