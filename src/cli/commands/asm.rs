//! `ptrack asm` command - assembly structure operations

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::open_workspace;
use crate::cli::GlobalOpts;
use crate::core::bulk::rename_assembly;
use crate::core::export::{export_assembly_list, export_assembly_list_to_path};

#[derive(Subcommand, Debug)]
pub enum AsmCommands {
    /// Replace an assembly code prefix on every item under it
    Rename(RenameArgs),

    /// Write the items in an assembly range as CSV
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    /// Current assembly code
    pub old: String,

    /// New assembly code
    pub new: String,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// First assembly code to include
    pub start: String,

    /// Assembly code to stop before (omit for no upper bound)
    #[arg(default_value = "")]
    pub stop: String,

    /// Output file (default: stdout); a bare name goes to the export directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run an assembly subcommand
pub fn run(cmd: AsmCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AsmCommands::Rename(args) => run_rename(args, global),
        AsmCommands::Export(args) => run_export(args, global),
    }
}

fn run_rename(args: RenameArgs, global: &GlobalOpts) -> Result<()> {
    let (_config, workspace) = open_workspace(global)?;
    let store = workspace.store()?;

    let outcome = rename_assembly(store, &args.old, &args.new)?;
    if let Some(failure) = &outcome.failure {
        eprintln!(
            "{} Stopped after changing {} of {} item(s); earlier changes were kept",
            style("!").yellow(),
            outcome.changed,
            outcome.matched
        );
        return Err(miette::miette!(
            "item {} could not be moved to {}: {}",
            failure.record_id,
            failure.target,
            failure.error
        ));
    }

    if outcome.matched == 0 {
        println!("No items under {}.", args.old.to_uppercase());
        return Ok(());
    }
    println!(
        "{} Renamed {} to {} on {} item(s)",
        style("✓").green(),
        style(args.old.to_uppercase()).cyan(),
        style(args.new.to_uppercase()).cyan(),
        outcome.changed
    );
    Ok(())
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let (config, workspace) = open_workspace(global)?;
    let store = workspace.store()?;

    let Some(output) = args.output else {
        export_assembly_list(store, &args.start, &args.stop, std::io::stdout().lock())?;
        return Ok(());
    };

    let path = match (&config.export_dir, output.parent()) {
        (Some(dir), Some(parent)) if parent.as_os_str().is_empty() => dir.join(&output),
        _ => output,
    };
    let rows = export_assembly_list_to_path(store, &args.start, &args.stop, &path)?;
    println!(
        "{} Wrote {} item(s) to {}",
        style("✓").green(),
        rows,
        style(path.display()).cyan()
    );
    Ok(())
}
