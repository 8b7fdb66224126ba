//! `ptrack file` command - data file management (the File menu)

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{open_workspace, print_machine};
use crate::cli::GlobalOpts;
use crate::core::record_set::RecordSet;
use crate::core::{Config, Workspace};
use crate::entities::{Condition, Item, Order, OrderLine, Part, Source};

#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Create a new data file and make it current
    New(PathArgs),

    /// Open an existing data file and make it current
    Open(PathArgs),

    /// Close the current data file
    Close,

    /// List recent files, or open recent file N
    Recent(RecentArgs),

    /// Show the current data file and its record counts
    Status,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Path of the data file
    pub path: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct RecentArgs {
    /// Position in the recent list, from 1
    pub n: Option<usize>,
}

/// Run a file subcommand
pub fn run(cmd: FileCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FileCommands::New(args) => run_new(args),
        FileCommands::Open(args) => run_open(args),
        FileCommands::Close => run_close(),
        FileCommands::Recent(args) => run_recent(args, global),
        FileCommands::Status => run_status(global),
    }
}

fn run_new(args: PathArgs) -> Result<()> {
    let mut config = Config::load();
    let mut workspace = Workspace::new();
    workspace.new_file(&mut config, &args.path)?;
    config.save()?;

    println!(
        "{} Created data file {}",
        style("✓").green(),
        style(display_path(&workspace)).cyan()
    );
    Ok(())
}

fn run_open(args: PathArgs) -> Result<()> {
    let mut config = Config::load();
    let mut workspace = Workspace::new();
    let opened = workspace.open_file(&mut config, &args.path);
    // A missing file is dropped from the recent list either way
    config.save()?;
    opened?;

    println!(
        "{} Opened {}",
        style("✓").green(),
        style(display_path(&workspace)).cyan()
    );
    Ok(())
}

fn run_close() -> Result<()> {
    let mut config = Config::load();
    let closed = config.current_file.clone();
    let mut workspace = Workspace::from_config(&config, None).unwrap_or_default();
    workspace.close(&mut config);
    config.save()?;

    match closed {
        Some(path) => println!("{} Closed {}", style("✓").green(), path.display()),
        None => println!("No data file was open."),
    }
    Ok(())
}

fn run_recent(args: RecentArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = Config::load();

    let Some(n) = args.n else {
        if print_machine(&config.recent_files, global.format)? {
            return Ok(());
        }
        if config.recent_files.is_empty() {
            println!("No recent files.");
        }
        for (i, path) in config.recent_files.iter().enumerate() {
            println!("{} {}", style(format!("{}.", i + 1)).dim(), path.display());
        }
        return Ok(());
    };

    let mut workspace = Workspace::new();
    let opened = workspace.open_recent(&mut config, n);
    config.save()?;
    opened?;

    println!(
        "{} Opened {}",
        style("✓").green(),
        style(display_path(&workspace)).cyan()
    );
    Ok(())
}

#[derive(Serialize)]
struct FileStatus {
    path: Option<PathBuf>,
    parts: usize,
    items: usize,
    orders: usize,
    order_lines: usize,
    conditions: usize,
    sources: usize,
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let (_config, workspace) = open_workspace(global)?;
    let store = workspace.store()?;

    let status = FileStatus {
        path: workspace.path(),
        parts: RecordSet::<Part>::all(store)?.len(),
        items: RecordSet::<Item>::all(store)?.len(),
        orders: RecordSet::<Order>::all(store)?.len(),
        order_lines: RecordSet::<OrderLine>::all(store)?.len(),
        conditions: RecordSet::<Condition>::all(store)?.len(),
        sources: RecordSet::<Source>::all(store)?.len(),
    };
    if print_machine(&status, global.format)? {
        return Ok(());
    }

    println!(
        "{}: {}",
        style("Data file").bold(),
        style(display_path(&workspace)).cyan()
    );
    for (label, count) in [
        ("Parts", status.parts),
        ("Items", status.items),
        ("Orders", status.orders),
        ("Order lines", status.order_lines),
        ("Conditions", status.conditions),
        ("Sources", status.sources),
    ] {
        println!("  {:<12} {}", label, count);
    }
    Ok(())
}

fn display_path(workspace: &Workspace) -> String {
    workspace
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}
