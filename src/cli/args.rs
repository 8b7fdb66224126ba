//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    asm::AsmCommands, completions::CompletionsArgs, condition::ConditionCommands,
    file::FileCommands, item::ItemCommands, order::OrderCommands, part::PartCommands,
    source::SourceCommands,
};

#[derive(Parser, Debug)]
#[command(name = "ptrack")]
#[command(author, version, about = "PartsTracker - automotive parts, assemblies and orders")]
#[command(long_about = "Catalogue parts, place them in an assembly tree and track the orders they were bought on, all in one local data file.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// More log output (repeat for more)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Data file to use instead of the current one
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, open and close data files
    #[command(subcommand)]
    File(FileCommands),

    /// Items: parts placed at assembly positions
    #[command(subcommand)]
    Item(ItemCommands),

    /// Assembly structure: rename codes, export lists
    #[command(subcommand)]
    Asm(AsmCommands),

    /// Part catalogue
    #[command(subcommand)]
    Part(PartCommands),

    /// Purchase orders and their lines
    #[command(subcommand)]
    Order(OrderCommands),

    /// Item condition list
    #[command(subcommand)]
    Condition(ConditionCommands),

    /// Vendor list
    #[command(subcommand)]
    Source(SourceCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tables for lists, labelled lines for single records
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just keys, one per line
    Id,
}
