//! `ptrack order` command - purchase orders and their lines

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    apply_edits, format_money, open_workspace, print_machine, print_record, save_dialog,
};
use crate::cli::interactive::edit_session;
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::record::Record;
use crate::core::store::{Store, StoreError};
use crate::dialog::{DialogMode, RecordDialog};
use crate::entities::{Order, OrderField, OrderLine, OrderLineField};
use crate::page::orders_table;

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// Record a new purchase order
    New(NewArgs),

    /// Change an order's fields
    Edit(EditArgs),

    /// Show an order with its lines
    Show(KeyArgs),

    /// Delete an order
    Delete(DeleteArgs),

    /// List orders by date
    List,

    /// Order lines
    #[command(subcommand)]
    Line(LineCommands),
}

#[derive(clap::Args, Debug, Default)]
pub struct OrderFields {
    /// Order date (MM/DD/YYYY or YYYY-MM-DD; required for a new order)
    #[arg(long, short = 'd')]
    pub date: Option<String>,

    /// Vendor
    #[arg(long, short = 's')]
    pub source: Option<String>,

    #[arg(long)]
    pub subtotal: Option<String>,

    #[arg(long)]
    pub shipping: Option<String>,

    /// Discount, zero or negative
    #[arg(long, allow_hyphen_values = true)]
    pub discount: Option<String>,

    #[arg(long)]
    pub tax: Option<String>,

    #[arg(long)]
    pub total: Option<String>,

    /// Remarks
    #[arg(long, short = 'r')]
    pub remarks: Option<String>,
}

impl OrderFields {
    fn edits(&self) -> Vec<(OrderField, Option<&str>)> {
        vec![
            (OrderField::Date, self.date.as_deref()),
            (OrderField::Source, self.source.as_deref()),
            (OrderField::Subtotal, self.subtotal.as_deref()),
            (OrderField::Shipping, self.shipping.as_deref()),
            (OrderField::Discount, self.discount.as_deref()),
            (OrderField::Tax, self.tax.as_deref()),
            (OrderField::Total, self.total.as_deref()),
            (OrderField::Remarks, self.remarks.as_deref()),
        ]
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Order number
    pub order_number: String,

    #[command(flatten)]
    pub fields: OrderFields,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Order number
    pub order_number: String,

    #[command(flatten)]
    pub fields: OrderFields,

    /// Edit in an interactive form
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    /// Order number
    pub order_number: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Order number
    pub order_number: String,

    /// Also delete the order's lines
    #[arg(long)]
    pub lines: bool,
}

#[derive(Subcommand, Debug)]
pub enum LineCommands {
    /// Add a line to an order
    Add(LineAddArgs),

    /// Change a line's fields
    Edit(LineEditArgs),

    /// Delete a line
    Delete(LineIdArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct LineFields {
    /// Part number
    #[arg(long, short = 'p')]
    pub part: Option<String>,

    /// Unit price
    #[arg(long, short = 'c')]
    pub cost: Option<String>,

    /// Units bought
    #[arg(long, short = 'n')]
    pub quantity: Option<String>,

    /// Remarks
    #[arg(long, short = 'r')]
    pub remarks: Option<String>,
}

impl LineFields {
    fn edits(&self) -> Vec<(OrderLineField, Option<&str>)> {
        vec![
            (OrderLineField::PartNumber, self.part.as_deref()),
            (OrderLineField::CostEach, self.cost.as_deref()),
            (OrderLineField::Quantity, self.quantity.as_deref()),
            (OrderLineField::Remarks, self.remarks.as_deref()),
        ]
    }
}

#[derive(clap::Args, Debug)]
pub struct LineAddArgs {
    /// Order number
    pub order_number: String,

    /// Line number (default: next free one)
    #[arg(long, short = 'l')]
    pub line: Option<String>,

    #[command(flatten)]
    pub fields: LineFields,
}

#[derive(clap::Args, Debug)]
pub struct LineEditArgs {
    /// Order line record id
    pub id: i64,

    /// Line number
    #[arg(long, short = 'l')]
    pub line: Option<String>,

    #[command(flatten)]
    pub fields: LineFields,
}

#[derive(clap::Args, Debug)]
pub struct LineIdArgs {
    /// Order line record id
    pub id: i64,
}

/// Run an order subcommand
pub fn run(cmd: OrderCommands, global: &GlobalOpts) -> Result<()> {
    let (_config, workspace) = open_workspace(global)?;
    let store = workspace.store()?;

    match cmd {
        OrderCommands::New(args) => run_new(store, args),
        OrderCommands::Edit(args) => run_edit(store, args),
        OrderCommands::Show(args) => run_show(store, args, global),
        OrderCommands::Delete(args) => run_delete(store, args),
        OrderCommands::List => run_list(store, global),
        OrderCommands::Line(cmd) => match cmd {
            LineCommands::Add(args) => run_line_add(store, args),
            LineCommands::Edit(args) => run_line_edit(store, args),
            LineCommands::Delete(args) => run_line_delete(store, args),
        },
    }
}

fn open_existing(store: &Store, order_number: &str) -> Result<RecordDialog<Order>> {
    let dialog = RecordDialog::<Order>::open_key(store, order_number)?;
    if dialog.mode() == DialogMode::AddElement {
        return Err(StoreError::NotFound {
            kind: Order::KIND,
            key: order_number.to_string(),
        }
        .into());
    }
    Ok(dialog)
}

fn open_line(store: &Store, id: i64) -> Result<RecordDialog<OrderLine>> {
    let dialog = RecordDialog::<OrderLine>::open_key(store, &id.to_string())?;
    if dialog.mode() == DialogMode::AddElement {
        return Err(StoreError::NotFound {
            kind: OrderLine::KIND,
            key: id.to_string(),
        }
        .into());
    }
    Ok(dialog)
}

fn run_new(store: &Store, args: NewArgs) -> Result<()> {
    if Order::key_exists(store, &args.order_number)? {
        return Err(miette::miette!(
            "order {} already exists (use 'ptrack order edit')",
            args.order_number
        ));
    }

    let mut dialog = RecordDialog::<Order>::add();
    let mut edits = vec![(OrderField::OrderNumber, Some(args.order_number.as_str()))];
    edits.extend(args.fields.edits());
    apply_edits(&mut dialog, store, &edits)?;
    save_dialog(&mut dialog, store, "stay")?;

    println!(
        "{} Added order {} dated {}",
        style("✓").green(),
        style(dialog.record().order_number()).cyan(),
        dialog.record().date()
    );
    Ok(())
}

fn run_edit(store: &Store, args: EditArgs) -> Result<()> {
    let mut dialog = open_existing(store, &args.order_number)?;
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
        "{} Updated order {}",
        style("✓").green(),
        style(dialog.record().order_number()).cyan()
    );
    Ok(())
}

fn run_show(store: &Store, args: KeyArgs, global: &GlobalOpts) -> Result<()> {
    let dialog = open_existing(store, &args.order_number)?;
    let order = dialog.record();
    print_record(order, global)?;
    if global.format != OutputFormat::Auto {
        return Ok(());
    }

    let lines = order.lines(store)?;
    if lines.is_empty() {
        println!("No lines.");
        return Ok(());
    }

    let mut table = Table::new(
        "line",
        &["Id", "Line", "Part Number", "Cost Each", "Quantity", "Line Cost"],
    );
    for line in &lines {
        table.push_row(vec![
            line.record_id().to_string(),
            line.line().to_string(),
            line.part_number().to_string(),
            format_money(line.cost_each()),
            line.quantity().to_string(),
            format_money(line.line_cost()),
        ]);
    }
    println!();
    print!("{}", table.render(OutputFormat::Auto));

    let lines_subtotal = order.lines_subtotal(store)?;
    println!("{}: {}", style("Lines subtotal").bold(), format_money(lines_subtotal));
    if (lines_subtotal - order.subtotal()).abs() > 0.005 {
        println!(
            "{} order subtotal {} differs from its lines",
            style("!").yellow(),
            format_money(order.subtotal())
        );
    }
    if (order.computed_total() - order.total()).abs() > 0.005 {
        println!(
            "{} order total {} differs from subtotal + shipping + discount + tax = {}",
            style("!").yellow(),
            format_money(order.total()),
            format_money(order.computed_total())
        );
    }
    Ok(())
}

fn run_delete(store: &Store, args: DeleteArgs) -> Result<()> {
    let mut dialog = open_existing(store, &args.order_number)?;
    let order_number = dialog.record().order_number().to_string();
    let lines = dialog.record().lines(store)?;

    if !lines.is_empty() && !args.lines {
        return Err(miette::miette!(
            "order {} has {} line(s); pass --lines to delete them too",
            order_number,
            lines.len()
        ));
    }
    for line in &lines {
        line.delete(store)?;
    }
    dialog.delete(store)?;

    println!(
        "{} Deleted order {}",
        style("✓").green(),
        style(&order_number).cyan()
    );
    Ok(())
}

fn run_list(store: &Store, global: &GlobalOpts) -> Result<()> {
    let rows = orders_table(store)?;
    if print_machine(&rows, global.format)? {
        return Ok(());
    }

    let mut table = Table::new("order", &["Order Number", "Date", "Source", "Total", "Lines"]);
    for row in &rows {
        table.push_row(vec![
            row.order_number.clone(),
            row.date.clone(),
            row.source.clone(),
            format_money(row.total),
            row.line_count.to_string(),
        ]);
    }
    table.print(global.format);
    Ok(())
}

fn run_line_add(store: &Store, args: LineAddArgs) -> Result<()> {
    let order = open_existing(store, &args.order_number)?;
    let order = order.record();
    let next = order.next_line_number(store)?.to_string();

    let mut dialog = RecordDialog::<OrderLine>::add();
    let mut edits = vec![
        (OrderLineField::OrderNumber, Some(order.order_number())),
        (
            OrderLineField::Line,
            Some(args.line.as_deref().unwrap_or(next.as_str())),
        ),
    ];
    edits.extend(args.fields.edits());
    apply_edits(&mut dialog, store, &edits)?;
    save_dialog(&mut dialog, store, "stay")?;

    let line = dialog.record();
    println!(
        "{} Added line {} to order {} (id {})",
        style("✓").green(),
        line.line(),
        style(line.order_number()).cyan(),
        line.record_id()
    );
    Ok(())
}

fn run_line_edit(store: &Store, args: LineEditArgs) -> Result<()> {
    let mut dialog = open_line(store, args.id)?;
    let mut edits = vec![(OrderLineField::Line, args.line.as_deref())];
    edits.extend(args.fields.edits());
    apply_edits(&mut dialog, store, &edits)?;
    if !dialog.save_enabled() {
        println!("No changes made.");
        return Ok(());
    }
    save_dialog(&mut dialog, store, "stay")?;
    println!(
        "{} Updated order line {}",
        style("✓").green(),
        style(args.id).cyan()
    );
    Ok(())
}

fn run_line_delete(store: &Store, args: LineIdArgs) -> Result<()> {
    let mut dialog = open_line(store, args.id)?;
    dialog.delete(store)?;
    println!(
        "{} Deleted order line {}",
        style("✓").green(),
        style(args.id).cyan()
    );
    Ok(())
}
