//! Table formatting for CLI list commands
//!
//! One table type renders every list in the text formats. JSON and YAML
//! are handled by the callers, which serialize their row structs directly.

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::escape_csv;
use crate::cli::OutputFormat;

/// Headers and string cells of one list
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    /// Noun for the summary line, e.g. "part"
    noun: &'static str,
}

impl Table {
    pub fn new(noun: &'static str, headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
            noun,
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render for `format`; the first column is the id column
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Tsv => self.join_rows("\t", |s| s.replace(['\t', '\n'], " ")),
            OutputFormat::Csv => self.join_rows(",", escape_csv),
            OutputFormat::Id => self
                .rows
                .iter()
                .filter_map(|row| row.first())
                .map(|id| format!("{}\n", id))
                .collect(),
            OutputFormat::Md => self.build(true),
            _ => self.build(false),
        }
    }

    /// Print the table, with a summary line in the default format
    pub fn print(&self, format: OutputFormat) {
        if self.is_empty() && format == OutputFormat::Auto {
            println!("No {}s found.", self.noun);
            return;
        }
        print!("{}", self.render(format));
        if format == OutputFormat::Auto {
            println!(
                "{}",
                style(format!("{} {}(s) found", self.len(), self.noun)).dim()
            );
        }
    }

    fn build(&self, markdown: bool) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().map(|h| h.to_string()));
        for row in &self.rows {
            builder.push_record(row.clone());
        }
        let mut table = builder.build();
        if markdown {
            table.with(Style::markdown());
        } else {
            table.with(Style::sharp());
        }
        format!("{}\n", table)
    }

    fn join_rows(&self, sep: &str, cell: impl Fn(&str) -> String) -> String {
        let mut out = self.headers.join(sep);
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| cell(c)).collect();
            out.push_str(&cells.join(sep));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new("part", &["Part Number", "Description"]);
        table.push_row(vec!["A-1".into(), "Axle, rear".into()]);
        table.push_row(vec!["B-2".into(), "Bolt".into()]);
        table
    }

    #[test]
    fn test_csv_escapes_cells() {
        let out = sample().render(OutputFormat::Csv);
        assert_eq!(out, "Part Number,Description\nA-1,\"Axle, rear\"\nB-2,Bolt\n");
    }

    #[test]
    fn test_id_format_prints_first_column() {
        assert_eq!(sample().render(OutputFormat::Id), "A-1\nB-2\n");
    }

    #[test]
    fn test_markdown_has_header_row() {
        let out = sample().render(OutputFormat::Md);
        assert!(out.contains("| Part Number |"));
        assert!(out.contains("A-1"));
    }
}
