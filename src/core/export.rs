//! Assembly list export to CSV

use std::fs::File;
use std::io;
use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::record::Record;
use crate::core::record_set::{RangeEnd, RecordSet};
use crate::core::store::{Store, StoreError};
use crate::entities::item::Item;

/// Fixed header row of the assembly list
pub const CSV_HEADER: [&str; 9] = [
    "Assembly",
    "Item",
    "Part Number",
    "Description",
    "Quantity",
    "Condition",
    "Installed",
    "Item Remarks",
    "Part Remarks",
];

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error("CSV error: {0}")]
    #[diagnostic(code(partstracker::export::csv))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Write items with `start <= assembly < stop` as CSV
///
/// An empty `stop` exports everything from `start` on. Returns the number
/// of data rows written.
pub fn export_assembly_list<W: io::Write>(
    store: &Store,
    start: &str,
    stop: &str,
    writer: W,
) -> Result<usize, ExportError> {
    let start = start.trim().to_uppercase();
    let stop = stop.trim().to_uppercase();
    let items = RecordSet::<Item>::range(store, "assembly", &start, &stop, RangeEnd::Exclusive)?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for item in &items {
        let part = item.part(store)?;
        csv.write_record([
            item.assembly().to_string(),
            item.record_id().to_string(),
            item.part_number().to_string(),
            part.description().to_string(),
            item.quantity().to_string(),
            item.condition().to_string(),
            if item.installed() { "X" } else { "" }.to_string(),
            item.remarks().to_string(),
            part.remarks().to_string(),
        ])?;
    }
    csv.flush()?;

    tracing::info!(%start, %stop, rows = items.len(), "exported assembly list");
    Ok(items.len())
}

/// [`export_assembly_list`] into a new file
pub fn export_assembly_list_to_path(
    store: &Store,
    start: &str,
    stop: &str,
    path: &Path,
) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    export_assembly_list(store, start, stop, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::part::Part;

    fn seed(store: &Store) {
        let mut part = Part::new();
        part.set_part_number("B7A-6051");
        part.set_description("Head gasket");
        part.set_remarks("Felpro");
        part.add(store).unwrap();

        for (assembly, installed) in [("A", true), ("B", false), ("C", false)] {
            let mut item = Item::new();
            item.set_part_number("B7A-6051");
            item.set_assembly(assembly);
            item.set_quantity(2i64);
            item.set_condition("New");
            item.set_installed(installed);
            item.set_remarks("driver side, left");
            item.add(store).unwrap();
        }
    }

    #[test]
    fn test_export_upper_bound_is_exclusive() {
        let store = Store::in_memory().unwrap();
        seed(&store);

        let mut out = Vec::new();
        let rows = export_assembly_list(&store, "A", "B", &mut out).unwrap();
        assert_eq!(rows, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Assembly,Item,Part Number,Description,Quantity,Condition,Installed,Item Remarks,Part Remarks"
        );
        assert_eq!(lines[1], "A,1,B7A-6051,Head gasket,2,New,X,\"driver side, left\",Felpro");
    }

    #[test]
    fn test_export_open_ended() {
        let store = Store::in_memory().unwrap();
        seed(&store);

        let mut out = Vec::new();
        assert_eq!(export_assembly_list(&store, "b", "", &mut out).unwrap(), 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text
            .lines()
            .any(|line| line.starts_with("B,2,B7A-6051,Head gasket,2,New,,")));
    }

    #[test]
    fn test_export_to_file() {
        let store = Store::in_memory().unwrap();
        seed(&store);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("assy.csv");

        assert_eq!(export_assembly_list_to_path(&store, "A", "D", &path).unwrap(), 3);
        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 9);
        assert_eq!(reader.records().count(), 3);
    }
}
