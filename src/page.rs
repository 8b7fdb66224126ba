//! List views of the main window: assembly tree, parts table, orders table
//!
//! Each view is rebuilt from the store on demand. Derived columns are
//! computed here and never stored.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::record::Record;
use crate::core::record_set::{RangeEnd, RecordSet};
use crate::core::store::{Store, StoreError};
use crate::entities::{Item, Order, OrderLine, Part};

/// One line of the assembly tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeRow {
    pub record_id: i64,
    pub assembly: String,
    /// Indent level, 0 for a one-letter code
    pub depth: usize,
    pub part_number: String,
    pub description: String,
    pub quantity: i64,
    pub installed: bool,
}

/// One line of the parts table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartRow {
    pub record_id: i64,
    pub part_number: String,
    pub description: String,
    pub source: String,
    pub total_quantity: i64,
    pub installed_quantity: i64,
}

/// One line of the orders table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub record_id: i64,
    pub order_number: String,
    pub date: String,
    pub source: String,
    pub total: f64,
    pub line_count: usize,
}

fn descriptions(store: &Store) -> Result<HashMap<String, String>, StoreError> {
    Ok(RecordSet::<Part>::all(store)?
        .into_iter()
        .map(|p| (p.part_number().to_string(), p.description().to_string()))
        .collect())
}

/// Items ordered by assembly code, optionally only those under `prefix`
pub fn assembly_tree(store: &Store, prefix: &str) -> Result<Vec<TreeRow>, StoreError> {
    let prefix = prefix.trim().to_uppercase();
    let items = if prefix.is_empty() {
        RecordSet::<Item>::all(store)?
    } else {
        let high = format!("{}ZZZ", prefix);
        RecordSet::<Item>::range(store, "assembly", &prefix, &high, RangeEnd::Inclusive)?
    };
    let descriptions = descriptions(store)?;

    Ok(items
        .iter()
        .filter(|item| item.assembly().starts_with(prefix.as_str()))
        .map(|item| TreeRow {
            record_id: item.record_id(),
            assembly: item.assembly().to_string(),
            depth: item.depth(),
            part_number: item.part_number().to_string(),
            description: descriptions
                .get(item.part_number())
                .cloned()
                .unwrap_or_default(),
            quantity: item.quantity(),
            installed: item.installed(),
        })
        .collect())
}

/// Every part with its quantities in use
pub fn parts_table(store: &Store) -> Result<Vec<PartRow>, StoreError> {
    let mut totals: HashMap<String, (i64, i64)> = HashMap::new();
    for item in RecordSet::<Item>::all(store)? {
        let entry = totals.entry(item.part_number().to_string()).or_default();
        entry.0 += item.quantity();
        if item.installed() {
            entry.1 += item.quantity();
        }
    }

    Ok(RecordSet::<Part>::all(store)?
        .iter()
        .map(|part| {
            let (total, installed) = totals.get(part.part_number()).copied().unwrap_or_default();
            PartRow {
                record_id: part.record_id(),
                part_number: part.part_number().to_string(),
                description: part.description().to_string(),
                source: part.source().to_string(),
                total_quantity: total,
                installed_quantity: installed,
            }
        })
        .collect())
}

/// Every order by date with its number of lines
pub fn orders_table(store: &Store) -> Result<Vec<OrderRow>, StoreError> {
    let mut line_counts: HashMap<String, usize> = HashMap::new();
    for line in RecordSet::<OrderLine>::all(store)? {
        *line_counts.entry(line.order_number().to_string()).or_default() += 1;
    }

    Ok(RecordSet::<Order>::all(store)?
        .iter()
        .map(|order| OrderRow {
            record_id: order.record_id(),
            order_number: order.order_number().to_string(),
            date: order.date(),
            source: order.source().to_string(),
            total: order.total(),
            line_count: line_counts.get(order.order_number()).copied().unwrap_or(0),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(store: &Store) {
        let mut part = Part::new();
        part.set_part_number("C8AZ-1");
        part.set_description("Door handle");
        part.add(store).unwrap();

        let rows = [("A", 1i64, true), ("AB", 2, false), ("B", 3, true)];
        for (assembly, quantity, installed) in rows {
            let mut item = Item::new();
            item.set_part_number("C8AZ-1");
            item.set_assembly(assembly);
            item.set_quantity(quantity);
            item.set_installed(installed);
            item.add(store).unwrap();
        }
    }

    #[test]
    fn test_assembly_tree_depth_and_prefix() {
        let store = Store::in_memory().unwrap();
        seed(&store);

        let all = assembly_tree(&store, "").unwrap();
        let codes: Vec<(&str, usize)> =
            all.iter().map(|r| (r.assembly.as_str(), r.depth)).collect();
        assert_eq!(codes, vec![("A", 0), ("AB", 1), ("B", 0)]);
        assert_eq!(all[0].description, "Door handle");

        let under_a = assembly_tree(&store, "a").unwrap();
        assert_eq!(under_a.len(), 2);
    }

    #[test]
    fn test_parts_table_quantities() {
        let store = Store::in_memory().unwrap();
        seed(&store);

        let rows = parts_table(&store).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_quantity, 6);
        assert_eq!(rows[0].installed_quantity, 4);
    }

    #[test]
    fn test_orders_table_counts_lines() {
        let store = Store::in_memory().unwrap();
        let mut order = Order::new();
        order.set_order_number("PO-1");
        order.set_date("2006-08-22");
        order.add(&store).unwrap();

        for n in 1..=2i64 {
            let mut line = OrderLine::new();
            line.set_order_number("PO-1");
            line.set_line(n);
            line.set_part_number("C8AZ-1");
            line.add(&store).unwrap();
        }

        let rows = orders_table(&store).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "08/22/2006");
        assert_eq!(rows[0].line_count, 2);
    }
}
