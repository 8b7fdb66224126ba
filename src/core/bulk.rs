//! Dataset-wide renames
//!
//! Both operations scan a record set and rewrite one field per record with a
//! separate `update()` each. The scan stops at the first failed update and
//! nothing already written is undone, so a partial rename is a possible end
//! state. The outcome says how far it got.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::record::Record;
use crate::core::record_set::{RangeEnd, RecordSet};
use crate::core::store::{Store, StoreError};
use crate::core::validate::{FieldValue, Validation};
use crate::entities::item::{validate_assembly, Item};
use crate::entities::order_line::OrderLine;
use crate::entities::part::{validate_part_number, Part};

/// Suffix appended to a prefix to form the top of the scan range
const RANGE_SUFFIX: &str = "ZZZ";

/// Reasons a bulk operation does not start
#[derive(Debug, Error, Diagnostic)]
pub enum BulkError {
    #[error("{label}: {msg}")]
    #[diagnostic(code(partstracker::bulk::invalid_input))]
    InvalidInput { label: &'static str, msg: String },

    #[error("old and new values are both '{0}'")]
    #[diagnostic(code(partstracker::bulk::unchanged))]
    Unchanged(String),

    #[error("part {0} already exists")]
    #[diagnostic(
        code(partstracker::bulk::part_exists),
        help("pick a part number that is not in the catalogue")
    )]
    PartExists(String),

    #[error("part {0} not found")]
    #[diagnostic(code(partstracker::bulk::part_missing))]
    PartMissing(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// The record at which a bulk operation stopped
#[derive(Debug)]
pub struct BulkFailure {
    pub kind: &'static str,
    pub record_id: i64,
    /// What the record was being changed to
    pub target: String,
    pub error: StoreError,
}

/// How far a bulk operation got
#[derive(Debug, Default)]
pub struct BulkOutcome {
    /// Records selected for rewriting
    pub matched: usize,
    /// Records rewritten before any stop
    pub changed: usize,
    pub failure: Option<BulkFailure>,
}

impl BulkOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    fn fail<R: Record>(&mut self, record: &R, target: String, error: StoreError) {
        tracing::warn!(
            kind = R::KIND,
            record_id = record.record_id(),
            changed = self.changed,
            %error,
            "bulk update stopped"
        );
        self.failure = Some(BulkFailure {
            kind: R::KIND,
            record_id: record.record_id(),
            target,
            error,
        });
    }
}

fn accepted(result: Validation, label: &'static str) -> Result<String, BulkError> {
    if result.valid {
        Ok(result.text_or_default())
    } else {
        Err(BulkError::InvalidInput {
            label,
            msg: result.msg,
        })
    }
}

/// Replace an assembly code prefix on every item under it
///
/// `"B" -> "P"` turns `B`, `BA`, `BAA` into `P`, `PA`, `PAA`.
pub fn rename_assembly(store: &Store, old: &str, new: &str) -> Result<BulkOutcome, BulkError> {
    let old = accepted(validate_assembly(FieldValue::from(old)), "Old assembly")?;
    let new = accepted(validate_assembly(FieldValue::from(new)), "New assembly")?;
    if old == new {
        return Err(BulkError::Unchanged(old));
    }

    let high = format!("{}{}", old, RANGE_SUFFIX);
    let items = RecordSet::<Item>::range(store, "assembly", &old, &high, RangeEnd::Inclusive)?;
    let mut outcome = BulkOutcome::default();

    for mut item in items
        .into_iter()
        .filter(|item| item.assembly().starts_with(old.as_str()))
    {
        outcome.matched += 1;
        if outcome.failure.is_some() {
            continue;
        }

        let target = format!("{}{}", new, &item.assembly()[old.len()..]);
        item.set_assembly(target.as_str());
        match item.update(store) {
            Ok(()) => outcome.changed += 1,
            Err(error) => outcome.fail(&item, target, error),
        }
    }

    tracing::info!(
        %old,
        %new,
        matched = outcome.matched,
        changed = outcome.changed,
        "renamed assembly"
    );
    Ok(outcome)
}

/// Renumber a part and every item and order line that uses it
pub fn change_part_number(store: &Store, old: &str, new: &str) -> Result<BulkOutcome, BulkError> {
    let old = accepted(validate_part_number(FieldValue::from(old)), "Old part number")?;
    let new = accepted(validate_part_number(FieldValue::from(new)), "New part number")?;
    if old == new {
        return Err(BulkError::Unchanged(old));
    }
    if Part::key_exists(store, &new)? {
        return Err(BulkError::PartExists(new));
    }
    let mut part = Part::fetch_by_key(store, &old)?;
    if part.record_id() == 0 {
        return Err(BulkError::PartMissing(old));
    }

    let high = format!("{}{}", old, RANGE_SUFFIX);
    let items = RecordSet::<Item>::range(store, "part_number", &old, &high, RangeEnd::Inclusive)?;
    let lines =
        RecordSet::<OrderLine>::range(store, "part_number", &old, &high, RangeEnd::Inclusive)?;

    let items: Vec<Item> = items
        .into_iter()
        .filter(|item| item.part_number() == old)
        .collect();
    let lines: Vec<OrderLine> = lines
        .into_iter()
        .filter(|line| line.part_number() == old)
        .collect();

    let mut outcome = BulkOutcome {
        matched: 1 + items.len() + lines.len(),
        ..Default::default()
    };

    part.set_part_number(new.as_str());
    if let Err(error) = part.update(store) {
        outcome.fail(&part, new, error);
        return Ok(outcome);
    }
    outcome.changed += 1;

    for mut item in items {
        item.set_part_number(new.as_str());
        if let Err(error) = item.update(store) {
            outcome.fail(&item, new, error);
            return Ok(outcome);
        }
        outcome.changed += 1;
    }

    for mut line in lines {
        line.set_part_number(new.as_str());
        if let Err(error) = line.update(store) {
            outcome.fail(&line, new, error);
            return Ok(outcome);
        }
        outcome.changed += 1;
    }

    tracing::info!(%old, %new, changed = outcome.changed, "changed part number");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record_set::Query;

    fn add_item(store: &Store, part_number: &str, assembly: &str) -> Item {
        let mut item = Item::new();
        item.set_part_number(part_number);
        item.set_assembly(assembly);
        item.set_quantity(1i64);
        item.add(store).unwrap();
        item
    }

    fn add_part(store: &Store, part_number: &str) -> Part {
        let mut part = Part::new();
        part.set_part_number(part_number);
        part.set_description("Bracket");
        part.add(store).unwrap();
        part
    }

    fn items_under(store: &Store, prefix: &str) -> Vec<Item> {
        let high = format!("{}ZZZ", prefix);
        RecordSet::<Item>::range(store, "assembly", prefix, &high, RangeEnd::Inclusive)
            .unwrap()
            .into_records()
    }

    #[test]
    fn test_rename_assembly_rewrites_prefix() {
        let store = Store::in_memory().unwrap();
        let ids: Vec<i64> = ["B", "BA", "BAA"]
            .iter()
            .map(|a| add_item(&store, "X-1", a).record_id())
            .collect();
        add_item(&store, "X-1", "C");

        let outcome = rename_assembly(&store, "b", "p").unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.matched, 3);
        assert_eq!(outcome.changed, 3);

        let renamed: Vec<String> = ids
            .iter()
            .map(|id| Item::fetch(&store, *id).unwrap().assembly().to_string())
            .collect();
        assert_eq!(renamed, vec!["P", "PA", "PAA"]);
        assert!(items_under(&store, "B").is_empty());
        assert_eq!(items_under(&store, "C").len(), 1);
    }

    #[test]
    fn test_rename_assembly_rejects_bad_codes() {
        let store = Store::in_memory().unwrap();
        assert!(matches!(
            rename_assembly(&store, "B1", "P"),
            Err(BulkError::InvalidInput { .. })
        ));
        assert!(matches!(
            rename_assembly(&store, "b", "B"),
            Err(BulkError::Unchanged(_))
        ));
    }

    #[test]
    fn test_rename_assembly_stops_at_first_failure() {
        let store = Store::in_memory().unwrap();
        add_item(&store, "X-1", "A");
        add_item(&store, "X-1", "AB");
        add_item(&store, "X-1", &"A".repeat(20));

        // The longest code would grow past the assembly length limit
        let outcome = rename_assembly(&store, "A", "ZZ").unwrap();
        assert_eq!(outcome.matched, 3);
        assert_eq!(outcome.changed, 1);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.kind, "item");
        assert!(matches!(failure.error, StoreError::Invalid { .. }));

        // Nothing is rolled back
        assert_eq!(items_under(&store, "ZZ").len(), 1);
    }

    #[test]
    fn test_change_part_number_everywhere() {
        let store = Store::in_memory().unwrap();
        add_part(&store, "B7A-100");
        add_part(&store, "B7A-1000");
        add_item(&store, "B7A-100", "A");
        add_item(&store, "B7A-100", "B");
        add_item(&store, "B7A-1000", "C");

        let mut line = OrderLine::new();
        line.set_order_number("PO-1");
        line.set_line(1i64);
        line.set_part_number("B7A-100");
        line.add(&store).unwrap();

        let outcome = change_part_number(&store, "b7a-100", "c8a-100").unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.changed, 4);

        assert!(Part::key_exists(&store, "C8A-100").unwrap());
        assert!(!Part::key_exists(&store, "B7A-100").unwrap());
        let items_with = |number: &str| {
            RecordSet::<Item>::query(&store, &Query::filter("part_number", number))
                .unwrap()
                .len()
        };
        assert_eq!(items_with("C8A-100"), 2);
        assert_eq!(items_with("B7A-1000"), 1);
        assert_eq!(OrderLine::fetch(&store, line.record_id()).unwrap().part_number(), "C8A-100");
    }

    #[test]
    fn test_change_part_number_refuses_existing_target() {
        let store = Store::in_memory().unwrap();
        add_part(&store, "A-1");
        add_part(&store, "A-2");
        assert!(matches!(
            change_part_number(&store, "A-1", "A-2"),
            Err(BulkError::PartExists(_))
        ));
        assert!(matches!(
            change_part_number(&store, "A-9", "A-3"),
            Err(BulkError::PartMissing(_))
        ));
    }
}
