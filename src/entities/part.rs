//! Part entity - a catalogue entry identified by its part number

use serde::{Deserialize, Serialize};

use crate::core::record::{FieldName, Properties, Record, Tracked};
use crate::core::record_set::{Query, RecordSet};
use crate::core::store::{Store, StoreError};
use crate::core::validate::{validate_text, FieldValue, TextRule, Validation};
use crate::entities::item::Item;
use crate::entities::order_line::OrderLine;

pub(crate) const PART_NUMBER: TextRule = TextRule::required("Part number", 30);
const SOURCE: TextRule = TextRule::optional("Source", 40);
const DESCRIPTION: TextRule = TextRule::required("Description", 50);
const REMARKS: TextRule = TextRule::optional("Remarks", 255);

/// Validate a part number, upper-casing it first
pub fn validate_part_number(input: FieldValue) -> Validation {
    validate_text(input.to_uppercase(), &PART_NUMBER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartField {
    PartNumber,
    Source,
    Description,
    Remarks,
}

impl FieldName for PartField {
    const ALL: &'static [Self] = &[
        PartField::PartNumber,
        PartField::Source,
        PartField::Description,
        PartField::Remarks,
    ];

    fn column(self) -> &'static str {
        match self {
            PartField::PartNumber => "part_number",
            PartField::Source => "source",
            PartField::Description => "description",
            PartField::Remarks => "remarks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PartField::PartNumber => PART_NUMBER.label,
            PartField::Source => SOURCE.label,
            PartField::Description => DESCRIPTION.label,
            PartField::Remarks => REMARKS.label,
        }
    }

    fn tooltip(self) -> &'static str {
        match self {
            PartField::PartNumber => "Manufacturer part number; a new number adds a new part",
            PartField::Source => "Where the part is usually bought",
            PartField::Description => "What the part is, up to 50 characters",
            PartField::Remarks => "Optional notes about the part",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartProperties {
    pub part_number: String,
    pub source: String,
    pub description: String,
    pub remarks: String,
}

impl Properties for PartProperties {
    type Field = PartField;

    fn get(&self, field: PartField) -> FieldValue {
        match field {
            PartField::PartNumber => self.part_number.as_str().into(),
            PartField::Source => self.source.as_str().into(),
            PartField::Description => self.description.as_str().into(),
            PartField::Remarks => self.remarks.as_str().into(),
        }
    }
}

/// A row of the `parts` table
#[derive(Debug, Clone)]
pub struct Part {
    state: Tracked<PartProperties>,
}

impl Part {
    pub fn part_number(&self) -> &str {
        &self.state.current().part_number
    }

    pub fn set_part_number(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_part_number(input.into());
        self.state.apply(PartField::PartNumber, &result, |p| {
            p.part_number = result.text_or_default()
        });
        result
    }

    pub fn source(&self) -> &str {
        &self.state.current().source
    }

    pub fn set_source(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &SOURCE);
        self.state
            .apply(PartField::Source, &result, |p| p.source = result.text_or_default());
        result
    }

    pub fn description(&self) -> &str {
        &self.state.current().description
    }

    pub fn set_description(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &DESCRIPTION);
        self.state.apply(PartField::Description, &result, |p| {
            p.description = result.text_or_default()
        });
        result
    }

    pub fn remarks(&self) -> &str {
        &self.state.current().remarks
    }

    pub fn set_remarks(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &REMARKS);
        self.state
            .apply(PartField::Remarks, &result, |p| p.remarks = result.text_or_default());
        result
    }

    /// Items that use this part
    pub fn items(&self, store: &Store) -> Result<RecordSet<Item>, StoreError> {
        RecordSet::query(
            store,
            &Query::filter("part_number", self.part_number()).order_by("assembly"),
        )
    }

    /// Total quantity across every item using this part
    pub fn total_quantity(&self, store: &Store) -> Result<i64, StoreError> {
        Ok(self.items(store)?.iter().map(Item::quantity).sum())
    }

    /// Quantity across installed items only
    pub fn installed_quantity(&self, store: &Store) -> Result<i64, StoreError> {
        Ok(self
            .items(store)?
            .iter()
            .filter(|item| item.installed())
            .map(Item::quantity)
            .sum())
    }

    /// Order lines that bought this part
    pub fn order_lines(&self, store: &Store) -> Result<RecordSet<OrderLine>, StoreError> {
        RecordSet::query(
            store,
            &Query::filter("part_number", self.part_number()).order_by("order_number"),
        )
    }
}

impl Record for Part {
    type Field = PartField;
    type Properties = PartProperties;

    const TABLE: &'static str = "parts";
    const KIND: &'static str = "part";
    const KEY_FIELD: Option<PartField> = Some(PartField::PartNumber);
    const ORDER_BY: &'static str = "part_number";

    fn from_state(state: Tracked<PartProperties>) -> Self {
        Self { state }
    }

    fn state(&self) -> &Tracked<PartProperties> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Tracked<PartProperties> {
        &mut self.state
    }

    fn set_field(&mut self, field: PartField, input: FieldValue) -> Validation {
        match field {
            PartField::PartNumber => self.set_part_number(input),
            PartField::Source => self.set_source(input),
            PartField::Description => self.set_description(input),
            PartField::Remarks => self.set_remarks(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::test_support::{
        assert_properties_roundtrip, assert_required_reject_blank,
    };

    fn sample_part() -> Part {
        Part::from_properties(PartProperties {
            part_number: "c5az-6019-a".to_string(),
            source: "Summit".to_string(),
            description: "Timing cover".to_string(),
            remarks: String::new(),
        })
    }

    #[test]
    fn test_part_number_upper_cased() {
        let part = sample_part();
        assert_eq!(part.part_number(), "C5AZ-6019-A");
        assert!(part.is_element_valid());
        assert!(!part.have_values_changed());
    }

    #[test]
    fn test_required_fields_fall_back_to_default() {
        let mut part = sample_part();
        for input in [FieldValue::Null, FieldValue::from("")] {
            let result = part.set_description(input.clone());
            assert!(!result.valid);
            assert_eq!(result.entry, input);
            assert_eq!(part.description(), "");
        }
        assert!(!part.is_element_valid());
        assert!(part.have_values_changed());
    }

    #[test]
    fn test_properties_roundtrip() {
        let part = sample_part();
        let copy = Part::from_properties(part.properties());
        assert_eq!(copy.part_number(), part.part_number());
        assert_eq!(copy.source(), part.source());
        assert_eq!(copy.description(), part.description());
        assert_eq!(copy.remarks(), part.remarks());
    }

    #[test]
    fn test_sparse_json_fills_defaults() {
        let part = Part::from_json(serde_json::json!({
            "part_number": "B7A-1234",
            "colour": "red"
        }))
        .unwrap();
        assert_eq!(part.part_number(), "B7A-1234");
        assert_eq!(part.description(), "");
        assert_eq!(part.invalid_fields(), vec!["description"]);
    }

    #[test]
    fn test_quantities_derived_from_items() {
        let store = Store::in_memory().unwrap();
        let mut part = sample_part();
        part.add(&store).unwrap();

        for (assembly, quantity, installed) in [("A", 2, true), ("B", 3, false)] {
            let mut item = Item::new();
            item.set_part_number("C5AZ-6019-A");
            item.set_assembly(assembly);
            item.set_quantity(quantity);
            item.set_installed(installed);
            item.add(&store).unwrap();
        }

        assert_eq!(part.total_quantity(&store).unwrap(), 5);
        assert_eq!(part.installed_quantity(&store).unwrap(), 2);
        assert!(part.order_lines(&store).unwrap().is_empty());
    }

    #[test]
    fn test_required_fields_reject_blank() {
        let part = sample_part();
        assert_required_reject_blank(&part, &[PartField::PartNumber, PartField::Description]);
        assert_properties_roundtrip(&part);
    }
}
