//! Item entity - one use of a part at a position in the assembly tree
//!
//! Assembly codes are upper-case letter strings. A code's prefixes are its
//! ancestors: `"AAB"` sits under `"AA"`, which sits under `"A"`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::record::{FieldName, Properties, Record, Tracked};
use crate::core::store::{Store, StoreError};
use crate::core::validate::{
    validate_boolean, validate_integer, validate_pattern, validate_text, FieldValue, IntRule,
    PatternRule, TextRule, Validation,
};
use crate::entities::part::{validate_part_number, Part};

static ASSEMBLY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Z]+$").expect("assembly pattern is valid"));

const ASSEMBLY: PatternRule = PatternRule {
    label: "Assembly",
    description: "letters A-Z only",
    required: true,
    max_len: 20,
};
const QUANTITY: IntRule = IntRule {
    label: "Quantity",
    min: 0,
    max: 100,
    blank_is_zero: true,
};
const CONDITION: TextRule = TextRule::optional("Condition", 20);
const BOX: IntRule = IntRule {
    label: "Box",
    min: 0,
    max: 99,
    blank_is_zero: true,
};
const REMARKS: TextRule = TextRule::optional("Remarks", 255);

/// Validate an assembly code, upper-casing it first
pub fn validate_assembly(input: FieldValue) -> Validation {
    validate_pattern(input.to_uppercase(), &ASSEMBLY_PATTERN, &ASSEMBLY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemField {
    PartNumber,
    Assembly,
    Quantity,
    Condition,
    Installed,
    Box,
    Remarks,
}

impl FieldName for ItemField {
    const ALL: &'static [Self] = &[
        ItemField::PartNumber,
        ItemField::Assembly,
        ItemField::Quantity,
        ItemField::Condition,
        ItemField::Installed,
        ItemField::Box,
        ItemField::Remarks,
    ];

    fn column(self) -> &'static str {
        match self {
            ItemField::PartNumber => "part_number",
            ItemField::Assembly => "assembly",
            ItemField::Quantity => "quantity",
            ItemField::Condition => "condition",
            ItemField::Installed => "installed",
            ItemField::Box => "box",
            ItemField::Remarks => "remarks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ItemField::PartNumber => "Part number",
            ItemField::Assembly => ASSEMBLY.label,
            ItemField::Quantity => QUANTITY.label,
            ItemField::Condition => CONDITION.label,
            ItemField::Installed => "Installed",
            ItemField::Box => BOX.label,
            ItemField::Remarks => REMARKS.label,
        }
    }

    fn tooltip(self) -> &'static str {
        match self {
            ItemField::PartNumber => "Part number of the part used here",
            ItemField::Assembly => "Assembly code, letters A-Z; each letter is one tree level",
            ItemField::Quantity => "How many are used, 0 to 100",
            ItemField::Condition => "Condition of the parts on hand",
            ItemField::Installed => "Whether the parts are installed",
            ItemField::Box => "Storage box number, 0 to 99",
            ItemField::Remarks => "Optional notes about this use",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemProperties {
    pub part_number: String,
    pub assembly: String,
    pub quantity: i64,
    pub condition: String,
    pub installed: bool,
    #[serde(rename = "box")]
    pub box_number: i64,
    pub remarks: String,
}

impl Properties for ItemProperties {
    type Field = ItemField;

    fn get(&self, field: ItemField) -> FieldValue {
        match field {
            ItemField::PartNumber => self.part_number.as_str().into(),
            ItemField::Assembly => self.assembly.as_str().into(),
            ItemField::Quantity => self.quantity.into(),
            ItemField::Condition => self.condition.as_str().into(),
            ItemField::Installed => self.installed.into(),
            ItemField::Box => self.box_number.into(),
            ItemField::Remarks => self.remarks.as_str().into(),
        }
    }
}

/// A row of the `items` table
#[derive(Debug, Clone)]
pub struct Item {
    state: Tracked<ItemProperties>,
}

impl Item {
    pub fn part_number(&self) -> &str {
        &self.state.current().part_number
    }

    pub fn set_part_number(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_part_number(input.into());
        self.state.apply(ItemField::PartNumber, &result, |p| {
            p.part_number = result.text_or_default()
        });
        result
    }

    pub fn assembly(&self) -> &str {
        &self.state.current().assembly
    }

    pub fn set_assembly(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_assembly(input.into());
        self.state
            .apply(ItemField::Assembly, &result, |p| p.assembly = result.text_or_default());
        result
    }

    pub fn quantity(&self) -> i64 {
        self.state.current().quantity
    }

    pub fn set_quantity(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_integer(input.into(), &QUANTITY);
        self.state
            .apply(ItemField::Quantity, &result, |p| p.quantity = result.integer_or_default());
        result
    }

    pub fn condition(&self) -> &str {
        &self.state.current().condition
    }

    pub fn set_condition(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &CONDITION);
        self.state.apply(ItemField::Condition, &result, |p| {
            p.condition = result.text_or_default()
        });
        result
    }

    pub fn installed(&self) -> bool {
        self.state.current().installed
    }

    pub fn set_installed(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_boolean(input.into(), "Installed");
        self.state
            .apply(ItemField::Installed, &result, |p| p.installed = result.bool_or_default());
        result
    }

    pub fn box_number(&self) -> i64 {
        self.state.current().box_number
    }

    pub fn set_box_number(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_integer(input.into(), &BOX);
        self.state
            .apply(ItemField::Box, &result, |p| p.box_number = result.integer_or_default());
        result
    }

    pub fn remarks(&self) -> &str {
        &self.state.current().remarks
    }

    pub fn set_remarks(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &REMARKS);
        self.state
            .apply(ItemField::Remarks, &result, |p| p.remarks = result.text_or_default());
        result
    }

    /// Depth in the assembly tree, 0 for a top-level code
    pub fn depth(&self) -> usize {
        self.assembly().chars().count().saturating_sub(1)
    }

    /// The part this item refers to (all defaults if it is not catalogued)
    pub fn part(&self, store: &Store) -> Result<Part, StoreError> {
        Part::fetch_by_key(store, self.part_number())
    }
}

impl Record for Item {
    type Field = ItemField;
    type Properties = ItemProperties;

    const TABLE: &'static str = "items";
    const KIND: &'static str = "item";
    const KEY_FIELD: Option<ItemField> = None;
    const ORDER_BY: &'static str = "assembly";

    fn from_state(state: Tracked<ItemProperties>) -> Self {
        Self { state }
    }

    fn state(&self) -> &Tracked<ItemProperties> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Tracked<ItemProperties> {
        &mut self.state
    }

    fn set_field(&mut self, field: ItemField, input: FieldValue) -> Validation {
        match field {
            ItemField::PartNumber => self.set_part_number(input),
            ItemField::Assembly => self.set_assembly(input),
            ItemField::Quantity => self.set_quantity(input),
            ItemField::Condition => self.set_condition(input),
            ItemField::Installed => self.set_installed(input),
            ItemField::Box => self.set_box_number(input),
            ItemField::Remarks => self.set_remarks(input),
        }
    }

    fn display_value(&self, field: ItemField) -> String {
        match field {
            ItemField::Installed if self.installed() => "X".to_string(),
            ItemField::Installed => String::new(),
            other => self.state.current().get(other).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::test_support::{
        assert_properties_roundtrip, assert_required_reject_blank,
    };
    use crate::core::record_set::RecordSet;

    fn sample_item() -> Item {
        let mut item = Item::new();
        item.set_part_number("B7A-6051");
        item.set_assembly("aab");
        item.set_quantity("4");
        item.set_condition("Used");
        item.set_installed("X");
        item.set_box_number(12);
        item
    }

    #[test]
    fn test_assembly_upper_cased_before_validation() {
        let item = sample_item();
        assert_eq!(item.assembly(), "AAB");
        assert_eq!(item.depth(), 2);
        assert!(item.is_element_valid());
    }

    #[test]
    fn test_bad_assembly_reverts_to_default() {
        let mut item = sample_item();
        let result = item.set_assembly("A1");
        assert!(!result.valid);
        assert_eq!(result.entry, FieldValue::Text("A1".into()));
        assert_eq!(item.assembly(), "");
        assert!(!item.is_element_valid());
    }

    #[test]
    fn test_blank_quantity_is_zero() {
        let mut item = sample_item();
        let result = item.set_quantity("");
        assert!(result.valid);
        assert_eq!(item.quantity(), 0);
        assert!(item.set_box_number("").valid);
        assert_eq!(item.box_number(), 0);
    }

    #[test]
    fn test_out_of_range_quantity() {
        let mut item = sample_item();
        let result = item.set_quantity(101i64);
        assert!(!result.valid);
        assert_eq!(result.entry, FieldValue::Integer(101));
        assert_eq!(item.quantity(), 0);
    }

    #[test]
    fn test_changed_tracks_snapshot() {
        let store = Store::in_memory().unwrap();
        let mut item = sample_item();
        item.add(&store).unwrap();

        let mut loaded = Item::fetch(&store, item.record_id()).unwrap();
        assert!(!loaded.have_values_changed());

        loaded.set_quantity(4i64);
        assert!(!loaded.have_values_changed());
        loaded.set_quantity(5i64);
        assert!(loaded.have_values_changed());
        loaded.set_quantity(4i64);
        assert!(!loaded.have_values_changed());

        loaded.set_remarks("left side");
        loaded.update(&store).unwrap();
        assert!(!loaded.have_values_changed());
    }

    #[test]
    fn test_store_roundtrip_keeps_every_value() {
        let store = Store::in_memory().unwrap();
        let mut item = sample_item();
        let id = item.add(&store).unwrap();

        let loaded = Item::fetch(&store, id).unwrap();
        assert_eq!(loaded.properties(), item.properties());
        assert!(loaded.installed());
        assert_eq!(loaded.display_value(ItemField::Installed), "X");
    }

    #[test]
    fn test_delete_then_fetch_gives_defaults() {
        let store = Store::in_memory().unwrap();
        let mut item = sample_item();
        let id = item.add(&store).unwrap();
        item.delete(&store).unwrap();

        let gone = Item::fetch(&store, id).unwrap();
        assert_eq!(gone.record_id(), 0);
        assert_eq!(gone.properties(), ItemProperties::default());
        assert!(RecordSet::<Item>::all(&store).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_item_not_added() {
        let store = Store::in_memory().unwrap();
        let mut item = Item::new();
        item.set_assembly("A");
        let err = item.add(&store).unwrap_err();
        assert!(matches!(err, StoreError::Invalid { .. }));
        assert_eq!(item.record_id(), 0);
    }

    #[test]
    fn test_update_unsaved_item_fails() {
        let store = Store::in_memory().unwrap();
        let mut item = sample_item();
        assert!(matches!(
            item.update(&store),
            Err(StoreError::NotSaved { kind: "item" })
        ));
    }

    #[test]
    fn test_required_fields_reject_blank() {
        let item = sample_item();
        assert_required_reject_blank(&item, &[ItemField::PartNumber, ItemField::Assembly]);
        assert_properties_roundtrip(&item);
    }
}
