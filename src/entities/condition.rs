//! Condition entity - named states an item can be in ("New", "Used", "Rebuilt")

use serde::{Deserialize, Serialize};

use crate::core::record::{FieldName, Properties, Record, Tracked};
use crate::core::validate::{validate_text, FieldValue, TextRule, Validation};

const CONDITION: TextRule = TextRule::required("Condition", 20);
const REMARKS: TextRule = TextRule::optional("Remarks", 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConditionField {
    Condition,
    Remarks,
}

impl FieldName for ConditionField {
    const ALL: &'static [Self] = &[ConditionField::Condition, ConditionField::Remarks];

    fn column(self) -> &'static str {
        match self {
            ConditionField::Condition => "condition",
            ConditionField::Remarks => "remarks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ConditionField::Condition => CONDITION.label,
            ConditionField::Remarks => REMARKS.label,
        }
    }

    fn tooltip(self) -> &'static str {
        match self {
            ConditionField::Condition => "Name of the condition, up to 20 characters",
            ConditionField::Remarks => "Optional notes",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionProperties {
    pub condition: String,
    pub remarks: String,
}

impl Properties for ConditionProperties {
    type Field = ConditionField;

    fn get(&self, field: ConditionField) -> FieldValue {
        match field {
            ConditionField::Condition => self.condition.as_str().into(),
            ConditionField::Remarks => self.remarks.as_str().into(),
        }
    }
}

/// A row of the `conditions` table
#[derive(Debug, Clone)]
pub struct Condition {
    state: Tracked<ConditionProperties>,
}

impl Condition {
    pub fn condition(&self) -> &str {
        &self.state.current().condition
    }

    pub fn set_condition(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &CONDITION);
        self.state.apply(ConditionField::Condition, &result, |p| {
            p.condition = result.text_or_default()
        });
        result
    }

    pub fn remarks(&self) -> &str {
        &self.state.current().remarks
    }

    pub fn set_remarks(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &REMARKS);
        self.state
            .apply(ConditionField::Remarks, &result, |p| p.remarks = result.text_or_default());
        result
    }
}

impl Record for Condition {
    type Field = ConditionField;
    type Properties = ConditionProperties;

    const TABLE: &'static str = "conditions";
    const KIND: &'static str = "condition";
    const KEY_FIELD: Option<ConditionField> = Some(ConditionField::Condition);
    const ORDER_BY: &'static str = "condition";

    fn from_state(state: Tracked<ConditionProperties>) -> Self {
        Self { state }
    }

    fn state(&self) -> &Tracked<ConditionProperties> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Tracked<ConditionProperties> {
        &mut self.state
    }

    fn set_field(&mut self, field: ConditionField, input: FieldValue) -> Validation {
        match field {
            ConditionField::Condition => self.set_condition(input),
            ConditionField::Remarks => self.set_remarks(input),
        }
    }
}
