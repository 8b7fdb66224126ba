//! Source entity - vendors parts are bought from

use serde::{Deserialize, Serialize};

use crate::core::record::{FieldName, Properties, Record, Tracked};
use crate::core::validate::{validate_text, FieldValue, TextRule, Validation};

const SOURCE: TextRule = TextRule::required("Source", 40);
const REMARKS: TextRule = TextRule::optional("Remarks", 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceField {
    Source,
    Remarks,
}

impl FieldName for SourceField {
    const ALL: &'static [Self] = &[SourceField::Source, SourceField::Remarks];

    fn column(self) -> &'static str {
        match self {
            SourceField::Source => "source",
            SourceField::Remarks => "remarks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SourceField::Source => SOURCE.label,
            SourceField::Remarks => REMARKS.label,
        }
    }

    fn tooltip(self) -> &'static str {
        match self {
            SourceField::Source => "Vendor name, up to 40 characters",
            SourceField::Remarks => "Optional notes",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceProperties {
    pub source: String,
    pub remarks: String,
}

impl Properties for SourceProperties {
    type Field = SourceField;

    fn get(&self, field: SourceField) -> FieldValue {
        match field {
            SourceField::Source => self.source.as_str().into(),
            SourceField::Remarks => self.remarks.as_str().into(),
        }
    }
}

/// A row of the `sources` table
#[derive(Debug, Clone)]
pub struct Source {
    state: Tracked<SourceProperties>,
}

impl Source {
    pub fn source(&self) -> &str {
        &self.state.current().source
    }

    pub fn set_source(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &SOURCE);
        self.state.apply(SourceField::Source, &result, |p| {
            p.source = result.text_or_default()
        });
        result
    }

    pub fn remarks(&self) -> &str {
        &self.state.current().remarks
    }

    pub fn set_remarks(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &REMARKS);
        self.state
            .apply(SourceField::Remarks, &result, |p| p.remarks = result.text_or_default());
        result
    }
}

impl Record for Source {
    type Field = SourceField;
    type Properties = SourceProperties;

    const TABLE: &'static str = "sources";
    const KIND: &'static str = "source";
    const KEY_FIELD: Option<SourceField> = Some(SourceField::Source);
    const ORDER_BY: &'static str = "source";

    fn from_state(state: Tracked<SourceProperties>) -> Self {
        Self { state }
    }

    fn state(&self) -> &Tracked<SourceProperties> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Tracked<SourceProperties> {
        &mut self.state
    }

    fn set_field(&mut self, field: SourceField, input: FieldValue) -> Validation {
        match field {
            SourceField::Source => self.set_source(input),
            SourceField::Remarks => self.set_remarks(input),
        }
    }
}
