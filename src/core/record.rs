//! Record trait - the validation and dirty-tracking protocol shared by every
//! table row type
//!
//! A record owns a [`Tracked`] state: the current properties, a snapshot of
//! the properties as last loaded or saved, and one valid/changed flag pair
//! per field. Setters run a validator, store either the accepted value or the
//! type default, and update the flags. Persistence is a single-row write per
//! call.

use std::collections::BTreeMap;
use std::fmt;

use rusqlite::Row;
use serde::{de::DeserializeOwned, Serialize};

use crate::core::store::{Store, StoreError};
use crate::core::validate::{FieldValue, Validation};

/// The field enum of one record type
pub trait FieldName: Copy + Eq + Ord + fmt::Debug + 'static {
    /// Every field, in column order
    const ALL: &'static [Self];

    /// Column name in the data file (also the serde key)
    fn column(self) -> &'static str;

    /// Short human label
    fn label(self) -> &'static str;

    /// Base tooltip shown on the form when the field is valid
    fn tooltip(self) -> &'static str;

    fn from_column(name: &str) -> Option<Self> {
        let name = name.replace('-', "_");
        Self::ALL.iter().copied().find(|f| f.column() == name)
    }
}

/// The typed property struct of one record type
pub trait Properties:
    Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned
{
    type Field: FieldName;

    /// Stored value of one field
    fn get(&self, field: Self::Field) -> FieldValue;
}

/// Per-field valid and changed flags
#[derive(Debug, Clone)]
pub struct FieldTracker<F: FieldName> {
    valid: BTreeMap<F, bool>,
    changed: BTreeMap<F, bool>,
}

impl<F: FieldName> Default for FieldTracker<F> {
    fn default() -> Self {
        Self {
            valid: F::ALL.iter().map(|f| (*f, false)).collect(),
            changed: F::ALL.iter().map(|f| (*f, false)).collect(),
        }
    }
}

impl<F: FieldName> FieldTracker<F> {
    pub fn record(&mut self, field: F, valid: bool, changed: bool) {
        self.valid.insert(field, valid);
        self.changed.insert(field, changed);
    }

    pub fn is_valid(&self, field: F) -> bool {
        self.valid.get(&field).copied().unwrap_or(false)
    }

    pub fn is_changed(&self, field: F) -> bool {
        self.changed.get(&field).copied().unwrap_or(false)
    }

    pub fn all_valid(&self) -> bool {
        self.valid.values().all(|v| *v)
    }

    pub fn any_changed(&self) -> bool {
        self.changed.values().any(|c| *c)
    }

    pub fn invalid_fields(&self) -> Vec<F> {
        self.valid
            .iter()
            .filter(|(_, valid)| !**valid)
            .map(|(f, _)| *f)
            .collect()
    }

    fn clear_changed(&mut self) {
        for changed in self.changed.values_mut() {
            *changed = false;
        }
    }
}

/// Current values, the initial snapshot and the flags of one record
#[derive(Debug, Clone)]
pub struct Tracked<P: Properties> {
    record_id: i64,
    current: P,
    initial: P,
    flags: FieldTracker<P::Field>,
}

impl<P: Properties> Default for Tracked<P> {
    fn default() -> Self {
        Self {
            record_id: 0,
            current: P::default(),
            initial: P::default(),
            flags: FieldTracker::default(),
        }
    }
}

impl<P: Properties> Tracked<P> {
    pub fn record_id(&self) -> i64 {
        self.record_id
    }

    pub fn current(&self) -> &P {
        &self.current
    }

    pub fn initial(&self) -> &P {
        &self.initial
    }

    pub fn flags(&self) -> &FieldTracker<P::Field> {
        &self.flags
    }

    /// Record the outcome of a setter
    ///
    /// `store` writes the accepted value (or the default) into the current
    /// properties; the changed flag is then recomputed against the snapshot.
    pub fn apply(&mut self, field: P::Field, result: &Validation, store: impl FnOnce(&mut P)) {
        store(&mut self.current);
        let changed = self.current.get(field) != self.initial.get(field);
        self.flags.record(field, result.valid, changed);
    }

    /// Take a new initial snapshot and clear every changed flag
    pub fn snapshot(&mut self) {
        self.initial = self.current.clone();
        self.flags.clear_changed();
    }

    pub(crate) fn set_record_id(&mut self, record_id: i64) {
        self.record_id = record_id;
    }
}

/// One row of one table
pub trait Record: Sized {
    type Field: FieldName;
    type Properties: Properties<Field = Self::Field>;

    /// Table in the data file
    const TABLE: &'static str;

    /// Human name, e.g. "part"
    const KIND: &'static str;

    /// Alternate unique column used for lookups, if any
    const KEY_FIELD: Option<Self::Field>;

    /// Default ordering for list views
    const ORDER_BY: &'static str;

    fn from_state(state: Tracked<Self::Properties>) -> Self;

    fn state(&self) -> &Tracked<Self::Properties>;

    fn state_mut(&mut self) -> &mut Tracked<Self::Properties>;

    /// Run the setter for `field`
    fn set_field(&mut self, field: Self::Field, input: FieldValue) -> Validation;

    /// Value as shown to the user
    fn display_value(&self, field: Self::Field) -> String {
        self.state().current().get(field).to_string()
    }

    /// An empty record with every property at its default
    fn new() -> Self {
        Self::from_properties(Self::Properties::default())
    }

    /// Build from a (possibly partial) set of properties
    fn from_properties(properties: Self::Properties) -> Self {
        let mut record = Self::from_state(Tracked::default());
        record.set_properties(properties);
        record.state_mut().snapshot();
        record
    }

    /// Build from a sparse JSON object; missing keys take defaults and
    /// unknown keys are ignored
    fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let properties: Self::Properties = serde_json::from_value(value)?;
        Ok(Self::from_properties(properties))
    }

    fn record_id(&self) -> i64 {
        self.state().record_id()
    }

    fn properties(&self) -> Self::Properties {
        self.state().current().clone()
    }

    /// Run every setter from a typed property struct
    fn set_properties(&mut self, properties: Self::Properties) -> Vec<Validation> {
        Self::Field::ALL
            .iter()
            .map(|field| self.set_field(*field, properties.get(*field)))
            .collect()
    }

    fn field_value(&self, field: Self::Field) -> FieldValue {
        self.state().current().get(field)
    }

    /// Every field passed its last validation
    fn is_element_valid(&self) -> bool {
        self.state().flags().all_valid()
    }

    /// Some field differs from the snapshot
    fn have_values_changed(&self) -> bool {
        self.state().flags().any_changed()
    }

    fn invalid_fields(&self) -> Vec<&'static str> {
        self.state()
            .flags()
            .invalid_fields()
            .into_iter()
            .map(FieldName::column)
            .collect()
    }

    fn columns() -> Vec<&'static str> {
        Self::Field::ALL.iter().map(|f| f.column()).collect()
    }

    fn select_sql() -> String {
        format!(
            "SELECT record_id, {} FROM {}",
            Self::columns().join(", "),
            Self::TABLE
        )
    }

    /// Materialize a row selected with [`Record::select_sql`]
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let record_id: i64 = row.get(0)?;
        let mut record = Self::from_state(Tracked::default());
        for (i, field) in Self::Field::ALL.iter().enumerate() {
            let value: FieldValue = row.get(i + 1)?;
            record.set_field(*field, value);
        }
        record.state_mut().set_record_id(record_id);
        record.state_mut().snapshot();
        Ok(record)
    }

    /// Fetch by record id; a miss gives an all-defaults record
    fn fetch(store: &Store, record_id: i64) -> Result<Self, StoreError> {
        let sql = format!("{} WHERE record_id = ?1", Self::select_sql());
        let found = store.select_one(&sql, &[FieldValue::Integer(record_id)], |row| {
            Self::from_row(row)
        })?;
        Ok(found.unwrap_or_else(Self::new))
    }

    /// Normalize a key the way the key field's setter would
    fn normalize_key(key: &str) -> Option<FieldValue> {
        let field = Self::KEY_FIELD?;
        let mut probe = Self::new();
        let result = probe.set_field(field, key.into());
        result.valid.then(|| probe.field_value(field))
    }

    /// Fetch by the alternate key; a miss gives an all-defaults record
    fn fetch_by_key(store: &Store, key: &str) -> Result<Self, StoreError> {
        let (Some(field), Some(value)) = (Self::KEY_FIELD, Self::normalize_key(key)) else {
            return Ok(Self::new());
        };
        let sql = format!("{} WHERE {} = ?1", Self::select_sql(), field.column());
        let found = store.select_one(&sql, &[value], |row| Self::from_row(row))?;
        Ok(found.unwrap_or_else(Self::new))
    }

    /// Whether a row with this alternate key exists
    fn key_exists(store: &Store, key: &str) -> Result<bool, StoreError> {
        let (Some(field), Some(value)) = (Self::KEY_FIELD, Self::normalize_key(key)) else {
            return Ok(false);
        };
        Ok(store.count_where(Self::TABLE, field.column(), &value)? > 0)
    }

    fn column_values(&self) -> Vec<FieldValue> {
        Self::Field::ALL
            .iter()
            .map(|f| self.field_value(*f))
            .collect()
    }

    /// Insert as a new row and take the assigned record id
    fn add(&mut self, store: &Store) -> Result<i64, StoreError> {
        if self.record_id() != 0 {
            return Err(StoreError::AlreadySaved {
                kind: Self::KIND,
                id: self.record_id(),
            });
        }
        self.ensure_valid()?;

        let record_id = store.insert_row(Self::TABLE, &Self::columns(), &self.column_values())?;
        let state = self.state_mut();
        state.set_record_id(record_id);
        state.snapshot();
        tracing::info!(kind = Self::KIND, record_id, "added record");
        Ok(record_id)
    }

    /// Rewrite the existing row
    fn update(&mut self, store: &Store) -> Result<(), StoreError> {
        let record_id = self.record_id();
        if record_id == 0 {
            return Err(StoreError::NotSaved { kind: Self::KIND });
        }
        self.ensure_valid()?;

        let touched = store.update_row(
            Self::TABLE,
            record_id,
            &Self::columns(),
            &self.column_values(),
        )?;
        if touched == 0 {
            return Err(StoreError::NotFound {
                kind: Self::KIND,
                key: record_id.to_string(),
            });
        }
        self.state_mut().snapshot();
        tracing::info!(kind = Self::KIND, record_id, "updated record");
        Ok(())
    }

    /// Remove the row; the in-memory record is left for the caller to drop
    fn delete(&self, store: &Store) -> Result<(), StoreError> {
        let record_id = self.record_id();
        if record_id == 0 {
            return Err(StoreError::NotSaved { kind: Self::KIND });
        }
        if store.delete_row(Self::TABLE, record_id)? == 0 {
            return Err(StoreError::NotFound {
                kind: Self::KIND,
                key: record_id.to_string(),
            });
        }
        tracing::info!(kind = Self::KIND, record_id, "deleted record");
        Ok(())
    }

    fn ensure_valid(&self) -> Result<(), StoreError> {
        if self.is_element_valid() {
            return Ok(());
        }
        Err(StoreError::Invalid {
            kind: Self::KIND,
            fields: self
                .invalid_fields()
                .into_iter()
                .map(String::from)
                .collect(),
        })
    }
}
