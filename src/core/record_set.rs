//! Record sets - ordered lists of records produced by one query
//!
//! A set is built wholesale when it is queried and does not follow later
//! changes to the rows it was built from. Writes go through the individual
//! records.

use crate::core::record::{FieldName, Record};
use crate::core::store::{Store, StoreError};
use crate::core::validate::FieldValue;

/// Filter, ordering and paging for [`RecordSet::query`]
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub where_column: Option<String>,
    pub where_value: Option<FieldValue>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Query {
    /// Match rows where `column = value`; a null value matches `IS NULL`
    pub fn filter(column: &str, value: impl Into<FieldValue>) -> Self {
        Self {
            where_column: Some(column.to_string()),
            where_value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn order_by(mut self, column: &str) -> Self {
        self.order_by = Some(column.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Upper bound handling for [`RecordSet::range`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// `low <= column <= high`
    Inclusive,
    /// `low <= column < high`
    Exclusive,
}

/// An ordered list of records of one type
#[derive(Debug, Clone)]
pub struct RecordSet<R: Record> {
    records: Vec<R>,
}

impl<R: Record> Default for RecordSet<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> RecordSet<R> {
    /// Run one query and materialize a record per row
    pub fn query(store: &Store, query: &Query) -> Result<Self, StoreError> {
        let mut sql = R::select_sql();
        let mut params = Vec::new();

        if let Some(column) = &query.where_column {
            let column = checked_column::<R>(column)?;
            match &query.where_value {
                None | Some(FieldValue::Null) => {
                    sql.push_str(&format!(" WHERE {} IS NULL", column));
                }
                Some(value) => {
                    sql.push_str(&format!(" WHERE {} = ?1", column));
                    params.push(value.clone());
                }
            }
        }
        push_order_and_paging::<R>(&mut sql, query)?;

        let records = store.select(&sql, &params, |row| R::from_row(row))?;
        tracing::debug!(table = R::TABLE, rows = records.len(), "queried record set");
        Ok(Self { records })
    }

    /// Every row of the table in the default order
    pub fn all(store: &Store) -> Result<Self, StoreError> {
        Self::query(store, &Query::default().order_by(R::ORDER_BY))
    }

    /// Rows whose `column` lies in a lexicographic range, ordered by it
    ///
    /// An empty `high` leaves the range open above.
    pub fn range(
        store: &Store,
        column: &str,
        low: &str,
        high: &str,
        end: RangeEnd,
    ) -> Result<Self, StoreError> {
        let column = checked_column::<R>(column)?;
        let mut sql = format!("{} WHERE {} >= ?1", R::select_sql(), column);
        let mut params = vec![FieldValue::from(low)];
        if !high.is_empty() {
            let op = match end {
                RangeEnd::Inclusive => "<=",
                RangeEnd::Exclusive => "<",
            };
            sql.push_str(&format!(" AND {} {} ?2", column, op));
            params.push(FieldValue::from(high));
        }
        sql.push_str(&format!(" ORDER BY {}, record_id", column));

        let records = store.select(&sql, &params, |row| R::from_row(row))?;
        tracing::debug!(
            table = R::TABLE,
            column,
            low,
            high,
            rows = records.len(),
            "queried record range"
        );
        Ok(Self { records })
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// Replace the contents; `None` clears the set
    pub fn set_records(&mut self, records: Option<Vec<R>>) {
        self.records = records.unwrap_or_default();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }
}

impl<R: Record> IntoIterator for RecordSet<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R: Record> IntoIterator for &'a RecordSet<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Only known column names are ever spliced into SQL
fn checked_column<R: Record>(column: &str) -> Result<&'static str, StoreError> {
    if column == "record_id" {
        return Ok("record_id");
    }
    R::Field::from_column(column)
        .map(FieldName::column)
        .ok_or_else(|| StoreError::UnknownColumn {
            table: R::TABLE,
            column: column.to_string(),
        })
}

fn push_order_and_paging<R: Record>(sql: &mut String, query: &Query) -> Result<(), StoreError> {
    if let Some(order_by) = &query.order_by {
        let (column, descending) = match order_by.strip_suffix(" DESC") {
            Some(column) => (column, true),
            None => (order_by.as_str(), false),
        };
        let column = checked_column::<R>(column.trim())?;
        sql.push_str(&format!(
            " ORDER BY {}{}, record_id",
            column,
            if descending { " DESC" } else { "" }
        ));
    }
    match (query.limit, query.offset) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
        (None, None) => {}
    }
    Ok(())
}
