//! Field-level validation
//!
//! Stateless checks shared by every record setter. Each check takes a raw
//! [`FieldValue`] of whatever shape the caller had (typed text, a number from
//! the database, nothing at all) and returns a [`Validation`]. A check never
//! fails loudly: bad input comes back as `valid == false` with a message and
//! the original entry echoed so a form can redisplay what the user typed.

use std::fmt;

use chrono::NaiveDate;
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};

/// Date format used in the data file
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format shown to the user
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// A raw field value of unknown type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Upper-case text values, leaving every other shape alone
    pub fn to_uppercase(self) -> Self {
        match self {
            FieldValue::Text(s) => FieldValue::Text(s.to_uppercase()),
            other => other,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Real(x) => write!(f, "{:.2}", x),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Real(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Null => ToSqlOutput::Owned(Value::Null),
            FieldValue::Boolean(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            FieldValue::Integer(n) => ToSqlOutput::Owned(Value::Integer(*n)),
            FieldValue::Real(x) => ToSqlOutput::Owned(Value::Real(*x)),
            FieldValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl FromSql for FieldValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null | ValueRef::Blob(_) => FieldValue::Null,
            ValueRef::Integer(n) => FieldValue::Integer(n),
            ValueRef::Real(x) => FieldValue::Real(x),
            ValueRef::Text(bytes) => FieldValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        })
    }
}

/// Outcome of validating one field
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// The coerced value on success, the untouched input on failure
    pub entry: FieldValue,
    pub valid: bool,
    /// Human-readable reason, empty when valid
    pub msg: String,
}

impl Validation {
    pub fn ok(entry: FieldValue) -> Self {
        Self {
            entry,
            valid: true,
            msg: String::new(),
        }
    }

    pub fn fail(entry: FieldValue, msg: impl Into<String>) -> Self {
        Self {
            entry,
            valid: false,
            msg: msg.into(),
        }
    }

    /// Accepted text, or the empty default
    pub fn text_or_default(&self) -> String {
        match (&self.entry, self.valid) {
            (FieldValue::Text(s), true) => s.clone(),
            _ => String::new(),
        }
    }

    /// Accepted integer, or zero
    pub fn integer_or_default(&self) -> i64 {
        match (&self.entry, self.valid) {
            (FieldValue::Integer(n), true) => *n,
            _ => 0,
        }
    }

    /// Accepted real number, or zero
    pub fn real_or_default(&self) -> f64 {
        match (&self.entry, self.valid) {
            (FieldValue::Real(x), true) => *x,
            _ => 0.0,
        }
    }

    /// Accepted flag, or false
    pub fn bool_or_default(&self) -> bool {
        matches!((&self.entry, self.valid), (FieldValue::Boolean(true), true))
    }
}

/// Constraints for a text field
#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    pub label: &'static str,
    pub required: bool,
    pub min_len: usize,
    pub max_len: usize,
}

impl TextRule {
    pub const fn required(label: &'static str, max_len: usize) -> Self {
        Self {
            label,
            required: true,
            min_len: 1,
            max_len,
        }
    }

    pub const fn optional(label: &'static str, max_len: usize) -> Self {
        Self {
            label,
            required: false,
            min_len: 0,
            max_len,
        }
    }
}

/// Constraints for an integer field
#[derive(Debug, Clone, Copy)]
pub struct IntRule {
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    /// Treat an empty entry as a valid zero
    pub blank_is_zero: bool,
}

/// Constraints for a floating point field
#[derive(Debug, Clone, Copy)]
pub struct FloatRule {
    pub label: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub blank_is_zero: bool,
}

/// Constraints for a fixed-format string
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub label: &'static str,
    /// Shown in the error message, e.g. "letters A-Z only"
    pub description: &'static str,
    pub required: bool,
    pub max_len: usize,
}

fn text_of(input: &FieldValue) -> Option<String> {
    match input {
        FieldValue::Null => None,
        FieldValue::Text(s) => Some(s.trim().to_string()),
        FieldValue::Integer(n) => Some(n.to_string()),
        FieldValue::Real(x) => Some(x.to_string()),
        FieldValue::Boolean(b) => Some(b.to_string()),
    }
}

/// Validate a free text field
pub fn validate_text(input: FieldValue, rule: &TextRule) -> Validation {
    let text = text_of(&input).unwrap_or_default();
    let len = text.chars().count();

    if text.is_empty() {
        if rule.required {
            return Validation::fail(input, format!("{} is required", rule.label));
        }
        return Validation::ok(FieldValue::Text(text));
    }
    if len < rule.min_len {
        return Validation::fail(
            input,
            format!("{} must be at least {} characters", rule.label, rule.min_len),
        );
    }
    if len > rule.max_len {
        return Validation::fail(
            input,
            format!("{} must be at most {} characters", rule.label, rule.max_len),
        );
    }
    Validation::ok(FieldValue::Text(text))
}

/// Validate a whole number within `[min, max]`
pub fn validate_integer(input: FieldValue, rule: &IntRule) -> Validation {
    if input.is_blank() {
        if rule.blank_is_zero {
            return Validation::ok(FieldValue::Integer(0));
        }
        return Validation::fail(input, format!("{} is required", rule.label));
    }

    let parsed = match &input {
        FieldValue::Integer(n) => Some(*n),
        FieldValue::Real(x) if x.fract() == 0.0 && x.is_finite() => Some(*x as i64),
        FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    let Some(n) = parsed else {
        return Validation::fail(input, format!("{} must be a whole number", rule.label));
    };
    if n < rule.min || n > rule.max {
        return Validation::fail(
            input,
            format!("{} must be between {} and {}", rule.label, rule.min, rule.max),
        );
    }
    Validation::ok(FieldValue::Integer(n))
}

/// Validate a decimal number within optional bounds
pub fn validate_float(input: FieldValue, rule: &FloatRule) -> Validation {
    if input.is_blank() {
        if rule.blank_is_zero {
            return Validation::ok(FieldValue::Real(0.0));
        }
        return Validation::fail(input, format!("{} is required", rule.label));
    }

    let parsed = match &input {
        FieldValue::Real(x) => Some(*x),
        FieldValue::Integer(n) => Some(*n as f64),
        FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        FieldValue::Boolean(_) | FieldValue::Null => None,
    };

    let Some(x) = parsed.filter(|x| x.is_finite()) else {
        return Validation::fail(input, format!("{} must be a number", rule.label));
    };
    if let Some(min) = rule.min {
        if x < min {
            return Validation::fail(
                input,
                format!("{} must be greater than or equal to {}", rule.label, min),
            );
        }
    }
    if let Some(max) = rule.max {
        if x > max {
            return Validation::fail(
                input,
                format!("{} must be less than or equal to {}", rule.label, max),
            );
        }
    }
    Validation::ok(FieldValue::Real(x))
}

/// Validate a string against a fixed format
pub fn validate_pattern(input: FieldValue, pattern: &Regex, rule: &PatternRule) -> Validation {
    let text = text_of(&input).unwrap_or_default();

    if text.is_empty() {
        if rule.required {
            return Validation::fail(input, format!("{} is required", rule.label));
        }
        return Validation::ok(FieldValue::Text(text));
    }
    if text.chars().count() > rule.max_len {
        return Validation::fail(
            input,
            format!("{} must be at most {} characters", rule.label, rule.max_len),
        );
    }
    if !pattern.is_match(&text) {
        return Validation::fail(
            input,
            format!("{} must be {}", rule.label, rule.description),
        );
    }
    Validation::ok(FieldValue::Text(text))
}

/// Parse a date in either storage or display form
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, STORAGE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, DISPLAY_DATE_FORMAT))
        .ok()
}

/// Validate a calendar date; the accepted entry is in storage form
pub fn validate_date(input: FieldValue, label: &str) -> Validation {
    if input.is_blank() {
        return Validation::fail(input, format!("{} is required", label));
    }
    let parsed = match &input {
        FieldValue::Text(text) => parse_date(text),
        _ => return Validation::fail(input, format!("{} must be a date", label)),
    };

    match parsed {
        Some(date) => Validation::ok(FieldValue::Text(
            date.format(STORAGE_DATE_FORMAT).to_string(),
        )),
        None => Validation::fail(
            input,
            format!("{} must be a valid date (MM/DD/YYYY)", label),
        ),
    }
}

/// Convert a stored `YYYY-MM-DD` date to `MM/DD/YYYY`
///
/// Text that does not parse is returned unchanged.
pub fn display_date(stored: &str) -> String {
    match NaiveDate::parse_from_str(stored.trim(), STORAGE_DATE_FORMAT) {
        Ok(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        Err(_) => stored.to_string(),
    }
}

/// Validate a yes/no flag
pub fn validate_boolean(input: FieldValue, label: &str) -> Validation {
    let parsed = match &input {
        FieldValue::Null => Some(false),
        FieldValue::Boolean(b) => Some(*b),
        FieldValue::Integer(0) => Some(false),
        FieldValue::Integer(1) => Some(true),
        FieldValue::Text(s) => match s.trim().to_lowercase().as_str() {
            "" | "false" | "no" | "n" | "0" => Some(false),
            "true" | "yes" | "y" | "x" | "1" => Some(true),
            _ => None,
        },
        _ => None,
    };

    match parsed {
        Some(b) => Validation::ok(FieldValue::Boolean(b)),
        None => Validation::fail(input, format!("{} must be yes or no", label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: TextRule = TextRule::required("Name", 5);
    const QTY: IntRule = IntRule {
        label: "Quantity",
        min: 0,
        max: 100,
        blank_is_zero: true,
    };
    const DISCOUNT: FloatRule = FloatRule {
        label: "Discount",
        min: None,
        max: Some(0.0),
        blank_is_zero: true,
    };

    #[test]
    fn test_required_text_rejects_blank() {
        let result = validate_text(FieldValue::Null, &NAME);
        assert!(!result.valid);
        assert_eq!(result.entry, FieldValue::Null);
        assert_eq!(result.msg, "Name is required");

        let result = validate_text("   ".into(), &NAME);
        assert!(!result.valid);
    }

    #[test]
    fn test_text_too_long_echoes_entry() {
        let result = validate_text("abcdefg".into(), &NAME);
        assert!(!result.valid);
        assert_eq!(result.entry, FieldValue::Text("abcdefg".into()));
        assert!(result.msg.contains("at most 5"));
    }

    #[test]
    fn test_text_is_trimmed() {
        let result = validate_text("  ab ".into(), &NAME);
        assert!(result.valid);
        assert_eq!(result.text_or_default(), "ab");
    }

    #[test]
    fn test_integer_blank_is_zero() {
        let result = validate_integer("".into(), &QTY);
        assert!(result.valid);
        assert_eq!(result.integer_or_default(), 0);
    }

    #[test]
    fn test_integer_range_and_parse() {
        assert_eq!(validate_integer("42".into(), &QTY).integer_or_default(), 42);
        assert!(!validate_integer("101".into(), &QTY).valid);
        assert!(!validate_integer((-1i64).into(), &QTY).valid);
        let bad = validate_integer("four".into(), &QTY);
        assert!(!bad.valid);
        assert_eq!(bad.integer_or_default(), 0);
        assert_eq!(bad.entry, FieldValue::Text("four".into()));
    }

    #[test]
    fn test_float_bounds() {
        assert!(validate_float("-5.25".into(), &DISCOUNT).valid);
        assert!(validate_float("".into(), &DISCOUNT).valid);
        let bad = validate_float("3".into(), &DISCOUNT);
        assert!(!bad.valid);
        assert_eq!(bad.real_or_default(), 0.0);
        assert!(!validate_float("NaN".into(), &DISCOUNT).valid);
    }

    #[test]
    fn test_date_normalization() {
        let result = validate_date("08/22/2006".into(), "Date");
        assert!(result.valid);
        assert_eq!(result.text_or_default(), "2006-08-22");
        assert_eq!(display_date("2006-08-22"), "08/22/2006");
    }

    #[test]
    fn test_date_rejects_impossible_day() {
        let result = validate_date("2009-02-29".into(), "Date");
        assert!(!result.valid);
        assert!(validate_date("2008-02-29".into(), "Date").valid);
        assert!(!validate_date(FieldValue::Null, "Date").valid);
    }

    #[test]
    fn test_pattern() {
        let re = Regex::new("^[A-Z]+$").unwrap();
        let rule = PatternRule {
            label: "Assembly",
            description: "letters A-Z only",
            required: true,
            max_len: 4,
        };
        assert!(validate_pattern("ABC".into(), &re, &rule).valid);
        assert!(!validate_pattern("AB1".into(), &re, &rule).valid);
        assert!(!validate_pattern("ABCDE".into(), &re, &rule).valid);
        assert!(!validate_pattern("".into(), &re, &rule).valid);
    }

    #[test]
    fn test_boolean() {
        assert!(validate_boolean("X".into(), "Installed").bool_or_default());
        assert!(!validate_boolean("".into(), "Installed").bool_or_default());
        assert!(validate_boolean(1i64.into(), "Installed").bool_or_default());
        assert!(!validate_boolean("maybe".into(), "Installed").valid);
    }
}
