//! Order entity - one purchase order and its money totals

use serde::{Deserialize, Serialize};

use crate::core::record::{FieldName, Properties, Record, Tracked};
use crate::core::record_set::{Query, RecordSet};
use crate::core::store::{Store, StoreError};
use crate::core::validate::{
    display_date, validate_date, validate_float, validate_text, FieldValue, FloatRule, TextRule,
    Validation,
};
use crate::entities::order_line::OrderLine;

pub(crate) const ORDER_NUMBER: TextRule = TextRule::required("Order number", 20);
const SOURCE: TextRule = TextRule::optional("Source", 40);
const REMARKS: TextRule = TextRule::optional("Remarks", 255);

const fn non_negative(label: &'static str) -> FloatRule {
    FloatRule {
        label,
        min: Some(0.0),
        max: None,
        blank_is_zero: true,
    }
}

const SUBTOTAL: FloatRule = non_negative("Subtotal");
const SHIPPING: FloatRule = non_negative("Shipping");
const TAX: FloatRule = non_negative("Tax");
const TOTAL: FloatRule = non_negative("Total");
const DISCOUNT: FloatRule = FloatRule {
    label: "Discount",
    min: None,
    max: Some(0.0),
    blank_is_zero: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderField {
    OrderNumber,
    Date,
    Source,
    Subtotal,
    Shipping,
    Discount,
    Tax,
    Total,
    Remarks,
}

impl FieldName for OrderField {
    const ALL: &'static [Self] = &[
        OrderField::OrderNumber,
        OrderField::Date,
        OrderField::Source,
        OrderField::Subtotal,
        OrderField::Shipping,
        OrderField::Discount,
        OrderField::Tax,
        OrderField::Total,
        OrderField::Remarks,
    ];

    fn column(self) -> &'static str {
        match self {
            OrderField::OrderNumber => "order_number",
            OrderField::Date => "date",
            OrderField::Source => "source",
            OrderField::Subtotal => "subtotal",
            OrderField::Shipping => "shipping",
            OrderField::Discount => "discount",
            OrderField::Tax => "tax",
            OrderField::Total => "total",
            OrderField::Remarks => "remarks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            OrderField::OrderNumber => ORDER_NUMBER.label,
            OrderField::Date => "Date",
            OrderField::Source => SOURCE.label,
            OrderField::Subtotal => SUBTOTAL.label,
            OrderField::Shipping => SHIPPING.label,
            OrderField::Discount => DISCOUNT.label,
            OrderField::Tax => TAX.label,
            OrderField::Total => TOTAL.label,
            OrderField::Remarks => REMARKS.label,
        }
    }

    fn tooltip(self) -> &'static str {
        match self {
            OrderField::OrderNumber => "Vendor order or invoice number",
            OrderField::Date => "Order date, MM/DD/YYYY",
            OrderField::Source => "Vendor the order was placed with",
            OrderField::Subtotal => "Sum of the line items",
            OrderField::Shipping => "Shipping charge",
            OrderField::Discount => "Discount, entered as zero or a negative amount",
            OrderField::Tax => "Sales tax",
            OrderField::Total => "Amount paid",
            OrderField::Remarks => "Optional notes about the order",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderProperties {
    pub order_number: String,
    /// Stored as `YYYY-MM-DD`
    pub date: String,
    pub source: String,
    pub subtotal: f64,
    pub shipping: f64,
    pub discount: f64,
    pub tax: f64,
    pub total: f64,
    pub remarks: String,
}

impl Properties for OrderProperties {
    type Field = OrderField;

    fn get(&self, field: OrderField) -> FieldValue {
        match field {
            OrderField::OrderNumber => self.order_number.as_str().into(),
            OrderField::Date => self.date.as_str().into(),
            OrderField::Source => self.source.as_str().into(),
            OrderField::Subtotal => self.subtotal.into(),
            OrderField::Shipping => self.shipping.into(),
            OrderField::Discount => self.discount.into(),
            OrderField::Tax => self.tax.into(),
            OrderField::Total => self.total.into(),
            OrderField::Remarks => self.remarks.as_str().into(),
        }
    }
}

/// A row of the `orders` table
#[derive(Debug, Clone)]
pub struct Order {
    state: Tracked<OrderProperties>,
}

impl Order {
    pub fn order_number(&self) -> &str {
        &self.state.current().order_number
    }

    pub fn set_order_number(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &ORDER_NUMBER);
        self.state.apply(OrderField::OrderNumber, &result, |p| {
            p.order_number = result.text_or_default()
        });
        result
    }

    /// Order date as `MM/DD/YYYY`
    pub fn date(&self) -> String {
        display_date(&self.state.current().date)
    }

    /// Order date as stored, `YYYY-MM-DD`
    pub fn stored_date(&self) -> &str {
        &self.state.current().date
    }

    /// Accepts `YYYY-MM-DD` or `MM/DD/YYYY`
    pub fn set_date(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_date(input.into(), "Date");
        self.state
            .apply(OrderField::Date, &result, |p| p.date = result.text_or_default());
        result
    }

    pub fn source(&self) -> &str {
        &self.state.current().source
    }

    pub fn set_source(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &SOURCE);
        self.state
            .apply(OrderField::Source, &result, |p| p.source = result.text_or_default());
        result
    }

    pub fn subtotal(&self) -> f64 {
        self.state.current().subtotal
    }

    pub fn set_subtotal(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_float(input.into(), &SUBTOTAL);
        self.state
            .apply(OrderField::Subtotal, &result, |p| p.subtotal = result.real_or_default());
        result
    }

    pub fn shipping(&self) -> f64 {
        self.state.current().shipping
    }

    pub fn set_shipping(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_float(input.into(), &SHIPPING);
        self.state
            .apply(OrderField::Shipping, &result, |p| p.shipping = result.real_or_default());
        result
    }

    pub fn discount(&self) -> f64 {
        self.state.current().discount
    }

    pub fn set_discount(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_float(input.into(), &DISCOUNT);
        self.state
            .apply(OrderField::Discount, &result, |p| p.discount = result.real_or_default());
        result
    }

    pub fn tax(&self) -> f64 {
        self.state.current().tax
    }

    pub fn set_tax(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_float(input.into(), &TAX);
        self.state
            .apply(OrderField::Tax, &result, |p| p.tax = result.real_or_default());
        result
    }

    pub fn total(&self) -> f64 {
        self.state.current().total
    }

    pub fn set_total(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_float(input.into(), &TOTAL);
        self.state
            .apply(OrderField::Total, &result, |p| p.total = result.real_or_default());
        result
    }

    pub fn remarks(&self) -> &str {
        &self.state.current().remarks
    }

    pub fn set_remarks(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &REMARKS);
        self.state
            .apply(OrderField::Remarks, &result, |p| p.remarks = result.text_or_default());
        result
    }

    /// Subtotal plus shipping, discount and tax
    pub fn computed_total(&self) -> f64 {
        self.subtotal() + self.shipping() + self.discount() + self.tax()
    }

    /// Lines of this order, in line order
    pub fn lines(&self, store: &Store) -> Result<RecordSet<OrderLine>, StoreError> {
        RecordSet::query(
            store,
            &Query::filter("order_number", self.order_number()).order_by("line"),
        )
    }

    /// Sum of the line costs
    pub fn lines_subtotal(&self, store: &Store) -> Result<f64, StoreError> {
        Ok(self.lines(store)?.iter().map(OrderLine::line_cost).sum())
    }

    /// One past the highest line number in use
    pub fn next_line_number(&self, store: &Store) -> Result<i64, StoreError> {
        Ok(self
            .lines(store)?
            .iter()
            .map(OrderLine::line)
            .max()
            .unwrap_or(0)
            + 1)
    }
}

impl Record for Order {
    type Field = OrderField;
    type Properties = OrderProperties;

    const TABLE: &'static str = "orders";
    const KIND: &'static str = "order";
    const KEY_FIELD: Option<OrderField> = Some(OrderField::OrderNumber);
    const ORDER_BY: &'static str = "date";

    fn from_state(state: Tracked<OrderProperties>) -> Self {
        Self { state }
    }

    fn state(&self) -> &Tracked<OrderProperties> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Tracked<OrderProperties> {
        &mut self.state
    }

    fn set_field(&mut self, field: OrderField, input: FieldValue) -> Validation {
        match field {
            OrderField::OrderNumber => self.set_order_number(input),
            OrderField::Date => self.set_date(input),
            OrderField::Source => self.set_source(input),
            OrderField::Subtotal => self.set_subtotal(input),
            OrderField::Shipping => self.set_shipping(input),
            OrderField::Discount => self.set_discount(input),
            OrderField::Tax => self.set_tax(input),
            OrderField::Total => self.set_total(input),
            OrderField::Remarks => self.set_remarks(input),
        }
    }

    fn display_value(&self, field: OrderField) -> String {
        match field {
            OrderField::Date => self.date(),
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

    fn sample_order() -> Order {
        let mut order = Order::new();
        order.set_order_number("INV-1001");
        order.set_date("08/22/2006");
        order.set_source("Summit");
        order.set_subtotal("100.00");
        order.set_shipping(12.5);
        order.set_discount(-10.0);
        order.set_tax("7.25");
        order.set_total(109.75);
        order
    }

    #[test]
    fn test_date_display_and_storage() {
        let mut order = Order::new();
        assert!(order.set_date("2006-08-22").valid);
        assert_eq!(order.date(), "08/22/2006");
        assert_eq!(order.stored_date(), "2006-08-22");
    }

    #[test]
    fn test_invalid_calendar_date_rejected() {
        let mut order = sample_order();
        let result = order.set_date("2009-02-29");
        assert!(!result.valid);
        assert_eq!(order.date(), "");
        assert!(!order.is_element_valid());
    }

    #[test]
    fn test_money_sign_rules() {
        let mut order = sample_order();
        assert!(!order.set_discount(5.0).valid);
        assert_eq!(order.discount(), 0.0);
        assert!(order.set_discount("").valid);
        assert!(!order.set_shipping(-1.0).valid);
        assert!(!order.set_tax("-0.01").valid);
        assert!(!order.set_subtotal("-3").valid);
        assert!(!order.set_total(-100.0).valid);
        assert!(order.set_total("").valid);
    }

    #[test]
    fn test_computed_total() {
        let order = sample_order();
        assert!((order.computed_total() - 109.75).abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip_through_properties() {
        let order = sample_order();
        let copy = Order::from_properties(order.properties());
        assert_eq!(copy.date(), "08/22/2006");
        assert_eq!(copy.properties(), order.properties());
        assert!(copy.is_element_valid());
    }

    #[test]
    fn test_lines_and_subtotal() {
        let store = Store::in_memory().unwrap();
        let mut order = sample_order();
        order.add(&store).unwrap();
        assert_eq!(order.next_line_number(&store).unwrap(), 1);

        for (line, cost, qty) in [(1, 20.0, 2), (2, 15.0, 4)] {
            let mut order_line = OrderLine::new();
            order_line.set_order_number("INV-1001");
            order_line.set_line(line);
            order_line.set_part_number("B7A-6051");
            order_line.set_cost_each(cost);
            order_line.set_quantity(qty);
            order_line.add(&store).unwrap();
        }

        let lines = order.lines(&store).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.get(0).unwrap().line(), 1);
        assert!((order.lines_subtotal(&store).unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(order.next_line_number(&store).unwrap(), 3);
    }

    #[test]
    fn test_required_fields_reject_blank() {
        let order = sample_order();
        assert_required_reject_blank(&order, &[OrderField::OrderNumber, OrderField::Date]);
        assert_properties_roundtrip(&order);
    }
}
