//! Order line entity - one part bought on one order

use serde::{Deserialize, Serialize};

use crate::core::record::{FieldName, Properties, Record, Tracked};
use crate::core::store::{Store, StoreError};
use crate::core::validate::{
    validate_float, validate_integer, validate_text, FieldValue, FloatRule, IntRule, TextRule,
    Validation,
};
use crate::entities::order::{Order, ORDER_NUMBER};
use crate::entities::part::validate_part_number;

const LINE: IntRule = IntRule {
    label: "Line",
    min: 1,
    max: 999,
    blank_is_zero: false,
};
const COST_EACH: FloatRule = FloatRule {
    label: "Cost each",
    min: Some(0.0),
    max: None,
    blank_is_zero: true,
};
const QUANTITY: IntRule = IntRule {
    label: "Quantity",
    min: 0,
    max: 9999,
    blank_is_zero: true,
};
const REMARKS: TextRule = TextRule::optional("Remarks", 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderLineField {
    OrderNumber,
    Line,
    PartNumber,
    CostEach,
    Quantity,
    Remarks,
}

impl FieldName for OrderLineField {
    const ALL: &'static [Self] = &[
        OrderLineField::OrderNumber,
        OrderLineField::Line,
        OrderLineField::PartNumber,
        OrderLineField::CostEach,
        OrderLineField::Quantity,
        OrderLineField::Remarks,
    ];

    fn column(self) -> &'static str {
        match self {
            OrderLineField::OrderNumber => "order_number",
            OrderLineField::Line => "line",
            OrderLineField::PartNumber => "part_number",
            OrderLineField::CostEach => "cost_each",
            OrderLineField::Quantity => "quantity",
            OrderLineField::Remarks => "remarks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            OrderLineField::OrderNumber => ORDER_NUMBER.label,
            OrderLineField::Line => LINE.label,
            OrderLineField::PartNumber => "Part number",
            OrderLineField::CostEach => COST_EACH.label,
            OrderLineField::Quantity => QUANTITY.label,
            OrderLineField::Remarks => REMARKS.label,
        }
    }

    fn tooltip(self) -> &'static str {
        match self {
            OrderLineField::OrderNumber => "Order this line belongs to",
            OrderLineField::Line => "Line number on the order, 1 to 999",
            OrderLineField::PartNumber => "Part bought on this line",
            OrderLineField::CostEach => "Unit price",
            OrderLineField::Quantity => "Units bought",
            OrderLineField::Remarks => "Optional notes about the line",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderLineProperties {
    pub order_number: String,
    pub line: i64,
    pub part_number: String,
    pub cost_each: f64,
    pub quantity: i64,
    pub remarks: String,
}

impl Properties for OrderLineProperties {
    type Field = OrderLineField;

    fn get(&self, field: OrderLineField) -> FieldValue {
        match field {
            OrderLineField::OrderNumber => self.order_number.as_str().into(),
            OrderLineField::Line => self.line.into(),
            OrderLineField::PartNumber => self.part_number.as_str().into(),
            OrderLineField::CostEach => self.cost_each.into(),
            OrderLineField::Quantity => self.quantity.into(),
            OrderLineField::Remarks => self.remarks.as_str().into(),
        }
    }
}

/// A row of the `order_lines` table
#[derive(Debug, Clone)]
pub struct OrderLine {
    state: Tracked<OrderLineProperties>,
}

impl OrderLine {
    pub fn order_number(&self) -> &str {
        &self.state.current().order_number
    }

    pub fn set_order_number(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &ORDER_NUMBER);
        self.state.apply(OrderLineField::OrderNumber, &result, |p| {
            p.order_number = result.text_or_default()
        });
        result
    }

    pub fn line(&self) -> i64 {
        self.state.current().line
    }

    pub fn set_line(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_integer(input.into(), &LINE);
        self.state
            .apply(OrderLineField::Line, &result, |p| p.line = result.integer_or_default());
        result
    }

    pub fn part_number(&self) -> &str {
        &self.state.current().part_number
    }

    pub fn set_part_number(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_part_number(input.into());
        self.state.apply(OrderLineField::PartNumber, &result, |p| {
            p.part_number = result.text_or_default()
        });
        result
    }

    pub fn cost_each(&self) -> f64 {
        self.state.current().cost_each
    }

    pub fn set_cost_each(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_float(input.into(), &COST_EACH);
        self.state.apply(OrderLineField::CostEach, &result, |p| {
            p.cost_each = result.real_or_default()
        });
        result
    }

    pub fn quantity(&self) -> i64 {
        self.state.current().quantity
    }

    pub fn set_quantity(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_integer(input.into(), &QUANTITY);
        self.state.apply(OrderLineField::Quantity, &result, |p| {
            p.quantity = result.integer_or_default()
        });
        result
    }

    pub fn remarks(&self) -> &str {
        &self.state.current().remarks
    }

    pub fn set_remarks(&mut self, input: impl Into<FieldValue>) -> Validation {
        let result = validate_text(input.into(), &REMARKS);
        self.state.apply(OrderLineField::Remarks, &result, |p| {
            p.remarks = result.text_or_default()
        });
        result
    }

    /// Unit price times quantity
    pub fn line_cost(&self) -> f64 {
        self.cost_each() * self.quantity() as f64
    }

    /// The order this line belongs to
    pub fn order(&self, store: &Store) -> Result<Order, StoreError> {
        Order::fetch_by_key(store, self.order_number())
    }
}

impl Record for OrderLine {
    type Field = OrderLineField;
    type Properties = OrderLineProperties;

    const TABLE: &'static str = "order_lines";
    const KIND: &'static str = "order line";
    const KEY_FIELD: Option<OrderLineField> = None;
    const ORDER_BY: &'static str = "order_number";

    fn from_state(state: Tracked<OrderLineProperties>) -> Self {
        Self { state }
    }

    fn state(&self) -> &Tracked<OrderLineProperties> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Tracked<OrderLineProperties> {
        &mut self.state
    }

    fn set_field(&mut self, field: OrderLineField, input: FieldValue) -> Validation {
        match field {
            OrderLineField::OrderNumber => self.set_order_number(input),
            OrderLineField::Line => self.set_line(input),
            OrderLineField::PartNumber => self.set_part_number(input),
            OrderLineField::CostEach => self.set_cost_each(input),
            OrderLineField::Quantity => self.set_quantity(input),
            OrderLineField::Remarks => self.set_remarks(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::test_support::{
        assert_properties_roundtrip, assert_required_reject_blank,
    };

    #[test]
    fn test_line_cost() {
        let mut line = OrderLine::new();
        line.set_cost_each("12.50");
        line.set_quantity("3");
        assert!((line.line_cost() - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_line_number_required() {
        let mut line = OrderLine::new();
        assert!(!line.set_line("").valid);
        assert!(!line.set_line(0i64).valid);
        assert!(line.set_line("1").valid);
        assert!(line.set_cost_each("").valid);
        assert!(!line.set_cost_each(-2.0).valid);
    }

    #[test]
    fn test_line_finds_its_order() {
        let store = Store::in_memory().unwrap();
        let mut order = Order::new();
        order.set_order_number("PO-7");
        order.set_date("01/15/2010");
        order.add(&store).unwrap();

        let mut line = OrderLine::new();
        line.set_order_number("PO-7");
        line.set_line(1i64);
        line.set_part_number("c8az-1");
        line.add(&store).unwrap();

        assert_eq!(line.part_number(), "C8AZ-1");
        assert_eq!(line.order(&store).unwrap().record_id(), order.record_id());
    }

    #[test]
    fn test_required_fields_reject_blank() {
        let line = OrderLine::from_properties(OrderLineProperties {
            order_number: "PO-7".to_string(),
            line: 2,
            part_number: "C8AZ-1".to_string(),
            cost_each: 4.5,
            quantity: 3,
            remarks: "backorder".to_string(),
        });
        assert!(line.is_element_valid());
        assert_required_reject_blank(
            &line,
            &[
                OrderLineField::OrderNumber,
                OrderLineField::Line,
                OrderLineField::PartNumber,
            ],
        );
        assert_properties_roundtrip(&line);
    }
}
