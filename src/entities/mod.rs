//! Record types, one per table
//!
//! **Catalogue:**
//! - [`Part`] - a part number with its description and usual source
//! - [`Item`] - one use of a part at an assembly position
//!
//! **Purchasing:**
//! - [`Order`] - a purchase order with money totals
//! - [`OrderLine`] - one part bought on one order
//!
//! **Lookup lists:**
//! - [`Condition`] - states an item can be in
//! - [`Source`] - vendors

pub mod condition;
pub mod item;
pub mod order;
pub mod order_line;
pub mod part;
pub mod source;

pub use condition::{Condition, ConditionField, ConditionProperties};
pub use item::{Item, ItemField, ItemProperties};
pub use order::{Order, OrderField, OrderProperties};
pub use order_line::{OrderLine, OrderLineField, OrderLineProperties};
pub use part::{Part, PartField, PartProperties};
pub use source::{Source, SourceField, SourceProperties};
