//! CLI command implementations

pub mod asm;
pub mod completions;
pub mod condition;
pub mod file;
pub mod item;
pub mod order;
pub mod part;
pub mod source;
