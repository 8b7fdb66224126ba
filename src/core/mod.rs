//! Core module - fundamental types and utilities

pub mod bulk;
pub mod config;
pub mod export;
pub mod record;
pub mod record_set;
pub mod schema;
pub mod store;
pub mod validate;
pub mod workspace;

pub use bulk::{change_part_number, rename_assembly, BulkError, BulkFailure, BulkOutcome};
pub use config::{Config, ConfigError, WindowGeometry};
pub use export::{export_assembly_list, export_assembly_list_to_path, ExportError, CSV_HEADER};
pub use record::{FieldName, FieldTracker, Properties, Record, Tracked};
pub use record_set::{Query, RangeEnd, RecordSet};
pub use store::{Store, StoreError};
pub use validate::{FieldValue, Validation};
pub use workspace::Workspace;
