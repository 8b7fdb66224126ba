//! PartsTracker: a catalogue of automotive parts, the assembly tree they are
//! installed in, and the purchase orders they were bought on.
//!
//! Everything lives in one SQLite data file. The library exposes the record
//! layer ([`core`], [`entities`]), the edit-form state machine ([`dialog`])
//! and the list views built on top ([`page`]); the `ptrack` binary drives
//! them from the command line.

pub mod cli;
pub mod core;
pub mod dialog;
pub mod entities;
pub mod logging;
pub mod page;
