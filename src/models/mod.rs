//! Domain models for the learning tracker.
//!
//! - [`DayRecord`]: the only persisted entity, one per calendar date. Records are
//!   created explicitly or by an update on a date with no row, and never deleted.
//! - [`CreateDayInput`] / [`UpdateDayInput`]: request bodies. Updates are partial.
//! - [`ImportedDay`]: a normalised row carried by the SQLite to PostgreSQL transfer.
//! - Response envelopes for the root, health and error bodies.

mod day;
mod response;

pub use day::*;
pub use response::*;
