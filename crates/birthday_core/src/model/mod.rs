//! Domain model for recurring birthday records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the textual `dd-mm` date format and its parsing rules.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`, not by list position.
//! - Dates carry no year; a record recurs every year.

pub mod birthday;
