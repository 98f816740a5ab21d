//! Pure evaluation of birthday records against a reference date.
//!
//! # Responsibility
//! - Decide which records fall on "today" and which are coming up soon.
//! - Resolve the greeting delivered for each match.
//!
//! # Invariants
//! - No I/O, no logging, no ambient state: "today" is always an input.
//! - Malformed dates degrade to "never today, maximal distance".

pub mod date_window;
pub mod greeting;
