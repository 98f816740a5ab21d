//! Flutter-facing bindings for the birthday notifier core.

pub mod api;
