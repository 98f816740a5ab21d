//! Notification delivery contracts.
//!
//! # Responsibility
//! - Define the sink that receives resolved birthday greetings.
//! - Build WhatsApp deep links used by mobile shells.
//!
//! # Invariants
//! - Delivery is fire-and-forget; failures never reach the date engine.

pub mod notifier;
pub mod whatsapp;
