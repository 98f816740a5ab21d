//! Notifier trait and in-process implementations.
//!
//! # Invariants
//! - Implementations never log names, phones or message bodies.
//! - `OutboxNotifier` keeps deliveries in call order until drained.

use crate::notify::whatsapp::whatsapp_link;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Delivery failure reported by a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    pub channel: &'static str,
    pub message: String,
}

impl NotifyError {
    pub fn new(channel: &'static str, message: impl Into<String>) -> Self {
        Self {
            channel,
            message: message.into(),
        }
    }
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} delivery failed: {}", self.channel, self.message)
    }
}

impl Error for NotifyError {}

/// Sink for resolved birthday greetings.
pub trait Notifier {
    /// Short stable channel label used in logs.
    fn channel(&self) -> &'static str;

    /// Delivers `message` for `recipient_name` to `phone`.
    fn notify(&self, recipient_name: &str, message: &str, phone: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn channel(&self) -> &'static str {
        (**self).channel()
    }

    fn notify(&self, recipient_name: &str, message: &str, phone: &str) -> Result<(), NotifyError> {
        (**self).notify(recipient_name, message, phone)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn channel(&self) -> &'static str {
        (**self).channel()
    }

    fn notify(&self, recipient_name: &str, message: &str, phone: &str) -> Result<(), NotifyError> {
        (**self).notify(recipient_name, message, phone)
    }
}

/// Notifier that only writes a metadata log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn channel(&self) -> &'static str {
        "log"
    }

    fn notify(&self, recipient_name: &str, message: &str, phone: &str) -> Result<(), NotifyError> {
        info!(
            "event=birthday_notify module=notify status=ok channel=log name_chars={} message_chars={} has_phone={}",
            recipient_name.chars().count(),
            message.chars().count(),
            !phone.trim().is_empty()
        );
        Ok(())
    }
}

/// One pending greeting waiting for the platform shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub recipient_name: String,
    pub message: String,
    pub phone: String,
    /// Prefilled WhatsApp chat link.
    pub link: String,
}

/// Notifier that queues WhatsApp deliveries for a shell to post.
///
/// The mobile shell drains the outbox and shows one local notification per
/// delivery, whose tap action opens `link`.
#[derive(Debug, Default)]
pub struct OutboxNotifier {
    deliveries: Mutex<Vec<Delivery>>,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued delivery.
    pub fn drain(&self) -> Vec<Delivery> {
        match self.deliveries.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.deliveries.lock().map_or(0, |guard| guard.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for OutboxNotifier {
    fn channel(&self) -> &'static str {
        "whatsapp"
    }

    fn notify(&self, recipient_name: &str, message: &str, phone: &str) -> Result<(), NotifyError> {
        let delivery = Delivery {
            recipient_name: recipient_name.to_string(),
            message: message.to_string(),
            phone: phone.to_string(),
            link: whatsapp_link(phone, message),
        };
        self.deliveries
            .lock()
            .map_err(|_| NotifyError::new("whatsapp", "outbox lock poisoned"))?
            .push(delivery);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Notifier, OutboxNotifier};

    #[test]
    fn outbox_queues_in_order_and_drains() {
        let outbox = OutboxNotifier::new();
        outbox.notify("Ana", "Hi Ana", "+34 600").unwrap();
        outbox.notify("Bo", "Hi Bo", "").unwrap();
        assert_eq!(outbox.len(), 2);

        let drained = outbox.drain();
        assert_eq!(drained[0].recipient_name, "Ana");
        assert_eq!(drained[0].link, "https://wa.me/34600?text=Hi%20Ana");
        assert_eq!(drained[1].recipient_name, "Bo");
        assert!(outbox.is_empty());
    }
}
