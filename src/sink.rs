//! Presentation events emitted to the host UI layer.
//!
//! The engine never renders anything itself; it publishes these events on
//! an unbounded channel and the host (panel, CLI printer, test harness)
//! consumes them.

use avanza::CourtageClass;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::engine::decoder::OrderFacts;

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// One event for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiUpdate {
    /// Re-render the tier panel.
    #[serde(rename_all = "camelCase")]
    Render {
        facts: OrderFacts,
        /// Class to highlight; absent when it is not known (foreign orders).
        current: Option<CourtageClass>,
        is_foreign: bool,
    },
    /// Show a transient notification.
    #[serde(rename_all = "camelCase")]
    Notify { message: String, severity: Severity },
}

/// Sending half of the presentation channel.
///
/// A vanished receiver is not an error; the host page stays usable without
/// the panel.
#[derive(Clone)]
pub struct PresentationSink {
    tx: mpsc::UnboundedSender<UiUpdate>,
}

impl PresentationSink {
    /// Create a sink plus the receiving half for the host layer.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn render(&self, facts: OrderFacts, current: Option<CourtageClass>, is_foreign: bool) {
        let _ = self.tx.send(UiUpdate::Render {
            facts,
            current,
            is_foreign,
        });
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) {
        let _ = self.tx.send(UiUpdate::Notify {
            message: message.into(),
            severity,
        });
    }
}
