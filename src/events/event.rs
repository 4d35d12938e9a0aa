//! # Lifecycle events published by the engine.
//!
//! [`Event`] is a tagged union with three kinds:
//! - **stream**: the activity signal flipped (`{type:"stream", active}`)
//! - **status**: one document changed lifecycle state (`{type:"status", id, status, context?}`)
//! - **toast**: an advisory notice not tied to a document (`{type:"toast", variant, message}`)
//!
//! Events are immutable once created. Field names and tag values are the wire
//! contract for any consumer, so the serde representation is pinned by tests.
//!
//! ## Example
//! ```rust
//! use signflow::{Event, WorkflowStatus};
//!
//! let ev = Event::status("EMP001-file.pdf", WorkflowStatus::Error)
//!     .with_message("LINK4 validation required additional data.");
//!
//! let json = serde_json::to_value(&ev).unwrap();
//! assert_eq!(json["type"], "status");
//! assert_eq!(json["status"], "error");
//! assert_eq!(json["context"]["message"], "LINK4 validation required additional data.");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::documents::WorkflowStatus;

/// Severity of a [`Event::Toast`] notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Info,
    Success,
    Error,
}

impl ToastVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastVariant::Info => "info",
            ToastVariant::Success => "success",
            ToastVariant::Error => "error",
        }
    }
}

impl fmt::Display for ToastVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional explanation attached to a status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusContext {
    pub message: String,
}

/// A lifecycle transition for one document, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: String,
    pub status: WorkflowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<StatusContext>,
}

impl StatusChange {
    /// Context message, if any.
    pub fn message(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.message.as_str())
    }
}

/// Event delivered to every subscriber of the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// Activity signal changed.
    Stream { active: bool },
    /// A document moved to a new lifecycle state.
    Status(StatusChange),
    /// Advisory notice (e.g. empty input).
    Toast {
        variant: ToastVariant,
        message: String,
    },
}

impl Event {
    /// Creates a status event without context.
    pub fn status(id: impl Into<String>, status: WorkflowStatus) -> Self {
        Event::Status(StatusChange {
            id: id.into(),
            status,
            context: None,
        })
    }

    /// Creates an activity event.
    #[inline]
    pub fn stream(active: bool) -> Self {
        Event::Stream { active }
    }

    /// Creates an advisory notice.
    pub fn toast(variant: ToastVariant, message: impl Into<String>) -> Self {
        Event::Toast {
            variant,
            message: message.into(),
        }
    }

    /// Attaches a context message. No-op on non-status events.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        if let Event::Status(change) = &mut self {
            change.context = Some(StatusContext {
                message: message.into(),
            });
        }
        self
    }

    /// Wire tag of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Stream { .. } => "stream",
            Event::Status(_) => "status",
            Event::Toast { .. } => "toast",
        }
    }

    /// The status change, if this is a status event.
    #[inline]
    pub fn as_status(&self) -> Option<&StatusChange> {
        match self {
            Event::Status(change) => Some(change),
            _ => None,
        }
    }

    /// The activity value, if this is a stream event.
    #[inline]
    pub fn as_stream(&self) -> Option<bool> {
        match self {
            Event::Stream { active } => Some(*active),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_wire_shape() {
        let v = serde_json::to_value(Event::stream(true)).unwrap();
        assert_eq!(v, json!({"type": "stream", "active": true}));
    }

    #[test]
    fn test_status_without_context_omits_field() {
        let v = serde_json::to_value(Event::status("A", WorkflowStatus::Signing)).unwrap();
        assert_eq!(v, json!({"type": "status", "id": "A", "status": "signing"}));
    }

    #[test]
    fn test_status_with_context_wire_shape() {
        let ev = Event::status("A", WorkflowStatus::Ready).with_message("Manual remediation complete.");
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            v,
            json!({
                "type": "status",
                "id": "A",
                "status": "ready",
                "context": {"message": "Manual remediation complete."}
            })
        );

        let back: Event = serde_json::from_value(v).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn test_toast_wire_shape() {
        let v = serde_json::to_value(Event::toast(ToastVariant::Info, "Nothing queued for signing."))
            .unwrap();
        assert_eq!(
            v,
            json!({"type": "toast", "variant": "info", "message": "Nothing queued for signing."})
        );
    }

    #[test]
    fn test_with_message_ignores_non_status() {
        let ev = Event::stream(false).with_message("ignored");
        assert_eq!(ev, Event::stream(false));
        assert_eq!(ev.kind(), "stream");
        assert_eq!(ev.as_stream(), Some(false));
        assert!(ev.as_status().is_none());
    }
}
