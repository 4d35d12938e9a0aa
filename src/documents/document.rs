//! # Document entity and lifecycle status.
//!
//! A [`Document`] is created once by [ingestion](crate::ingest) and then held
//! by the caller. The engine never touches it: it only copies `id` and
//! `insurer` into its timers and emits status events by id. Applying those
//! events to a document is the consumer's job ([`Document::apply_status`]).
//!
//! ## Lifecycle
//! ```text
//! pending ──► ready ──► signing ──► routed ──► delivered
//!                          │
//!                          └─(fault at routed attempt)─► error ──► ready ──► delivered
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback error explanation when an `error` event carries no message.
pub const DEFAULT_ERROR_MESSAGE: &str = "Insurer requested manual review.";

/// Lifecycle state of a document.
///
/// The lowercase names are part of the event wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Ready,
    Signing,
    Routed,
    Delivered,
    Error,
}

impl WorkflowStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Ready => "ready",
            WorkflowStatus::Signing => "signing",
            WorkflowStatus::Routed => "routed",
            WorkflowStatus::Delivered => "delivered",
            WorkflowStatus::Error => "error",
        }
    }

    /// Human-readable label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "Awaiting validation",
            WorkflowStatus::Ready => "Ready for signature",
            WorkflowStatus::Signing => "Signature in progress",
            WorkflowStatus::Routed => "Dispatched to insurer",
            WorkflowStatus::Delivered => "Confirmation logged",
            WorkflowStatus::Error => "Requires attention",
        }
    }

    /// 1-based position on the progress timeline.
    ///
    /// `error` sits on the signing step, where the detour starts.
    pub fn step_index(&self) -> u8 {
        match self {
            WorkflowStatus::Pending => 1,
            WorkflowStatus::Ready => 2,
            WorkflowStatus::Signing | WorkflowStatus::Error => 3,
            WorkflowStatus::Routed => 4,
            WorkflowStatus::Delivered => 5,
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a document's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: WorkflowStatus,
    pub at: DateTime<Utc>,
}

/// Internal representation of an intake record.
///
/// Descriptive fields are opaque: they are carried through unchanged and only
/// `insurer` is read by the engine (for error/recovery messages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// `employee_id` + `-` + `document_filename`.
    pub id: String,
    pub insurer: String,
    pub document_type: String,
    pub employee_id: String,
    pub employee_name: String,
    pub document_filename: String,
    pub signature_requirement: String,
    pub delivery_channel: String,
    pub delivery_target: String,
    pub notes: String,
    pub received_date: DateTime<Utc>,
    pub workflow_status: WorkflowStatus,
    /// Append-only; the last entry always matches `workflow_status`.
    pub status_history: Vec<StatusEntry>,
    pub error_message: Option<String>,
}

impl Document {
    /// Creates a pending document whose history starts at `received_date`.
    pub fn new(
        employee_id: impl Into<String>,
        document_filename: impl Into<String>,
        received_date: DateTime<Utc>,
    ) -> Self {
        let employee_id = employee_id.into();
        let document_filename = document_filename.into();
        Self {
            id: document_id(&employee_id, &document_filename),
            insurer: String::new(),
            document_type: String::new(),
            employee_id,
            employee_name: String::new(),
            document_filename,
            signature_requirement: String::new(),
            delivery_channel: String::new(),
            delivery_target: String::new(),
            notes: String::new(),
            received_date,
            workflow_status: WorkflowStatus::Pending,
            status_history: vec![StatusEntry {
                status: WorkflowStatus::Pending,
                at: received_date,
            }],
            error_message: None,
        }
    }

    /// Sets the insurer name.
    #[must_use]
    pub fn with_insurer(mut self, insurer: impl Into<String>) -> Self {
        self.insurer = insurer.into();
        self
    }

    /// Applies a status transition received from the engine.
    ///
    /// Returns `false` (and changes nothing) when `status` equals the current
    /// status. Otherwise appends to the history, and sets or clears
    /// `error_message`: `error` stores `message` (or
    /// [`DEFAULT_ERROR_MESSAGE`]), any other status clears it.
    pub fn apply_status(
        &mut self,
        status: WorkflowStatus,
        message: Option<&str>,
        at: DateTime<Utc>,
    ) -> bool {
        if self.workflow_status == status {
            return false;
        }
        self.workflow_status = status;
        self.status_history.push(StatusEntry { status, at });
        self.error_message = match status {
            WorkflowStatus::Error => {
                Some(message.unwrap_or(DEFAULT_ERROR_MESSAGE).to_string())
            }
            _ => None,
        };
        true
    }
}

/// Builds the stable document id.
pub fn document_id(employee_id: &str, document_filename: &str) -> String {
    format!("{employee_id}-{document_filename}")
}

/// Splits a PascalCase document type into words: `PolicyRenewal` → `Policy Renewal`.
///
/// A space is inserted only between a lowercase letter and the uppercase
/// letter that follows it, so acronyms stay intact.
pub fn format_doc_type(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut prev: Option<char> = None;
    for c in value.chars() {
        if let Some(p) = prev {
            if p.is_ascii_lowercase() && c.is_ascii_uppercase() {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}
