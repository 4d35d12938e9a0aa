//! # Document board: a stateful subscriber.
//!
//! [`DocumentBoard`] owns a set of documents and keeps them in sync with the
//! engine's status events, the way an operator dashboard would. Besides the
//! documents it collects operator [`Notice`]s and exposes aggregate counts
//! through [`BoardSummary`].
//!
//! ## Notices
//! | Event                               | Notice                                  |
//! |-------------------------------------|-----------------------------------------|
//! | status `error`                      | `"{file} flagged: {message}"` (error)   |
//! | status `delivered`                  | `"{file} delivered to {insurer}"` (success) |
//! | status `ready` with a message       | the message (info)                      |
//! | stream `false`                      | `"Streaming cycle completed."` (info)   |
//! | toast                               | passed through unchanged                |
//!
//! Events for unknown ids and transitions to the current status are ignored.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;

use crate::documents::document::{DEFAULT_ERROR_MESSAGE, Document, WorkflowStatus};
use crate::events::{Event, StatusChange, ToastVariant};
use crate::subscribers::Subscribe;

/// Message shown when an activity cycle ends.
pub const CYCLE_COMPLETED: &str = "Streaming cycle completed.";

/// Operator-facing notice derived from an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub variant: ToastVariant,
    pub message: String,
}

/// Aggregate counts over the board's documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub total: usize,
    /// Documents requiring a qualified electronic signature.
    pub qes: usize,
    /// Documents requiring an advanced electronic signature.
    pub aes: usize,
    pub email: usize,
    pub api: usize,
    /// Documents currently in `error`.
    pub exceptions: usize,
}

#[derive(Debug, Default)]
struct BoardState {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
    streaming: bool,
    notices: Vec<Notice>,
}

impl BoardState {
    fn apply(&mut self, change: &StatusChange) {
        let Some(&pos) = self.index.get(&change.id) else {
            return;
        };
        let doc = &mut self.documents[pos];
        if !doc.apply_status(change.status, change.message(), Utc::now()) {
            return;
        }

        let notice = match change.status {
            WorkflowStatus::Error => Some(Notice {
                variant: ToastVariant::Error,
                message: format!(
                    "{} flagged: {}",
                    doc.document_filename,
                    doc.error_message.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE)
                ),
            }),
            WorkflowStatus::Delivered => Some(Notice {
                variant: ToastVariant::Success,
                message: format!("{} delivered to {}", doc.document_filename, doc.insurer),
            }),
            WorkflowStatus::Ready => change.message().map(|m| Notice {
                variant: ToastVariant::Info,
                message: m.to_string(),
            }),
            _ => None,
        };
        self.notices.extend(notice);
    }
}

/// Subscriber that applies status events to the documents it owns.
#[derive(Debug, Default)]
pub struct DocumentBoard {
    state: Mutex<BoardState>,
}

impl DocumentBoard {
    /// Creates a board over `documents`. A later duplicate id shadows an earlier one.
    pub fn new(documents: Vec<Document>) -> Self {
        let index = documents
            .iter()
            .enumerate()
            .map(|(pos, doc)| (doc.id.clone(), pos))
            .collect();
        Self {
            state: Mutex::new(BoardState {
                documents,
                index,
                ..BoardState::default()
            }),
        }
    }

    /// Snapshot of one document.
    pub fn document(&self, id: &str) -> Option<Document> {
        let state = self.lock();
        state.index.get(id).map(|&pos| state.documents[pos].clone())
    }

    /// Snapshot of all documents, in intake order.
    pub fn documents(&self) -> Vec<Document> {
        self.lock().documents.clone()
    }

    /// Last activity value seen on the stream.
    pub fn is_streaming(&self) -> bool {
        self.lock().streaming
    }

    /// Notices collected so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.lock().notices.clone()
    }

    /// Counts by signature requirement, delivery channel and exception state.
    pub fn summary(&self) -> BoardSummary {
        let state = self.lock();
        let mut s = BoardSummary {
            total: state.documents.len(),
            ..BoardSummary::default()
        };
        for doc in &state.documents {
            match doc.signature_requirement.as_str() {
                "QES" => s.qes += 1,
                "AES" => s.aes += 1,
                _ => {}
            }
            match doc.delivery_channel.as_str() {
                "Email" => s.email += 1,
                "API" => s.api += 1,
                _ => {}
            }
            if doc.workflow_status == WorkflowStatus::Error {
                s.exceptions += 1;
            }
        }
        s
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Subscribe for DocumentBoard {
    fn on_event(&self, event: &Event) {
        let mut state = self.lock();
        match event {
            Event::Status(change) => state.apply(change),
            Event::Stream { active } => {
                state.streaming = *active;
                if !*active {
                    state.notices.push(Notice {
                        variant: ToastVariant::Info,
                        message: CYCLE_COMPLETED.to_string(),
                    });
                }
            }
            Event::Toast { variant, message } => state.notices.push(Notice {
                variant: *variant,
                message: message.clone(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "document-board"
    }
}
