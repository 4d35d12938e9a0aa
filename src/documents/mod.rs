//! Documents: the data model the engine reports on.
//!
//! ## Contents
//! - [`Document`], [`WorkflowStatus`], [`StatusEntry`] the entity and its lifecycle
//! - [`ingest`], [`parse_manifest`], [`load_manifest`] intake of raw manifest records
//! - [`DocumentBoard`] a subscriber that keeps documents in sync with status events
//!
//! The engine never holds documents: it reads `id` and `insurer` when work is
//! scheduled and reports everything else through events.

mod board;
mod document;
mod ingest;

pub use board::{BoardSummary, CYCLE_COMPLETED, DocumentBoard, Notice};
pub use document::{
    DEFAULT_ERROR_MESSAGE, Document, StatusEntry, WorkflowStatus, document_id, format_doc_type,
};
pub use ingest::{RawRecord, ingest, ingest_at, load_manifest, parse_manifest, parse_received_at};
