//! # signflow
//!
//! **Signflow** simulates the signature-and-delivery workflow of insurance
//! documents: intake records become [`Document`]s, an [`Engine`] walks them
//! through `ready → signing → routed → delivered` on timers (with occasional
//! insurer rejections and an automatic recovery detour), and every transition
//! is published as an [`Event`] to subscribers.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   intake manifest (JSON)
//!          │ parse_manifest / load_manifest
//!          ▼
//!      RawRecord ──► ingest() ──► Vec<Document> (pending)
//!                                      │
//!              ┌───────────────────────┼─────────────────────────┐
//!              ▼ queue(&docs)          ▼ run_batch(&docs)        ▼ resolve_error(id)
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Engine (single-threaded, virtual clock)                             │
//! │  - TimerQueue (QueueReady / Stage / Recovery / Finalize timers)      │
//! │  - stages::next_action (pure state machine, fault draw at `routed`)  │
//! │  - ActivityTracker (stream{true|false} on change only)               │
//! │  - Box<dyn RandomSource> (jitter + fault draws)                      │
//! └───────────────────────────────┬──────────────────────────────────────┘
//!                                 │ publish(&Event), synchronous
//!                                 ▼
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                     Bus (subscriber registry)                        │
//! └──────┬──────────────┬──────────────┬──────────────┬──────────────────┘
//!        ▼              ▼              ▼              ▼
//!  DocumentBoard     Recorder      LogWriter   BroadcastForwarder ──► async receivers
//! ```
//!
//! ### Batch timeline of one document
//! ```text
//! t0 = index * stagger
//!   ├─ + ready delay + jitter      ─► status{ready}
//!   ├─ + signing delay + jitter    ─► status{signing}
//!   ├─ + routed delay + jitter     ─► draw < p_fault ?
//!   │                                   ├─ no  ─► status{routed}
//!   │                                   │         └─ + delivered delay + jitter ─► status{delivered}
//!   │                                   └─ yes ─► status{error, "<insurer> validation required additional data."}
//!   │                                             ├─ + remediation ─► status{ready, "<insurer> ready after remediation."}
//!   │                                             └─ + redelivery  ─► status{delivered}
//!   └─ finalize: (n - 1) * stagger + pipeline + recovery window ─► stream{false}
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Documents**     | Intake records, lifecycle status, consumer-side board.        | [`Document`], [`ingest`], [`DocumentBoard`] |
//! | **Engine**        | Queue and batch scheduling, faults, recovery, activity.       | [`Engine`], [`EngineBuilder`]               |
//! | **Events**        | Tagged wire events and synchronous subscriber fan-out.        | [`Event`], [`Bus`], [`Subscribe`]           |
//! | **Policies**      | Jitter strategy and injectable randomness.                    | [`JitterPolicy`], [`RandomSource`]          |
//! | **Runtime**       | Real-time tokio driver with a command handle.                 | [`Driver`], [`DriverHandle`]                |
//! | **Configuration** | Centralized timing constants with validation.                 | [`EngineConfig`]                            |
//! | **Errors**        | Typed errors for config, manifest and driver edges.           | [`Error`]                                   |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use signflow::{DocumentBoard, Engine, EngineConfig, SeededRandom, WorkflowStatus, ingest, parse_manifest};
//!
//! let records = parse_manifest(r#"[
//!     {"insurer": "LINK4", "employeeId": "EMP001", "documentFilename": "policy.pdf",
//!      "signatureRequirement": "QES", "deliveryChannel": "Email"},
//!     {"insurer": "PZU", "employeeId": "EMP002", "documentFilename": "annex.pdf",
//!      "signatureRequirement": "AES", "deliveryChannel": "API"}
//! ]"#).unwrap();
//! let docs = ingest(records);
//!
//! let board = Arc::new(DocumentBoard::new(docs.clone()));
//! let mut engine = Engine::builder(EngineConfig::default())
//!     .with_random(SeededRandom::new(7))
//!     .with_subscribers(vec![board.clone()])
//!     .build()
//!     .unwrap();
//!
//! engine.run_batch(&docs);
//! engine.run_until_idle();
//!
//! assert!(board.documents().iter().all(|d| d.workflow_status == WorkflowStatus::Delivered));
//! assert!(!board.is_streaming());
//! assert_eq!(board.summary().total, 2);
//! ```
mod config;
mod core;
mod documents;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::stages;
pub use crate::core::{
    Driver, DriverHandle, EMPTY_BATCH_MESSAGE, EMPTY_QUEUE_MESSAGE, Engine, EngineBuilder,
    MANUAL_RESOLUTION_MESSAGE, TimerId, TimerQueue,
};
pub use config::{EngineConfig, StageDelays};
pub use documents::{
    BoardSummary, CYCLE_COMPLETED, DEFAULT_ERROR_MESSAGE, Document, DocumentBoard, Notice,
    RawRecord, StatusEntry, WorkflowStatus, document_id, format_doc_type, ingest, ingest_at,
    load_manifest, parse_manifest, parse_received_at,
};
pub use error::{Error, Result};
pub use events::{Bus, Event, StatusChange, StatusContext, SubscriptionId, ToastVariant};
pub use policies::{JitterPolicy, RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use subscribers::{BroadcastForwarder, Recorder, Subscribe, SubscriberFn};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
