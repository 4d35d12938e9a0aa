//! # Batch Run Example
//!
//! Runs a small intake manifest through the full signing pipeline in real time.
//!
//! Wires together:
//! - `tracing-subscriber` with `EnvFilter` (try `RUST_LOG=signflow=debug`)
//! - the built-in `LogWriter` subscriber (requires the `logging` feature)
//! - a `DocumentBoard` tracking document state and notices
//! - the tokio `Driver` and its broadcast stream
//!
//! ## Run
//! ```bash
//! cargo run --example batch_run --features logging
//! ```

use std::sync::Arc;

use signflow::{
    DocumentBoard, Driver, Engine, EngineConfig, Event, LogWriter, Subscribe, ingest,
    parse_manifest,
};
use tracing_subscriber::EnvFilter;

const MANIFEST: &str = r#"[
    {"insurer": "LINK4", "documentType": "PolicyRenewal", "employeeId": "EMP101",
     "employeeName": "Anna Nowak", "documentFilename": "renewal-2025.pdf",
     "receivedAt": "2025-09-12T09:30:00+02:00", "signatureRequirement": "QES",
     "deliveryChannel": "Email", "deliveryTarget": "policies@link4.example"},
    {"insurer": "PZU", "documentType": "CoverageAnnex", "employeeId": "EMP102",
     "employeeName": "Piotr Zielinski", "documentFilename": "annex-b.pdf",
     "receivedAt": "2025-09-12T10:05:00+02:00", "signatureRequirement": "AES",
     "deliveryChannel": "API", "deliveryTarget": "https://api.pzu.example/intake"},
    {"insurer": "Warta", "documentType": "ClaimForm", "employeeId": "EMP103",
     "employeeName": "Ewa Wisniewska", "documentFilename": "claim-17.pdf",
     "signatureRequirement": "QES", "deliveryChannel": "Email",
     "deliveryTarget": "claims@warta.example"}
]"#;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let docs = ingest(parse_manifest(MANIFEST)?);
    let board = Arc::new(DocumentBoard::new(docs.clone()));
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new()), board.clone()];

    let engine = Engine::builder(EngineConfig::default())
        .with_subscribers(subs)
        .build()?;

    let driver = Driver::spawn(engine);
    let handle = driver.handle();
    let mut stream = handle.stream();

    handle.run_batch(docs).await?;
    while let Ok(ev) = stream.recv().await {
        if ev == Event::stream(false) {
            break;
        }
    }
    driver.shutdown().await?;

    println!();
    println!("Documents:");
    for doc in board.documents() {
        println!(
            " ├─► {:<22} {:<10} {}",
            doc.document_filename,
            doc.workflow_status.as_str(),
            doc.workflow_status.label()
        );
    }
    println!("Notices:");
    for notice in board.notices() {
        println!(" ├─► [{}] {}", notice.variant, notice.message);
    }
    let summary = board.summary();
    println!(
        " └─► total={} qes={} aes={} email={} api={} exceptions={}",
        summary.total, summary.qes, summary.aes, summary.email, summary.api, summary.exceptions
    );
    Ok(())
}
