//! # Queue Preview Example
//!
//! Queues documents for signature on the virtual clock, without a runtime,
//! and prints when each one would become ready.
//!
//! Uses `JitterPolicy::None` so the preview is deterministic.
//!
//! ## Run
//! ```bash
//! cargo run --example queue_preview
//! ```

use std::sync::Arc;

use signflow::{
    Engine, EngineConfig, Event, JitterPolicy, RawRecord, Subscribe, SubscriberFn, format_doc_type,
    ingest,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let records = (1..=5).map(|i| {
        let mut r = RawRecord::new(format!("EMP{i:03}"), format!("form-{i}.pdf"));
        r.document_type = "EnrollmentForm".into();
        r
    });
    let docs = ingest(records);

    let cfg = EngineConfig {
        jitter: JitterPolicy::None,
        ..EngineConfig::default()
    };
    let mut engine = Engine::builder(cfg).build()?;

    let printer: Arc<dyn Subscribe> = SubscriberFn::arc("printer", |ev: &Event| match ev {
        Event::Stream { active } => println!("  stream active={active}"),
        Event::Status(change) => println!("  {} -> {}", change.id, change.status.label()),
        Event::Toast { variant, message } => println!("  [{variant}] {message}"),
    });
    engine.subscribe(printer);

    println!("Queueing {} x {}", docs.len(), format_doc_type(&docs[0].document_type));
    engine.queue(&docs);
    while let Some(deadline) = engine.next_deadline() {
        print!("t+{:>4}ms", deadline.as_millis());
        engine.advance_to(deadline);
    }

    println!("Empty selection:");
    engine.queue(&[]);
    Ok(())
}
