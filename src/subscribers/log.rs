//! # LogWriter - event logger
//!
//! A minimal subscriber that renders every [`Event`] as one `tracing` record
//! under the `signflow::events` target. Use it for demos and debugging.
//!
//! ## Example output
//! ```text
//! INFO signflow::events: [stream] active=true
//! INFO signflow::events: [status] id="EMP101-a.pdf" status=ready
//! INFO signflow::events: [status] id="EMP101-a.pdf" status=error detail="LINK4 validation required additional data."
//! INFO signflow::events: [toast] variant=info text="Nothing queued for signing."
//! ```

use tracing::info;

use crate::events::Event;
use crate::subscribers::subscriber::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        match e {
            Event::Stream { active } => {
                info!(target: "signflow::events", active = *active, "[stream]");
            }
            Event::Status(change) => match change.message() {
                Some(message) => info!(
                    target: "signflow::events",
                    id = %change.id,
                    status = %change.status,
                    detail = message,
                    "[status]"
                ),
                None => info!(
                    target: "signflow::events",
                    id = %change.id,
                    status = %change.status,
                    "[status]"
                ),
            },
            Event::Toast { variant, message } => {
                info!(target: "signflow::events", variant = %variant, text = %message, "[toast]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
