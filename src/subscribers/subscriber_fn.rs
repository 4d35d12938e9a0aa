//! # Function-backed subscriber (`SubscriberFn`)
//!
//! [`SubscriberFn`] wraps a closure `F: Fn(&Event)` so that simple handlers do
//! not need a dedicated type.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use signflow::{Engine, EngineConfig, Subscribe, SubscriberFn};
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! let printer: Arc<dyn Subscribe> = SubscriberFn::arc("printer", |ev| println!("{ev:?}"));
//! engine.subscribe(printer);
//! ```

use std::sync::Arc;

use crate::events::Event;
use crate::subscribers::subscriber::Subscribe;

/// Closure-backed [`Subscribe`] implementation.
pub struct SubscriberFn<F> {
    name: &'static str,
    f: F,
}

impl<F> SubscriberFn<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscriberFn::arc`] when you immediately register it.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }

    /// Name given at construction.
    pub fn label(&self) -> &'static str {
        self.name
    }
}

impl<F> Subscribe for SubscriberFn<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        (self.f)(event)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> std::fmt::Debug for SubscriberFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberFn").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_reports_given_name_and_calls_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let sub = SubscriberFn::arc("audit-trail", move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        });

        sub.on_event(&Event::stream(true));
        assert_eq!(sub.name(), "audit-trail");
        assert_eq!(sub.label(), "audit-trail");
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
