use std::sync::Arc;

use crate::{
    config::EngineConfig,
    error::Result,
    events::Bus,
    policies::{RandomSource, ThreadRandom},
    subscribers::Subscribe,
};

use super::engine::Engine;

/// Builder for constructing an [`Engine`] with optional randomness and subscribers.
pub struct EngineBuilder {
    cfg: EngineConfig,
    rng: Box<dyn RandomSource>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl EngineBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            rng: Box::new(ThreadRandom),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the source of jitter and fault draws.
    ///
    /// Use [`SeededRandom`](crate::SeededRandom) for reproducible runs and
    /// [`ScriptedRandom`](crate::ScriptedRandom) to pin individual draws.
    pub fn with_random(mut self, rng: impl RandomSource) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Sets subscribers registered before the first event.
    ///
    /// Duplicates (same `Arc`) are registered once.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and builds the engine.
    pub fn build(self) -> Result<Engine> {
        self.cfg.validate()?;

        let mut bus = Bus::new();
        for sub in self.subscribers {
            bus.subscribe(sub);
        }
        Ok(Engine::from_parts(self.cfg, self.rng, bus))
    }
}
