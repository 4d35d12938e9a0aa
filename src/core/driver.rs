//! # Driver: runs an [`Engine`] in real time on a tokio task.
//!
//! The engine itself only knows a virtual clock. [`Driver`] owns the engine on
//! a spawned task and maps virtual time onto [`tokio::time::Instant`]s:
//! it sleeps until the next pending deadline, fires what is due, and applies
//! commands sent through cloneable [`DriverHandle`]s.
//!
//! ## Architecture
//! ```text
//! DriverHandle ── Command (mpsc) ──┐
//! DriverHandle ── Command (mpsc) ──┤
//!                                  ▼
//!                 ┌───────────────────────────────────────┐
//!                 │ driver loop (select!, biased)         │
//!                 │  1. token.cancelled()  ─► stop        │
//!                 │  2. rx.recv()          ─► sync clock, │
//!                 │                           apply cmd   │
//!                 │  3. sleep_until(next)  ─► sync clock, │
//!                 │                           fire timers │
//!                 └──────────────────┬────────────────────┘
//!                                    ▼
//!                      Engine ── Bus ──► subscribers
//!                                  └──► BroadcastForwarder ──► DriverHandle::stream()
//! ```
//!
//! ## Rules
//! - Commands are applied in send order, after every timer already due.
//! - Shutdown stops the loop without firing pending timers; the engine is
//!   returned with its timers intact.
//! - Once stopped, every handle command fails with [`Error::DriverClosed`].

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::engine::Engine;
use crate::documents::Document;
use crate::error::{Error, Result};
use crate::events::{Event, SubscriptionId};
use crate::subscribers::{BroadcastForwarder, Subscribe};

/// Capacity of the command channel.
const COMMAND_CAPACITY: usize = 64;

enum Command {
    Queue(Vec<Document>),
    RunBatch(Vec<Document>),
    ResolveError(String),
    Subscribe(Arc<dyn Subscribe>, oneshot::Sender<SubscriptionId>),
    Unsubscribe(SubscriptionId, oneshot::Sender<bool>),
}

/// Owner of the spawned driver task.
pub struct Driver {
    handle: DriverHandle,
    join: JoinHandle<Engine>,
}

/// Cloneable handle for sending commands to a running [`Driver`].
#[derive(Clone)]
pub struct DriverHandle {
    tx: mpsc::Sender<Command>,
    token: CancellationToken,
    events: broadcast::Sender<Event>,
}

impl Driver {
    /// Moves `engine` onto a new tokio task and starts driving it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut engine: Engine) -> Self {
        let forwarder = BroadcastForwarder::new(engine.config().broadcast_capacity_clamped());
        let events = forwarder.sender();
        let forward_id = engine.subscribe(Arc::new(forwarder));

        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let token = CancellationToken::new();
        let join = tokio::spawn(drive(engine, rx, token.clone(), forward_id));

        Self {
            handle: DriverHandle { tx, token, events },
            join,
        }
    }

    /// Returns a new handle to this driver.
    pub fn handle(&self) -> DriverHandle {
        self.handle.clone()
    }

    /// Stops the loop and returns the engine.
    pub async fn shutdown(self) -> Result<Engine> {
        self.handle.shutdown();
        self.join.await.map_err(|_| Error::DriverClosed)
    }
}

impl DriverHandle {
    /// See [`Engine::queue`].
    pub async fn queue(&self, docs: Vec<Document>) -> Result<()> {
        self.send(Command::Queue(docs)).await
    }

    /// See [`Engine::run_batch`].
    pub async fn run_batch(&self, docs: Vec<Document>) -> Result<()> {
        self.send(Command::RunBatch(docs)).await
    }

    /// See [`Engine::resolve_error`].
    pub async fn resolve_error(&self, id: impl Into<String>) -> Result<()> {
        self.send(Command::ResolveError(id.into())).await
    }

    /// Registers a subscriber on the driven engine.
    pub async fn subscribe(&self, subscriber: Arc<dyn Subscribe>) -> Result<SubscriptionId> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Subscribe(subscriber, reply)).await?;
        rx.await.map_err(|_| Error::DriverClosed)
    }

    /// Removes a subscriber from the driven engine.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Unsubscribe(id, reply)).await?;
        rx.await.map_err(|_| Error::DriverClosed)
    }

    /// Receiver of every event published from now on.
    pub fn stream(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Requests the loop to stop. Does not wait.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Returns true once the loop has stopped accepting commands.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd).await.map_err(|_| Error::DriverClosed)
    }
}

async fn drive(
    mut engine: Engine,
    mut rx: mpsc::Receiver<Command>,
    token: CancellationToken,
    forward_id: SubscriptionId,
) -> Engine {
    let origin = Instant::now()
        .checked_sub(engine.now())
        .unwrap_or_else(Instant::now);
    debug!(pending = engine.pending_timers(), "driver started");

    loop {
        let deadline = engine.next_deadline();
        let wake = origin + deadline.unwrap_or_default();

        tokio::select! {
            biased;
            _ = token.cancelled() => break,

            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                engine.advance_to(origin.elapsed());
                apply(&mut engine, cmd);
            }
            _ = sleep_until(wake), if deadline.is_some() => {
                engine.advance_to(origin.elapsed());
            }
        }
    }

    engine.unsubscribe(forward_id);
    debug!(pending = engine.pending_timers(), "driver stopped");
    engine
}

fn apply(engine: &mut Engine, cmd: Command) {
    match cmd {
        Command::Queue(docs) => engine.queue(&docs),
        Command::RunBatch(docs) => engine.run_batch(&docs),
        Command::ResolveError(id) => engine.resolve_error(&id),
        Command::Subscribe(sub, reply) => {
            let _ = reply.send(engine.subscribe(sub));
        }
        Command::Unsubscribe(id, reply) => {
            let _ = reply.send(engine.unsubscribe(id));
        }
    }
}
