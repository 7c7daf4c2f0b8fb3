//! Copy-on-write ownership of the current ledger.
//!
//! The [`Ledger`] aggregate is a plain value with no interior locking. This
//! module is the one place where it is shared between threads.
//!
//! ## Readers
//!
//! [`LedgerStore::snapshot`] hands out an `Arc<Ledger>`. The read lock is held
//! only long enough to clone the `Arc`, so queries (balances, summaries,
//! activity feeds) run lock-free against an immutable value. A snapshot never
//! changes after it is handed out: a later write builds a new ledger and
//! replaces the pointer, it never mutates the old one.
//!
//! ## Writers
//!
//! Writers are serialized by a separate mutex so that two commands never
//! start from the same base and silently overwrite each other.
//!
//! ```text
//! Command
//!   ↓
//! 1. Lock the writer slot (one writer at a time)
//!   ↓
//! 2. Check the expected version against the current snapshot
//!   ↓
//! 3. Clone, handle, apply (pure, may reject)
//!   ↓
//! 4. Swap the new snapshot in
//!   ↓
//! 5. Publish enveloped events on the bus (best-effort)
//! ```
//!
//! A rejected command (domain error or version conflict) returns before
//! step 4: the current snapshot, its version and the bus are untouched.
//!
//! ## Publication
//!
//! Events are published only after the swap, so a subscriber that reacts to
//! an event and then takes a snapshot always sees the change. Each envelope's
//! `sequence_number` is the ledger version after that event. A failed publish
//! is logged and does not roll back the snapshot: the ledger is the source of
//! truth, the bus is a notification channel.

use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;
use uuid::Uuid;

use splitledger_core::{Aggregate, AggregateRoot, DomainError, ExpectedVersion};
use splitledger_events::{Event, EventBus, EventEnvelope, InMemoryEventBus, Subscription};

use crate::ledger::{Ledger, LedgerCommand, LedgerEvent, LedgerId};

/// Aggregate type recorded on every envelope.
pub const AGGREGATE_TYPE: &str = "ledger";

pub type LedgerEnvelope = EventEnvelope<LedgerEvent>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The command was rejected by the ledger; nothing changed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A writer panicked while holding a lock.
    #[error("ledger store lock poisoned")]
    Poisoned,
}

/// Owner of the current ledger snapshot.
#[derive(Debug)]
pub struct LedgerStore<B = InMemoryEventBus<LedgerEnvelope>> {
    current: RwLock<Arc<Ledger>>,
    writer: Mutex<()>,
    bus: B,
}

impl LedgerStore {
    /// Store over an empty ledger with an in-memory bus.
    pub fn new(id: LedgerId) -> Self {
        Self::with_bus(Ledger::empty(id), InMemoryEventBus::new())
    }
}

impl<B> LedgerStore<B>
where
    B: EventBus<LedgerEnvelope>,
{
    pub fn with_bus(ledger: Ledger, bus: B) -> Self {
        Self {
            current: RwLock::new(Arc::new(ledger)),
            writer: Mutex::new(()),
            bus,
        }
    }

    /// Current immutable snapshot; later writes never change it.
    pub fn snapshot(&self) -> Result<Arc<Ledger>, StoreError> {
        let current = self.current.read().map_err(|_| StoreError::Poisoned)?;
        tracing::debug!(version = current.version(), "ledger snapshot taken");
        Ok(Arc::clone(&current))
    }

    pub fn subscribe(&self) -> Subscription<LedgerEnvelope> {
        self.bus.subscribe()
    }

    /// Execute a command without a version expectation.
    pub fn dispatch(&self, command: LedgerCommand) -> Result<Vec<LedgerEnvelope>, StoreError> {
        self.dispatch_expecting(ExpectedVersion::Any, command)
    }

    /// Execute a command if the ledger is still at `expected`.
    pub fn dispatch_expecting(
        &self,
        expected: ExpectedVersion,
        command: LedgerCommand,
    ) -> Result<Vec<LedgerEnvelope>, StoreError> {
        let _writer = self.writer.lock().map_err(|_| StoreError::Poisoned)?;

        let base = self.snapshot()?;
        let base_version = base.version();

        let outcome = expected
            .check(base_version)
            .and_then(|()| {
                let mut next = Ledger::clone(&base);
                next.execute(&command).map(|events| (next, events))
            });

        let (next, events) = match outcome {
            Ok(ok) => ok,
            Err(err) => {
                tracing::warn!(
                    command = command.name(),
                    version = base_version,
                    error = %err,
                    "ledger command rejected"
                );
                return Err(err.into());
            }
        };

        let ledger_id = next.id_typed();
        let new_version = next.version();
        {
            let mut current = self.current.write().map_err(|_| StoreError::Poisoned)?;
            *current = Arc::new(next);
        }

        tracing::info!(
            command = command.name(),
            ledger_id = %ledger_id,
            version = new_version,
            events = events.len(),
            "ledger command accepted"
        );

        let envelopes: Vec<LedgerEnvelope> = events
            .into_iter()
            .enumerate()
            .map(|(idx, event)| {
                EventEnvelope::new(
                    Uuid::now_v7(),
                    ledger_id.0,
                    AGGREGATE_TYPE,
                    base_version + idx as u64 + 1,
                    event,
                )
            })
            .collect();

        for envelope in &envelopes {
            let event = envelope.payload();
            match self.bus.publish(envelope.clone()) {
                Ok(()) => tracing::debug!(
                    event_id = %envelope.event_id(),
                    event_type = event.event_type(),
                    schema_version = event.version(),
                    occurred_at = %event.occurred_at(),
                    sequence = envelope.sequence_number(),
                    "ledger event published"
                ),
                Err(err) => tracing::warn!(
                    event_id = %envelope.event_id(),
                    event_type = event.event_type(),
                    schema_version = event.version(),
                    sequence = envelope.sequence_number(),
                    error = ?err,
                    "failed to publish ledger event"
                ),
            }
        }

        Ok(envelopes)
    }
}
