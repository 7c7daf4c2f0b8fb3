use serde::{Deserialize, Serialize};
use uuid::Uuid;

use splitledger_core::AggregateId;

/// A ledger event as it leaves the store: the payload plus where it sits in
/// the ledger's history.
///
/// `sequence_number` equals the ledger version right after the event was
/// applied, so subscribers can detect gaps or replays by comparing it with
/// the last number they saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    aggregate_id: AggregateId,
    aggregate_type: String,
    sequence_number: u64,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    /// Unique per published event (uuid v7, so ordered by creation time).
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Ledger the event belongs to.
    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}
