use chrono::{DateTime, Utc};

/// A fact recorded by the ledger (a group registered, an expense recorded,
/// revised or removed, a payment settled).
///
/// Events are never edited once applied. A change to an event's shape bumps
/// [`Event::version`] rather than rewriting history.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name such as `ledger.expense.recorded`.
    fn event_type(&self) -> &'static str;

    /// Schema version of this event type's payload.
    fn version(&self) -> u32;

    /// Business time of the fact, not the time it was applied.
    fn occurred_at(&self) -> DateTime<Utc>;
}
