//! Domain error model.

use thiserror::Error;

use crate::id::{ExpenseId, GroupId, PersonId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic validation failure: nothing here is
/// transient or retryable, and a rejected operation leaves state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An expense violated a construction invariant (empty split, negative amount, ...).
    #[error("invalid expense: {0}")]
    InvalidExpense(String),

    /// A share was requested for someone who does not split the expense.
    #[error("{person} is not a participant of expense {expense}")]
    NotAParticipant { expense: ExpenseId, person: PersonId },

    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),

    #[error("unknown person: {0}")]
    UnknownPerson(PersonId),

    #[error("unknown expense: {0}")]
    UnknownExpense(ExpenseId),

    /// An identifier that must be unique was registered twice.
    #[error("duplicate identifier: {0}")]
    DuplicateId(String),

    /// A group violated a construction invariant (no members, blank name, ...).
    #[error("invalid group: {0}")]
    InvalidGroup(String),

    /// A settlement payment violated a construction invariant.
    #[error("invalid settlement: {0}")]
    InvalidSettlement(String),

    /// An identifier was malformed (e.g. blank).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Stale version on an optimistic concurrency check.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid_expense(msg: impl Into<String>) -> Self {
        Self::InvalidExpense(msg.into())
    }

    pub fn invalid_group(msg: impl Into<String>) -> Self {
        Self::InvalidGroup(msg.into())
    }

    pub fn invalid_settlement(msg: impl Into<String>) -> Self {
        Self::InvalidSettlement(msg.into())
    }

    pub fn duplicate(id: impl core::fmt::Display) -> Self {
        Self::DuplicateId(id.to_string())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_a_participant(expense: &ExpenseId, person: &PersonId) -> Self {
        Self::NotAParticipant {
            expense: expense.clone(),
            person: person.clone(),
        }
    }
}
