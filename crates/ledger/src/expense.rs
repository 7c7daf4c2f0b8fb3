//! Expense entity: one payment, split evenly between participants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, Entity, ExpenseId, GroupId, PersonId};

use crate::category::Category;

/// Unvalidated expense input (what a caller submits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub expense_id: ExpenseId,
    pub description: String,
    pub amount: Decimal,
    pub paid_by: PersonId,
    pub group_id: GroupId,
    pub split_between: Vec<PersonId>,
    pub category: Category,
    pub location: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// A validated expense.
///
/// Invariants (enforced by [`Expense::new`]):
/// - `amount >= 0`
/// - `split_between` is non-empty and has no duplicates
///
/// The payer does not have to be one of the participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    description: String,
    amount: Decimal,
    paid_by: PersonId,
    group_id: GroupId,
    split_between: Vec<PersonId>,
    category: Category,
    location: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(draft: ExpenseDraft) -> DomainResult<Self> {
        if draft.expense_id.is_blank() {
            return Err(DomainError::invalid_id("expense id cannot be blank"));
        }
        if draft.paid_by.is_blank() {
            return Err(DomainError::invalid_id("payer cannot be blank"));
        }
        if draft.amount < Decimal::ZERO {
            return Err(DomainError::invalid_expense("amount cannot be negative"));
        }
        if draft.split_between.is_empty() {
            return Err(DomainError::invalid_expense(
                "expense must be split between at least one person",
            ));
        }
        for (idx, person) in draft.split_between.iter().enumerate() {
            if person.is_blank() {
                return Err(DomainError::invalid_id("participant cannot be blank"));
            }
            if draft.split_between[..idx].contains(person) {
                return Err(DomainError::invalid_expense(format!(
                    "{person} appears more than once in the split"
                )));
            }
        }

        Ok(Self {
            id: draft.expense_id,
            description: draft.description,
            amount: draft.amount,
            paid_by: draft.paid_by,
            group_id: draft.group_id,
            split_between: draft.split_between,
            category: draft.category,
            location: draft.location.filter(|l| !l.trim().is_empty()),
            occurred_at: draft.occurred_at,
        })
    }

    pub fn id_typed(&self) -> &ExpenseId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn paid_by(&self) -> &PersonId {
        &self.paid_by
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn split_between(&self) -> &[PersonId] {
        &self.split_between
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn is_participant(&self, person: &PersonId) -> bool {
        self.split_between.contains(person)
    }

    /// Whether `person` paid for or shares this expense.
    pub fn involves(&self, person: &PersonId) -> bool {
        &self.paid_by == person || self.is_participant(person)
    }

    /// Even share of the amount; not rounded.
    fn per_head(&self) -> Decimal {
        self.amount / Decimal::from(self.split_between.len())
    }

    /// `person`'s share of this expense.
    pub fn share_of(&self, person: &PersonId) -> DomainResult<Decimal> {
        if !self.is_participant(person) {
            return Err(DomainError::not_a_participant(&self.id, person));
        }
        Ok(self.per_head())
    }

    /// Every participant with their share, in split order.
    pub fn shares(&self) -> impl Iterator<Item = (&PersonId, Decimal)> + '_ {
        let share = self.per_head();
        self.split_between.iter().map(move |p| (p, share))
    }

    /// Signed effect of this expense on `person`'s balance.
    ///
    /// The payer is credited what the others owe (the full amount when the
    /// payer is not splitting); each non-paying participant is debited their
    /// share; anyone else is unaffected.
    pub fn balance_effect(&self, person: &PersonId) -> Decimal {
        let participates = self.is_participant(person);
        if &self.paid_by == person {
            if participates {
                self.amount - self.per_head()
            } else {
                self.amount
            }
        } else if participates {
            -self.per_head()
        } else {
            Decimal::ZERO
        }
    }

    /// Case-insensitive substring match over the description.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.description.to_lowercase().contains(&query.to_lowercase())
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
