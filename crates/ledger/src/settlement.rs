//! Settlement payments: one member paying another back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, Entity, GroupId, PersonId, SettlementId};

/// A validated settlement: `from` paid `amount` to `to` inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    id: SettlementId,
    group_id: GroupId,
    from: PersonId,
    to: PersonId,
    amount: Decimal,
    occurred_at: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        id: SettlementId,
        group_id: GroupId,
        from: PersonId,
        to: PersonId,
        amount: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if id.is_blank() {
            return Err(DomainError::invalid_id("settlement id cannot be blank"));
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::invalid_settlement("amount must be positive"));
        }
        if from == to {
            return Err(DomainError::invalid_settlement(format!(
                "{from} cannot pay themselves"
            )));
        }

        Ok(Self {
            id,
            group_id,
            from,
            to,
            amount,
            occurred_at,
        })
    }

    pub fn id_typed(&self) -> &SettlementId {
        &self.id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn payer(&self) -> &PersonId {
        &self.from
    }

    pub fn recipient(&self) -> &PersonId {
        &self.to
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn involves(&self, person: &PersonId) -> bool {
        &self.from == person || &self.to == person
    }

    /// Paying reduces what the payer owes; receiving reduces what the
    /// recipient is owed.
    pub fn balance_effect(&self, person: &PersonId) -> Decimal {
        if &self.from == person {
            self.amount
        } else if &self.to == person {
            -self.amount
        } else {
            Decimal::ZERO
        }
    }
}

impl Entity for Settlement {
    type Id = SettlementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
