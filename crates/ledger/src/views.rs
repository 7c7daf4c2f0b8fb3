//! Derived read views consumed by presentation layers.
//!
//! Nothing here is stored: every view is rebuilt from the ledger on read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{GroupId, PersonId, ValueObject};

/// Totals across all of a person's groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Sum of the positive per-group balances.
    pub total_owed: Decimal,
    /// Sum of the absolute values of the negative per-group balances.
    pub total_owing: Decimal,
    /// `total_owed - total_owing`.
    pub net_balance: Decimal,
}

impl BalanceSummary {
    pub fn from_group_balances(balances: impl IntoIterator<Item = Decimal>) -> Self {
        let (total_owed, total_owing) = balances.into_iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(owed, owing), balance| {
                if balance > Decimal::ZERO {
                    (owed + balance, owing)
                } else {
                    (owed, owing - balance)
                }
            },
        );

        Self {
            total_owed,
            total_owing,
            net_balance: total_owed - total_owing,
        }
    }

    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::from_balance(self.net_balance)
    }
}

impl ValueObject for BalanceSummary {}

/// Which way a signed balance points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum BalanceStatus {
    /// Others owe this much to the person.
    Owed(Decimal),
    /// The person owes this much (absolute value).
    Owes(Decimal),
    SettledUp,
}

impl BalanceStatus {
    pub fn from_balance(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            BalanceStatus::Owed(balance)
        } else if balance < Decimal::ZERO {
            BalanceStatus::Owes(-balance)
        } else {
            BalanceStatus::SettledUp
        }
    }
}

impl ValueObject for BalanceStatus {}

/// One row of the groups list, seen from `viewer`'s side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group_id: GroupId,
    pub name: String,
    pub members: Vec<PersonId>,
    pub color: String,
    pub total_expenses: Decimal,
    pub viewer: PersonId,
    pub viewer_balance: Decimal,
    pub status: BalanceStatus,
    pub last_activity: DateTime<Utc>,
}

impl GroupSummary {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Expense,
    Payment,
}

/// One entry of the dashboard's activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    /// Identifier of the underlying expense or settlement.
    pub id: String,
    pub kind: ActivityKind,
    pub description: String,
    /// Negative for outflows (expenses, payments sent), positive for
    /// payments received.
    pub amount: Decimal,
    pub group_id: GroupId,
    pub group_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Headline counts for a person's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub total_groups: usize,
    pub total_expenses: usize,
    /// Distinct people sharing at least one group with the person.
    pub total_friends: usize,
}

impl ValueObject for ProfileStats {}
