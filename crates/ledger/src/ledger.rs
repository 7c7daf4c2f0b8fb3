//! The expense ledger aggregate.
//!
//! One [`Ledger`] holds every group, expense and settlement of a household of
//! users. It stores facts only; totals, shares and balances are computed from
//! those facts on each query, so there is no cached aggregate to fall out of
//! step with the expenses it summarizes.
//!
//! ## Commands and events
//!
//! - `RegisterGroup` → `GroupRegistered`
//! - `RecordExpense` → `ExpenseRecorded`
//! - `ReviseExpense` → `ExpenseRevised` (replaces the expense under the same id)
//! - `RemoveExpense` → `ExpenseRemoved`
//! - `SettlePayment` → `PaymentSettled`
//!
//! `handle` validates against the current state and returns events without
//! touching it; `apply` evolves state and bumps the version by one per event.
//! A rejected command therefore leaves the ledger exactly as it was.
//!
//! ## Balances
//!
//! Within a group, each expense credits its payer with the amount minus the
//! payer's own share (or the whole amount when the payer is not splitting)
//! and debits every other participant their share (`amount / participants`,
//! unrounded). A group's balances therefore sum to zero.
//!
//! - [`Ledger::balance_for`] is that expense-only balance.
//! - [`Ledger::outstanding_balance`] also counts settlements: paying raises
//!   the payer's balance, receiving lowers the recipient's.
//! - [`Ledger::balance_summary`] splits a person's per-group balances into
//!   what they are owed and what they owe across all their groups.
//!
//! ## Invariants
//!
//! - Payers, participants and settlement parties are members of the group on
//!   record.
//! - The sum of every expense and settlement amount fits in a `Decimal`,
//!   which bounds every total and balance above; queries never overflow.
//! - Person-level queries for someone in no group fail with `UnknownPerson`.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Entity, ExpenseId,
    GroupId, PersonId, SettlementId,
};
use splitledger_events::Event;

use crate::expense::{Expense, ExpenseDraft};
use crate::group::Group;
use crate::settlement::Settlement;
use crate::views::{
    ActivityKind, BalanceStatus, BalanceSummary, GroupSummary, ProfileStats, RecentActivity,
};

/// Ledger identifier (aggregate id).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerId(pub AggregateId);

impl LedgerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LedgerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Ledger (groups, expenses and settlements of one household
/// of users).
///
/// The ledger stores facts only. Totals, shares and balances are derived on
/// every read, so they cannot drift from the expenses they summarize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    id: LedgerId,
    version: u64,
    groups: HashMap<GroupId, Group>,
    /// Registration order of `groups`.
    group_order: Vec<GroupId>,
    expenses: HashMap<ExpenseId, Expense>,
    settlements: Vec<Settlement>,
}

/// Command: RegisterGroup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterGroup {
    pub group_id: GroupId,
    pub name: String,
    pub members: Vec<PersonId>,
    pub color: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordExpense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExpense {
    pub expense: ExpenseDraft,
}

/// Command: ReviseExpense (replaces an existing expense with the same id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseExpense {
    pub expense: ExpenseDraft,
    pub revised_at: DateTime<Utc>,
}

/// Command: RemoveExpense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveExpense {
    pub expense_id: ExpenseId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SettlePayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlePayment {
    pub settlement_id: SettlementId,
    pub group_id: GroupId,
    pub from: PersonId,
    pub to: PersonId,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    RegisterGroup(RegisterGroup),
    RecordExpense(RecordExpense),
    ReviseExpense(ReviseExpense),
    RemoveExpense(RemoveExpense),
    SettlePayment(SettlePayment),
}

impl LedgerCommand {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCommand::RegisterGroup(_) => "register_group",
            LedgerCommand::RecordExpense(_) => "record_expense",
            LedgerCommand::ReviseExpense(_) => "revise_expense",
            LedgerCommand::RemoveExpense(_) => "remove_expense",
            LedgerCommand::SettlePayment(_) => "settle_payment",
        }
    }
}

/// Event: GroupRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRegistered {
    pub group: Group,
}

/// Event: ExpenseRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    pub expense: Expense,
}

/// Event: ExpenseRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRevised {
    pub expense: Expense,
    pub revised_at: DateTime<Utc>,
}

/// Event: ExpenseRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRemoved {
    pub expense_id: ExpenseId,
    pub group_id: GroupId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentSettled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettled {
    pub settlement: Settlement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    GroupRegistered(GroupRegistered),
    ExpenseRecorded(ExpenseRecorded),
    ExpenseRevised(ExpenseRevised),
    ExpenseRemoved(ExpenseRemoved),
    PaymentSettled(PaymentSettled),
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::GroupRegistered(_) => "ledger.group.registered",
            LedgerEvent::ExpenseRecorded(_) => "ledger.expense.recorded",
            LedgerEvent::ExpenseRevised(_) => "ledger.expense.revised",
            LedgerEvent::ExpenseRemoved(_) => "ledger.expense.removed",
            LedgerEvent::PaymentSettled(_) => "ledger.payment.settled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::GroupRegistered(e) => e.group.created_at(),
            LedgerEvent::ExpenseRecorded(e) => e.expense.occurred_at(),
            LedgerEvent::ExpenseRevised(e) => e.revised_at,
            LedgerEvent::ExpenseRemoved(e) => e.occurred_at,
            LedgerEvent::PaymentSettled(e) => e.settlement.occurred_at(),
        }
    }
}

impl Ledger {
    /// Empty aggregate (no groups, no expenses).
    pub fn empty(id: LedgerId) -> Self {
        Self {
            id,
            version: 0,
            groups: HashMap::new(),
            group_order: Vec::new(),
            expenses: HashMap::new(),
            settlements: Vec::new(),
        }
    }

    /// Rebuild a ledger by replaying its event history.
    pub fn from_events<'a>(
        id: LedgerId,
        events: impl IntoIterator<Item = &'a LedgerEvent>,
    ) -> Self {
        let mut ledger = Self::empty(id);
        for event in events {
            ledger.apply(event);
        }
        ledger
    }

    pub fn id_typed(&self) -> LedgerId {
        self.id
    }

    // ----- lookups -----

    pub fn group(&self, group_id: &GroupId) -> DomainResult<&Group> {
        self.groups
            .get(group_id)
            .ok_or_else(|| DomainError::UnknownGroup(group_id.clone()))
    }

    pub fn expense(&self, expense_id: &ExpenseId) -> DomainResult<&Expense> {
        self.expenses
            .get(expense_id)
            .ok_or_else(|| DomainError::UnknownExpense(expense_id.clone()))
    }

    /// Groups in registration order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.group_order.iter().filter_map(|id| self.groups.get(id))
    }

    /// Groups `person` belongs to, in registration order.
    pub fn groups_of<'a>(&'a self, person: &'a PersonId) -> impl Iterator<Item = &'a Group> + 'a {
        self.groups().filter(move |g| g.is_member(person))
    }

    /// Whether `person` is a member of at least one group.
    pub fn is_known(&self, person: &PersonId) -> bool {
        self.groups.values().any(|g| g.is_member(person))
    }

    fn ensure_known(&self, person: &PersonId) -> DomainResult<()> {
        if self.is_known(person) {
            Ok(())
        } else {
            Err(DomainError::UnknownPerson(person.clone()))
        }
    }

    /// All expenses, newest first (ties broken by id).
    pub fn expenses(&self) -> Vec<&Expense> {
        let mut all: Vec<&Expense> = self.expenses.values().collect();
        all.sort_by(|a, b| {
            b.occurred_at()
                .cmp(&a.occurred_at())
                .then_with(|| a.id_typed().cmp(b.id_typed()))
        });
        all
    }

    /// Expenses whose description contains `query` (case-insensitive), newest first.
    pub fn search_expenses(&self, query: &str) -> Vec<&Expense> {
        self.expenses().into_iter().filter(|e| e.matches(query)).collect()
    }

    pub fn expenses_in<'a>(
        &'a self,
        group_id: &'a GroupId,
    ) -> impl Iterator<Item = &'a Expense> + 'a {
        self.expenses.values().filter(move |e| e.group_id() == group_id)
    }

    /// Settlements in the order they were recorded.
    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn settlements_in<'a>(
        &'a self,
        group_id: &'a GroupId,
    ) -> impl Iterator<Item = &'a Settlement> + 'a {
        self.settlements.iter().filter(move |s| s.group_id() == group_id)
    }

    // ----- queries -----

    /// `person`'s share of an expense.
    pub fn share_of(&self, expense_id: &ExpenseId, person: &PersonId) -> DomainResult<Decimal> {
        self.expense(expense_id)?.share_of(person)
    }

    /// Sum of all expense amounts in a group (zero when it has none).
    pub fn total_for(&self, group_id: &GroupId) -> DomainResult<Decimal> {
        self.group(group_id)?;
        Ok(self.expenses_in(group_id).map(Expense::amount).sum())
    }

    /// Net of what `person` paid for others minus the shares they owe, within
    /// one group. Positive means others owe `person`.
    pub fn balance_for(&self, person: &PersonId, group_id: &GroupId) -> DomainResult<Decimal> {
        self.group(group_id)?.ensure_member(person)?;
        Ok(self.expense_balance(person, group_id))
    }

    fn expense_balance(&self, person: &PersonId, group_id: &GroupId) -> Decimal {
        self.expenses_in(group_id)
            .map(|e| e.balance_effect(person))
            .sum()
    }

    /// [`Ledger::balance_for`] adjusted by settlement payments made in the group.
    pub fn outstanding_balance(
        &self,
        person: &PersonId,
        group_id: &GroupId,
    ) -> DomainResult<Decimal> {
        let expenses = self.balance_for(person, group_id)?;
        let settled: Decimal = self
            .settlements_in(group_id)
            .map(|s| s.balance_effect(person))
            .sum();
        Ok(expenses + settled)
    }

    fn group_balances<'a>(&'a self, person: &'a PersonId) -> impl Iterator<Item = Decimal> + 'a {
        self.groups_of(person)
            .map(move |g| self.expense_balance(person, g.id_typed()))
    }

    /// Sum of `balance_for` over every group `person` belongs to.
    ///
    /// Computed as owed minus owing so the two views agree to the last digit.
    pub fn net_balance(&self, person: &PersonId) -> DomainResult<Decimal> {
        Ok(self.balance_summary(person)?.net_balance)
    }

    /// Sum of the positive per-group balances.
    pub fn total_owed(&self, person: &PersonId) -> DomainResult<Decimal> {
        Ok(self.balance_summary(person)?.total_owed)
    }

    /// Sum of the absolute values of the negative per-group balances.
    pub fn total_owing(&self, person: &PersonId) -> DomainResult<Decimal> {
        Ok(self.balance_summary(person)?.total_owing)
    }

    pub fn balance_summary(&self, person: &PersonId) -> DomainResult<BalanceSummary> {
        self.ensure_known(person)?;
        Ok(BalanceSummary::from_group_balances(self.group_balances(person)))
    }

    /// Most recent expense, settlement or registration time in a group.
    pub fn last_activity(&self, group_id: &GroupId) -> DomainResult<DateTime<Utc>> {
        let group = self.group(group_id)?;
        let latest = self
            .expenses_in(group_id)
            .map(Expense::occurred_at)
            .chain(self.settlements_in(group_id).map(Settlement::occurred_at))
            .fold(group.created_at(), |latest, at| latest.max(at));
        Ok(latest)
    }

    pub fn group_summary(
        &self,
        viewer: &PersonId,
        group_id: &GroupId,
    ) -> DomainResult<GroupSummary> {
        let group = self.group(group_id)?;
        let viewer_balance = self.balance_for(viewer, group_id)?;

        Ok(GroupSummary {
            group_id: group.id_typed().clone(),
            name: group.name().to_string(),
            members: group.members().to_vec(),
            color: group.color().to_string(),
            total_expenses: self.total_for(group_id)?,
            viewer: viewer.clone(),
            viewer_balance,
            status: BalanceStatus::from_balance(viewer_balance),
            last_activity: self.last_activity(group_id)?,
        })
    }

    /// One summary per group `viewer` belongs to, in registration order.
    pub fn group_summaries(&self, viewer: &PersonId) -> DomainResult<Vec<GroupSummary>> {
        self.ensure_known(viewer)?;
        self.groups_of(viewer)
            .map(|g| self.group_summary(viewer, g.id_typed()))
            .collect()
    }

    /// Expenses and settlements involving `person`, newest first.
    pub fn recent_activity(
        &self,
        person: &PersonId,
        limit: usize,
    ) -> DomainResult<Vec<RecentActivity>> {
        self.ensure_known(person)?;

        let group_name = |id: &GroupId| {
            self.groups
                .get(id)
                .map(|g| g.name().to_string())
                .unwrap_or_else(|| id.to_string())
        };

        let expenses = self
            .expenses
            .values()
            .filter(|e| e.involves(person))
            .map(|e| RecentActivity {
                id: e.id_typed().to_string(),
                kind: ActivityKind::Expense,
                description: e.description().to_string(),
                amount: -e.amount(),
                group_id: e.group_id().clone(),
                group_name: group_name(e.group_id()),
                occurred_at: e.occurred_at(),
            });

        let payments = self
            .settlements
            .iter()
            .filter(|s| s.involves(person))
            .map(|s| {
                let (description, amount) = if s.recipient() == person {
                    (format!("Payment from {}", s.payer()), s.amount())
                } else {
                    (format!("Payment to {}", s.recipient()), -s.amount())
                };
                RecentActivity {
                    id: s.id_typed().to_string(),
                    kind: ActivityKind::Payment,
                    description,
                    amount,
                    group_id: s.group_id().clone(),
                    group_name: group_name(s.group_id()),
                    occurred_at: s.occurred_at(),
                }
            });

        let mut feed: Vec<RecentActivity> = expenses.chain(payments).collect();
        feed.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then_with(|| a.id.cmp(&b.id)));
        feed.truncate(limit);
        Ok(feed)
    }

    pub fn profile_stats(&self, person: &PersonId) -> DomainResult<ProfileStats> {
        self.ensure_known(person)?;

        let friends: BTreeSet<&PersonId> = self
            .groups_of(person)
            .flat_map(|g| g.members().iter())
            .filter(|m| *m != person)
            .collect();

        Ok(ProfileStats {
            total_groups: self.groups_of(person).count(),
            total_expenses: self.expenses.values().filter(|e| e.involves(person)).count(),
            total_friends: friends.len(),
        })
    }
}

impl AggregateRoot for Ledger {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::GroupRegistered(e) => {
                let id = e.group.key();
                if self.groups.insert(id.clone(), e.group.clone()).is_none() {
                    self.group_order.push(id);
                }
            }
            LedgerEvent::ExpenseRecorded(ExpenseRecorded { expense })
            | LedgerEvent::ExpenseRevised(ExpenseRevised { expense, .. }) => {
                self.expenses.insert(expense.key(), expense.clone());
            }
            LedgerEvent::ExpenseRemoved(e) => {
                self.expenses.remove(&e.expense_id);
            }
            LedgerEvent::PaymentSettled(e) => {
                self.settlements.push(e.settlement.clone());
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LedgerCommand::RegisterGroup(cmd) => self.handle_register_group(cmd),
            LedgerCommand::RecordExpense(cmd) => self.handle_record_expense(cmd),
            LedgerCommand::ReviseExpense(cmd) => self.handle_revise_expense(cmd),
            LedgerCommand::RemoveExpense(cmd) => self.handle_remove_expense(cmd),
            LedgerCommand::SettlePayment(cmd) => self.handle_settle_payment(cmd),
        }
    }
}

impl Ledger {
    /// Payer and every participant must belong to the expense's group.
    fn ensure_expense_membership(&self, expense: &Expense) -> Result<(), DomainError> {
        let group = self.group(expense.group_id())?;
        group.ensure_member(expense.paid_by())?;
        for person in expense.split_between() {
            group.ensure_member(person)?;
        }
        Ok(())
    }

    /// Sum of every recorded expense and settlement amount plus `added`,
    /// leaving out the expense `replacing` (if any). `None` when the sum
    /// leaves the `Decimal` range.
    ///
    /// Keeping this sum representable bounds every total and balance the
    /// queries derive, so reads never overflow.
    fn volume_with(&self, replacing: Option<&ExpenseId>, added: Decimal) -> Option<Decimal> {
        self.expenses
            .values()
            .filter(|e| Some(e.id_typed()) != replacing)
            .map(Expense::amount)
            .chain(self.settlements.iter().map(Settlement::amount))
            .try_fold(added, Decimal::checked_add)
    }

    fn ensure_expense_fits(
        &self,
        expense: &Expense,
        replacing: Option<&ExpenseId>,
    ) -> Result<(), DomainError> {
        match self.volume_with(replacing, expense.amount()) {
            Some(_) => Ok(()),
            None => Err(DomainError::invalid_expense(format!(
                "amount {} overflows the ledger totals",
                expense.amount()
            ))),
        }
    }

    fn handle_register_group(&self, cmd: &RegisterGroup) -> Result<Vec<LedgerEvent>, DomainError> {
        if self.groups.contains_key(&cmd.group_id) {
            return Err(DomainError::duplicate(&cmd.group_id));
        }

        let group = Group::new(
            cmd.group_id.clone(),
            cmd.name.clone(),
            cmd.members.clone(),
            cmd.color.clone(),
            cmd.occurred_at,
        )?;

        Ok(vec![LedgerEvent::GroupRegistered(GroupRegistered { group })])
    }

    fn handle_record_expense(&self, cmd: &RecordExpense) -> Result<Vec<LedgerEvent>, DomainError> {
        let expense = Expense::new(cmd.expense.clone())?;

        if self.expenses.contains_key(expense.id_typed()) {
            return Err(DomainError::duplicate(expense.id_typed()));
        }
        self.ensure_expense_membership(&expense)?;
        self.ensure_expense_fits(&expense, None)?;

        Ok(vec![LedgerEvent::ExpenseRecorded(ExpenseRecorded { expense })])
    }

    fn handle_revise_expense(&self, cmd: &ReviseExpense) -> Result<Vec<LedgerEvent>, DomainError> {
        self.expense(&cmd.expense.expense_id)?;

        let expense = Expense::new(cmd.expense.clone())?;
        self.ensure_expense_membership(&expense)?;
        self.ensure_expense_fits(&expense, Some(expense.id_typed()))?;

        Ok(vec![LedgerEvent::ExpenseRevised(ExpenseRevised {
            expense,
            revised_at: cmd.revised_at,
        })])
    }

    fn handle_remove_expense(&self, cmd: &RemoveExpense) -> Result<Vec<LedgerEvent>, DomainError> {
        let expense = self.expense(&cmd.expense_id)?;

        Ok(vec![LedgerEvent::ExpenseRemoved(ExpenseRemoved {
            expense_id: cmd.expense_id.clone(),
            group_id: expense.group_id().clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_settle_payment(&self, cmd: &SettlePayment) -> Result<Vec<LedgerEvent>, DomainError> {
        if self.settlements.iter().any(|s| s.id_typed() == &cmd.settlement_id) {
            return Err(DomainError::duplicate(&cmd.settlement_id));
        }

        let group = self.group(&cmd.group_id)?;
        let settlement = Settlement::new(
            cmd.settlement_id.clone(),
            cmd.group_id.clone(),
            cmd.from.clone(),
            cmd.to.clone(),
            cmd.amount,
            cmd.occurred_at,
        )?;
        group.ensure_member(settlement.payer())?;
        group.ensure_member(settlement.recipient())?;
        if self.volume_with(None, settlement.amount()).is_none() {
            return Err(DomainError::invalid_settlement(format!(
                "amount {} overflows the ledger totals",
                settlement.amount()
            )));
        }

        Ok(vec![LedgerEvent::PaymentSettled(PaymentSettled { settlement })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use chrono::Duration;
    use proptest::prelude::*;

    fn test_ledger_id() -> LedgerId {
        LedgerId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn person(name: &str) -> PersonId {
        PersonId::new(name)
    }

    fn people(names: &[&str]) -> Vec<PersonId> {
        names.iter().map(|n| person(n)).collect()
    }

    fn register(ledger: &mut Ledger, id: &str, members: &[&str]) {
        ledger
            .execute(&LedgerCommand::RegisterGroup(RegisterGroup {
                group_id: GroupId::new(id),
                name: id.to_string(),
                members: people(members),
                color: None,
                occurred_at: test_time(),
            }))
            .unwrap();
    }

    fn draft(id: &str, group: &str, cents: i64, paid_by: &str, split: &[&str]) -> ExpenseDraft {
        ExpenseDraft {
            expense_id: ExpenseId::new(id),
            description: format!("expense {id}"),
            amount: Decimal::new(cents, 2),
            paid_by: person(paid_by),
            group_id: GroupId::new(group),
            split_between: people(split),
            category: Category::Other,
            location: None,
            occurred_at: test_time(),
        }
    }

    fn record(ledger: &mut Ledger, draft: ExpenseDraft) -> Result<Vec<LedgerEvent>, DomainError> {
        ledger.execute(&LedgerCommand::RecordExpense(RecordExpense { expense: draft }))
    }

    fn trip() -> Ledger {
        let mut ledger = Ledger::empty(test_ledger_id());
        register(&mut ledger, "trip", &["You", "Sarah", "Mike", "Emma"]);
        ledger
    }

    #[test]
    fn record_expense_emits_event_and_bumps_version() {
        let ledger = trip();
        let expense = draft("1", "trip", 8550, "You", &["You", "Sarah", "Mike"]);
        let cmd_time = expense.occurred_at;
        let cmd = LedgerCommand::RecordExpense(RecordExpense { expense });

        let events = ledger.handle(&cmd).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "ledger.expense.recorded");
        assert_eq!(events[0].version(), 1);
        assert_eq!(events[0].occurred_at(), cmd_time);

        let mut ledger = ledger;
        let before = ledger.version();
        ledger.apply(&events[0]);
        assert_eq!(ledger.version(), before + 1);
        assert_eq!(
            ledger.share_of(&ExpenseId::new("1"), &person("Sarah")).unwrap(),
            Decimal::new(2850, 2)
        );
    }

    #[test]
    fn balance_credits_payer_and_debits_participants() {
        let mut ledger = trip();
        record(&mut ledger, draft("1", "trip", 8550, "You", &["You", "Sarah", "Mike"])).unwrap();
        record(&mut ledger, draft("2", "trip", 6725, "Sarah", &["You", "Sarah", "Mike"])).unwrap();

        let trip = GroupId::new("trip");
        // You: +57.00 - 22.41666...
        let you = ledger.balance_for(&person("You"), &trip).unwrap();
        assert_eq!(you.round_dp(2), Decimal::new(3458, 2));
        let emma = ledger.balance_for(&person("Emma"), &trip).unwrap();
        assert_eq!(emma, Decimal::ZERO);
        assert_eq!(ledger.total_for(&trip).unwrap(), Decimal::new(15275, 2));
    }

    #[test]
    fn total_for_empty_group_is_zero() {
        let ledger = trip();
        assert_eq!(ledger.total_for(&GroupId::new("trip")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn unknown_references_are_rejected() {
        let mut ledger = trip();

        let err = record(&mut ledger, draft("1", "nowhere", 100, "You", &["You"])).unwrap_err();
        assert_eq!(err, DomainError::UnknownGroup(GroupId::new("nowhere")));

        let err =
            record(&mut ledger, draft("1", "trip", 100, "You", &["You", "Lisa"])).unwrap_err();
        assert_eq!(err, DomainError::UnknownPerson(person("Lisa")));

        let err = record(&mut ledger, draft("1", "trip", 100, "Tom", &["You"])).unwrap_err();
        assert_eq!(err, DomainError::UnknownPerson(person("Tom")));

        let err = ledger
            .balance_for(&person("Lisa"), &GroupId::new("trip"))
            .unwrap_err();
        assert_eq!(err, DomainError::UnknownPerson(person("Lisa")));

        let err = ledger.net_balance(&person("Lisa")).unwrap_err();
        assert_eq!(err, DomainError::UnknownPerson(person("Lisa")));

        let err = ledger
            .share_of(&ExpenseId::new("404"), &person("You"))
            .unwrap_err();
        assert_eq!(err, DomainError::UnknownExpense(ExpenseId::new("404")));
    }

    #[test]
    fn rejected_command_leaves_state_untouched() {
        let mut ledger = trip();
        record(&mut ledger, draft("1", "trip", 1000, "You", &["You", "Sarah"])).unwrap();
        let snapshot = ledger.clone();

        let err = record(&mut ledger, draft("1", "trip", 5000, "Mike", &["Mike"])).unwrap_err();
        assert_eq!(err, DomainError::DuplicateId("1".to_string()));

        let err = record(&mut ledger, draft("2", "trip", -1, "You", &["You"])).unwrap_err();
        assert!(matches!(err, DomainError::InvalidExpense(_)));

        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn duplicate_group_is_rejected() {
        let mut ledger = trip();
        let err = ledger
            .execute(&LedgerCommand::RegisterGroup(RegisterGroup {
                group_id: GroupId::new("trip"),
                name: "Another trip".to_string(),
                members: people(&["You"]),
                color: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateId("trip".to_string()));
    }

    #[test]
    fn revise_and_remove_recompute_totals() {
        let mut ledger = trip();
        let trip = GroupId::new("trip");
        record(&mut ledger, draft("1", "trip", 1000, "You", &["You", "Sarah"])).unwrap();
        record(&mut ledger, draft("2", "trip", 3000, "Sarah", &["You", "Sarah"])).unwrap();

        ledger
            .execute(&LedgerCommand::ReviseExpense(ReviseExpense {
                expense: draft("1", "trip", 5000, "You", &["You", "Sarah"]),
                revised_at: test_time(),
            }))
            .unwrap();
        assert_eq!(ledger.total_for(&trip).unwrap(), Decimal::new(8000, 2));
        assert_eq!(ledger.balance_for(&person("You"), &trip).unwrap(), Decimal::new(1000, 2));

        ledger
            .execute(&LedgerCommand::RemoveExpense(RemoveExpense {
                expense_id: ExpenseId::new("2"),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(ledger.total_for(&trip).unwrap(), Decimal::new(5000, 2));
        assert_eq!(ledger.balance_for(&person("You"), &trip).unwrap(), Decimal::new(2500, 2));

        let err = ledger
            .execute(&LedgerCommand::RemoveExpense(RemoveExpense {
                expense_id: ExpenseId::new("2"),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::UnknownExpense(ExpenseId::new("2")));
    }

    #[test]
    fn settlements_adjust_outstanding_but_not_expense_balance() {
        let mut ledger = trip();
        let trip = GroupId::new("trip");
        record(&mut ledger, draft("1", "trip", 4000, "You", &["You", "Sarah"])).unwrap();

        ledger
            .execute(&LedgerCommand::SettlePayment(SettlePayment {
                settlement_id: SettlementId::new("s1"),
                group_id: trip.clone(),
                from: person("Sarah"),
                to: person("You"),
                amount: Decimal::new(2000, 2),
                occurred_at: test_time(),
            }))
            .unwrap();

        assert_eq!(ledger.balance_for(&person("Sarah"), &trip).unwrap(), Decimal::new(-2000, 2));
        assert_eq!(ledger.outstanding_balance(&person("Sarah"), &trip).unwrap(), Decimal::ZERO);
        assert_eq!(ledger.outstanding_balance(&person("You"), &trip).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn settlement_with_outsider_is_rejected() {
        let mut ledger = trip();
        let err = ledger
            .execute(&LedgerCommand::SettlePayment(SettlePayment {
                settlement_id: SettlementId::new("s1"),
                group_id: GroupId::new("trip"),
                from: person("Lisa"),
                to: person("You"),
                amount: Decimal::ONE,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::UnknownPerson(person("Lisa")));
        assert!(ledger.settlements().is_empty());
    }

    #[test]
    fn recent_activity_is_newest_first_and_signed() {
        let mut ledger = trip();
        let now = test_time();

        let mut old = draft("1", "trip", 8550, "You", &["You", "Sarah", "Mike"]);
        old.occurred_at = now - Duration::hours(2);
        record(&mut ledger, old).unwrap();

        let mut not_mine = draft("2", "trip", 1000, "Sarah", &["Sarah", "Mike"]);
        not_mine.occurred_at = now - Duration::hours(1);
        record(&mut ledger, not_mine).unwrap();

        ledger
            .execute(&LedgerCommand::SettlePayment(SettlePayment {
                settlement_id: SettlementId::new("s1"),
                group_id: GroupId::new("trip"),
                from: person("Sarah"),
                to: person("You"),
                amount: Decimal::new(4275, 2),
                occurred_at: now,
            }))
            .unwrap();

        let feed = ledger.recent_activity(&person("You"), 10).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].kind, ActivityKind::Payment);
        assert_eq!(feed[0].description, "Payment from Sarah");
        assert_eq!(feed[0].amount, Decimal::new(4275, 2));
        assert_eq!(feed[1].kind, ActivityKind::Expense);
        assert_eq!(feed[1].amount, Decimal::new(-8550, 2));

        let sarah = ledger.recent_activity(&person("Sarah"), 1).unwrap();
        assert_eq!(sarah.len(), 1);
        assert_eq!(sarah[0].amount, Decimal::new(-4275, 2));
    }

    #[test]
    fn search_matches_description_case_insensitively() {
        let mut ledger = trip();
        let mut pizza = draft("1", "trip", 8550, "You", &["You", "Sarah"]);
        pizza.description = "Dinner at Mario's Pizza".to_string();
        record(&mut ledger, pizza).unwrap();
        let mut gas = draft("2", "trip", 6725, "Sarah", &["You", "Sarah"]);
        gas.description = "Gas for Road Trip".to_string();
        record(&mut ledger, gas).unwrap();

        let hits = ledger.search_expenses("PIZZA");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id_typed(), &ExpenseId::new("1"));
        assert_eq!(ledger.search_expenses("").len(), 2);
    }

    #[test]
    fn replaying_events_rebuilds_the_same_state() {
        let id = test_ledger_id();
        let mut ledger = Ledger::empty(id);
        let mut history = Vec::new();

        history.extend(
            ledger
                .execute(&LedgerCommand::RegisterGroup(RegisterGroup {
                    group_id: GroupId::new("trip"),
                    name: "Weekend Trip".to_string(),
                    members: people(&["You", "Sarah"]),
                    color: Some("#3B82F6".to_string()),
                    occurred_at: test_time(),
                }))
                .unwrap(),
        );
        history.extend(
            record(&mut ledger, draft("1", "trip", 100, "You", &["You", "Sarah"])).unwrap(),
        );

        let rebuilt = Ledger::from_events(id, &history);
        assert_eq!(rebuilt, ledger);
        assert_eq!(rebuilt.version(), 2);
    }

    fn large(units: i128) -> Decimal {
        Decimal::from_i128_with_scale(units * 10_000_000_000_000_000_000_000_000_000, 0)
    }

    #[test]
    fn expense_that_overflows_ledger_totals_is_rejected() {
        let mut ledger = trip();
        let trip_id = GroupId::new("trip");
        record(
            &mut ledger,
            ExpenseDraft {
                amount: large(5),
                ..draft("1", "trip", 0, "You", &["You", "Sarah"])
            },
        )
        .unwrap();
        let snapshot = ledger.clone();

        let err = record(
            &mut ledger,
            ExpenseDraft {
                amount: large(5),
                ..draft("2", "trip", 0, "Sarah", &["You", "Sarah"])
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidExpense(_)));
        assert_eq!(ledger, snapshot);

        assert_eq!(ledger.total_for(&trip_id).unwrap(), large(5));
        let summary = ledger.balance_summary(&person("You")).unwrap();
        assert_eq!(summary.total_owed, large(5) / Decimal::TWO);
        let sarah = ledger.balance_summary(&person("Sarah")).unwrap();
        assert_eq!(sarah.total_owing, large(5) / Decimal::TWO);
    }

    #[test]
    fn revision_replaces_the_old_amount_in_the_overflow_check() {
        let mut ledger = trip();
        record(
            &mut ledger,
            ExpenseDraft {
                amount: large(5),
                ..draft("1", "trip", 0, "You", &["You", "Sarah"])
            },
        )
        .unwrap();

        ledger
            .execute(&LedgerCommand::ReviseExpense(ReviseExpense {
                expense: ExpenseDraft {
                    amount: large(7),
                    ..draft("1", "trip", 0, "You", &["You", "Sarah"])
                },
                revised_at: test_time(),
            }))
            .unwrap();
        assert_eq!(ledger.total_for(&GroupId::new("trip")).unwrap(), large(7));

        let version = ledger.version();
        let err = ledger
            .execute(&LedgerCommand::SettlePayment(SettlePayment {
                settlement_id: SettlementId::new("s1"),
                group_id: GroupId::new("trip"),
                from: person("Sarah"),
                to: person("You"),
                amount: large(1),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidSettlement(_)));
        assert_eq!(ledger.version(), version);
    }

    #[test]
    fn queries_stay_in_range_at_the_decimal_maximum() {
        let mut ledger = trip();
        let trip_id = GroupId::new("trip");
        record(
            &mut ledger,
            ExpenseDraft {
                amount: Decimal::MAX,
                ..draft("1", "trip", 0, "You", &["You", "Sarah", "Mike"])
            },
        )
        .unwrap();

        let err = record(&mut ledger, draft("2", "trip", 100, "Mike", &["Mike"])).unwrap_err();
        assert!(matches!(err, DomainError::InvalidExpense(_)));

        assert_eq!(ledger.total_for(&trip_id).unwrap(), Decimal::MAX);
        assert!(ledger.net_balance(&person("You")).unwrap() > Decimal::ZERO);
        assert!(ledger.net_balance(&person("Mike")).unwrap() < Decimal::ZERO);
        assert_eq!(ledger.group_summaries(&person("Sarah")).unwrap().len(), 1);
        assert!(ledger.outstanding_balance(&person("Sarah"), &trip_id).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: balances within a group net to zero, totals match the
        /// recorded amounts, and net balance equals owed minus owing.
        #[test]
        fn balances_are_zero_sum(
            expenses in prop::collection::vec(
                (0i64..1_000_000i64, 0usize..5, prop::collection::vec(any::<bool>(), 5)),
                0..20,
            )
        ) {
            let names = ["You", "Sarah", "Mike", "Emma", "David"];
            let mut ledger = Ledger::empty(test_ledger_id());
            register(&mut ledger, "g", &names);
            register(&mut ledger, "h", &["You", "Sarah"]);
            let group = GroupId::new("g");

            let mut expected_total = Decimal::ZERO;
            for (idx, (cents, payer, mask)) in expenses.into_iter().enumerate() {
                let mut split: Vec<&str> = names
                    .iter()
                    .zip(mask)
                    .filter_map(|(n, keep)| keep.then_some(*n))
                    .collect();
                if split.is_empty() {
                    split.push(names[payer]);
                }
                let id = idx.to_string();
                record(&mut ledger, draft(&id, "g", cents, names[payer], &split)).unwrap();
                expected_total += Decimal::new(cents, 2);
            }
            record(&mut ledger, draft("h1", "h", 999, "Sarah", &["You", "Sarah"])).unwrap();

            prop_assert_eq!(ledger.total_for(&group).unwrap(), expected_total);

            let sum: Decimal = names
                .iter()
                .map(|n| ledger.balance_for(&person(n), &group).unwrap())
                .sum();
            prop_assert!(sum.abs() < Decimal::new(1, 18));

            for n in names {
                let p = person(n);
                let net = ledger.net_balance(&p).unwrap();
                let owed = ledger.total_owed(&p).unwrap();
                let owing = ledger.total_owing(&p).unwrap();
                prop_assert_eq!(net, owed - owing);
            }
        }
    }
}
