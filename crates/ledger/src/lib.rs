//! Expense-splitting ledger (event-sourced).
//!
//! Pure domain logic: groups, expenses, settlements and the balances derived
//! from them. The only shared state is the copy-on-write [`LedgerStore`].

pub mod category;
pub mod expense;
pub mod group;
pub mod ledger;
pub mod sample;
pub mod settlement;
pub mod store;
pub mod views;

pub use category::{Category, DEFAULT_CATEGORY_COLOR, category_color};
pub use expense::{Expense, ExpenseDraft};
pub use group::{DEFAULT_GROUP_COLOR, Group};
pub use ledger::{
    ExpenseRecorded, ExpenseRemoved, ExpenseRevised, GroupRegistered, Ledger, LedgerCommand,
    LedgerEvent, LedgerId, PaymentSettled, RecordExpense, RegisterGroup, RemoveExpense,
    ReviseExpense, SettlePayment,
};
pub use settlement::Settlement;
pub use store::{LedgerEnvelope, LedgerStore, StoreError};
pub use views::{
    ActivityKind, BalanceStatus, BalanceSummary, GroupSummary, ProfileStats, RecentActivity,
};
