//! JSON payloads printed for each screen.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use splitledger_core::{DomainResult, PersonId};
use splitledger_ledger::{
    BalanceSummary, Expense, GroupSummary, Ledger, ProfileStats, RecentActivity,
};

use crate::config::Config;

/// Which screen to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Expenses,
    Groups,
    Profile,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown view `{0}` (expected dashboard, expenses, groups or profile)")]
pub struct UnknownView(String);

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(View::Dashboard),
            "expenses" => Ok(View::Expenses),
            "groups" => Ok(View::Groups),
            "profile" => Ok(View::Profile),
            other => Err(UnknownView(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Dashboard<'a> {
    pub viewer: &'a PersonId,
    pub balance: BalanceSummary,
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseRow<'a> {
    #[serde(flatten)]
    pub expense: &'a Expense,
    pub category_color: &'static str,
    /// Viewer's share, when the viewer splits this expense.
    pub viewer_share: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct Profile<'a> {
    pub viewer: &'a PersonId,
    pub stats: ProfileStats,
}

fn expense_rows<'a>(ledger: &'a Ledger, config: &Config) -> Vec<ExpenseRow<'a>> {
    let expenses = match &config.search {
        Some(query) => ledger.search_expenses(query),
        None => ledger.expenses(),
    };

    expenses
        .into_iter()
        .map(|expense| ExpenseRow {
            expense,
            category_color: expense.category().color(),
            viewer_share: expense.share_of(&config.active_user).ok(),
        })
        .collect()
}

fn group_rows(ledger: &Ledger, config: &Config) -> DomainResult<Vec<GroupSummary>> {
    ledger.group_summaries(&config.active_user)
}

/// Render `view` of `ledger` as pretty-printed JSON.
pub fn render(view: View, ledger: &Ledger, config: &Config) -> anyhow::Result<String> {
    let viewer = &config.active_user;

    let json = match view {
        View::Dashboard => serde_json::to_string_pretty(&Dashboard {
            viewer,
            balance: ledger.balance_summary(viewer)?,
            recent_activity: ledger.recent_activity(viewer, config.activity_limit)?,
        })?,
        View::Expenses => serde_json::to_string_pretty(&expense_rows(ledger, config))?,
        View::Groups => serde_json::to_string_pretty(&group_rows(ledger, config)?)?,
        View::Profile => serde_json::to_string_pretty(&Profile {
            viewer,
            stats: ledger.profile_stats(viewer)?,
        })?,
    };

    Ok(json)
}
