//! The demo dataset shown on first launch.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use splitledger_core::{
    Aggregate, AggregateId, DomainResult, ExpenseId, GroupId, PersonId, SettlementId,
};

use crate::category::Category;
use crate::expense::ExpenseDraft;
use crate::ledger::{Ledger, LedgerCommand, LedgerId, RecordExpense, RegisterGroup, SettlePayment};

/// The person the demo data is seen from.
pub const ACTIVE_USER: &str = "You";

fn people(names: &[&str]) -> Vec<PersonId> {
    names.iter().map(|n| PersonId::new(*n)).collect()
}

fn group(
    id: &str,
    name: &str,
    members: &[&str],
    color: &str,
    occurred_at: DateTime<Utc>,
) -> LedgerCommand {
    LedgerCommand::RegisterGroup(RegisterGroup {
        group_id: GroupId::new(id),
        name: name.to_string(),
        members: people(members),
        color: Some(color.to_string()),
        occurred_at,
    })
}

struct Spent<'a> {
    id: &'a str,
    description: &'a str,
    cents: i64,
    paid_by: &'a str,
    group: &'a str,
    split: &'a [&'a str],
    category: Category,
    location: Option<&'a str>,
    occurred_at: DateTime<Utc>,
}

fn expense(spent: Spent<'_>) -> LedgerCommand {
    LedgerCommand::RecordExpense(RecordExpense {
        expense: ExpenseDraft {
            expense_id: ExpenseId::new(spent.id),
            description: spent.description.to_string(),
            amount: Decimal::new(spent.cents, 2),
            paid_by: PersonId::new(spent.paid_by),
            group_id: GroupId::new(spent.group),
            split_between: people(spent.split),
            category: spent.category,
            location: spent.location.map(str::to_string),
            occurred_at: spent.occurred_at,
        },
    })
}

/// Commands that build the demo ledger, timed relative to `now`.
pub fn sample_commands(now: DateTime<Utc>) -> Vec<LedgerCommand> {
    let month_ago = now - Duration::days(30);

    vec![
        group(
            "weekend-trip",
            "Weekend Trip",
            &["You", "Sarah", "Mike", "Emma"],
            "#3B82F6",
            month_ago,
        ),
        group("roommates", "Roommates", &["You", "Mike", "John"], "#10B981", month_ago),
        group(
            "work-lunch",
            "Work Lunch Group",
            &["You", "Sarah", "David", "Lisa", "Tom"],
            "#F97316",
            month_ago,
        ),
        group("monthly-groceries", "Monthly Groceries", &["You", "Emma"], "#8B5CF6", month_ago),
        group("friends", "Friends", &["You", "Sarah", "Emma", "David"], "#EC4899", month_ago),
        group("apartment-rent", "Apartment Rent", &["You", "Sarah"], "#06B6D4", month_ago),
        expense(Spent {
            id: "1",
            description: "Dinner at Mario's Pizza",
            cents: 8550,
            paid_by: "You",
            group: "weekend-trip",
            split: &["You", "Sarah", "Mike"],
            category: Category::FoodAndDining,
            location: Some("Downtown"),
            occurred_at: now - Duration::hours(2),
        }),
        expense(Spent {
            id: "2",
            description: "Gas for Road Trip",
            cents: 6725,
            paid_by: "Sarah",
            group: "weekend-trip",
            split: &["You", "Sarah", "Mike"],
            category: Category::Transportation,
            location: None,
            occurred_at: now - Duration::days(1),
        }),
        expense(Spent {
            id: "3",
            description: "Grocery Shopping",
            cents: 12730,
            paid_by: "Mike",
            group: "roommates",
            split: &["You", "Mike", "John"],
            category: Category::Groceries,
            location: None,
            occurred_at: now - Duration::days(3),
        }),
        expense(Spent {
            id: "4",
            description: "Movie Tickets",
            cents: 4200,
            paid_by: "You",
            group: "friends",
            split: &["You", "Sarah", "Emma", "David"],
            category: Category::Entertainment,
            location: None,
            occurred_at: now - Duration::weeks(1),
        }),
        expense(Spent {
            id: "5",
            description: "Cabin Rental",
            cents: 33450,
            paid_by: "Emma",
            group: "weekend-trip",
            split: &["You", "Sarah", "Mike", "Emma"],
            category: Category::Other,
            location: Some("Lake Tahoe"),
            occurred_at: now - Duration::days(1) - Duration::hours(3),
        }),
        LedgerCommand::SettlePayment(SettlePayment {
            settlement_id: SettlementId::new("p1"),
            group_id: GroupId::new("apartment-rent"),
            from: PersonId::new("Sarah"),
            to: PersonId::new("You"),
            amount: Decimal::new(4275, 2),
            occurred_at: now - Duration::days(1) + Duration::hours(1),
        }),
    ]
}

/// Demo ledger built from [`sample_commands`].
pub fn sample_ledger(now: DateTime<Utc>) -> DomainResult<Ledger> {
    let mut ledger = Ledger::empty(LedgerId::new(AggregateId::new()));
    for command in sample_commands(now) {
        ledger.execute(&command)?;
    }
    Ok(ledger)
}
