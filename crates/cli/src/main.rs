//! `splitledger` — prints the demo ledger's screens as JSON.
//!
//! Usage: `splitledger [dashboard|expenses|groups|profile]`

mod config;
mod views;

use anyhow::Context;
use chrono::Utc;

use splitledger_core::{AggregateId, AggregateRoot};
use splitledger_ledger::sample::sample_commands;
use splitledger_ledger::{LedgerId, LedgerStore};

use crate::config::Config;
use crate::views::View;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    splitledger_observability::init_with(config.log_format);

    let view = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<View>()?,
        None => View::default(),
    };

    let store = LedgerStore::new(LedgerId::new(AggregateId::new()));
    for command in sample_commands(Utc::now()) {
        store
            .dispatch(command)
            .context("failed to load sample data")?;
    }

    let ledger = store.snapshot()?;
    tracing::info!(
        viewer = %config.active_user,
        view = ?view,
        version = ledger.version(),
        "rendering view"
    );

    println!("{}", views::render(view, &ledger, &config)?);
    Ok(())
}
