//! Refreshing the snapshot through the store
//!
//! Each refresh takes a ticket before loading, so a refresh that started
//! earlier can never overwrite one that started later. A failed load leaves
//! the last-good snapshot in place and nothing is re-rendered.

use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use std::time::Duration;
use subscription_revenue::{RefreshOutcome, SnapshotStore};

use crate::config::Config;
use crate::fetch::SnapshotSource;
use crate::reports::{self, DashboardView};

/// Load a new snapshot and try to commit it
pub async fn refresh(
    store: &SnapshotStore,
    source: &SnapshotSource,
    client: &reqwest::Client,
) -> Result<RefreshOutcome> {
    let ticket = store.begin_refresh();
    let snapshot = source.load(client).await?;
    Ok(store.commit(ticket, snapshot))
}

pub struct WatchOptions {
    pub interval: Duration,
    /// Stop after this many refreshes (runs forever when None)
    pub iterations: Option<u64>,
    /// Fixed evaluation moment; wall clock when None
    pub now: Option<NaiveDateTime>,
}

/// Refresh on an interval and print the report after every commit
pub async fn watch(
    store: &SnapshotStore,
    source: &SnapshotSource,
    client: &reqwest::Client,
    config: &Config,
    options: &WatchOptions,
) -> Result<()> {
    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut completed = 0u64;
    loop {
        if options.iterations.is_some_and(|limit| completed >= limit) {
            break;
        }
        ticker.tick().await;
        completed += 1;

        match refresh(store, source, client).await {
            Ok(RefreshOutcome::Committed { generation, records }) => {
                tracing::info!(generation, records, "dashboard refreshed");
                let snapshot = store.current();
                let now = options.now.unwrap_or_else(|| Utc::now().naive_utc());
                let view = DashboardView::build(&snapshot, config, now);
                reports::print_summary(&view);
            }
            Ok(RefreshOutcome::Superseded { generation, latest }) => {
                tracing::warn!(generation, latest, "refresh superseded, skipping render");
            }
            Err(e) => {
                tracing::error!(error = %e, "refresh failed");
                eprintln!(
                    "  Warning: Failed to load subscriptions: {:#}\n  Keeping last loaded data ({} records)",
                    e,
                    store.current().len()
                );
            }
        }
    }

    Ok(())
}
