//! Net revenue and the scalar dashboard metrics
//!
//! Every amount passes through [`TaxPolicy::net_revenue`] before it is summed,
//! so the Stripe deduction is applied in exactly one place.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::constants;
use crate::error::{Result, RevenueError};
use crate::monthly;
use crate::records::{Category, Snapshot};
use crate::totals::OrderedTotals;

/// Net revenue per category, in first-seen order
pub type CategoryRevenue = OrderedTotals<Category, f64>;

/// Processor tax applied to gross payments
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxPolicy {
    stripe_rate: f64,
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            stripe_rate: constants::STRIPE_TAX_RATE,
        }
    }
}

impl TaxPolicy {
    /// Policy with a custom Stripe rate in `[0, 1)`
    pub fn new(stripe_rate: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&stripe_rate) {
            return Err(RevenueError::InvalidConfig(format!(
                "stripe tax rate must be in [0, 1), got {stripe_rate}"
            )));
        }
        Ok(Self { stripe_rate })
    }

    pub fn stripe_rate(&self) -> f64 {
        self.stripe_rate
    }

    pub fn rate_for(&self, category: &Category) -> f64 {
        if category.is_taxed() {
            self.stripe_rate
        } else {
            0.0
        }
    }

    /// Amount actually received for a payment of `amount` in `category`
    pub fn net_revenue(&self, amount: f64, category: &Category) -> f64 {
        amount * (1.0 - self.rate_for(category))
    }
}

/// Net revenue under the default 23% Stripe rate
pub fn net_revenue(amount: f64, category: &Category) -> f64 {
    TaxPolicy::default().net_revenue(amount, category)
}

/// Lifetime net revenue; inactive and expired records still count
pub fn total_revenue(snapshot: &Snapshot, tax: &TaxPolicy) -> f64 {
    snapshot
        .iter()
        .map(|r| tax.net_revenue(r.paid, &r.category))
        .sum()
}

pub fn active_count(snapshot: &Snapshot) -> usize {
    snapshot.iter().filter(|r| r.is_active()).count()
}

pub fn inactive_count(snapshot: &Snapshot) -> usize {
    snapshot.iter().filter(|r| r.is_inactive()).count()
}

/// Records still flagged active whose expiration has passed at `now`
pub fn expired_count(snapshot: &Snapshot, now: NaiveDateTime) -> usize {
    snapshot.iter().filter(|r| r.is_expired_at(now)).count()
}

/// Mean net revenue over paying records (0 when nobody paid)
pub fn average_transaction(snapshot: &Snapshot, tax: &TaxPolicy) -> f64 {
    let (count, total) = snapshot
        .iter()
        .filter(|r| r.paid > 0.0)
        .fold((0usize, 0.0f64), |(count, total), r| {
            (count + 1, total + tax.net_revenue(r.paid, &r.category))
        });

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

pub fn revenue_by_category(snapshot: &Snapshot, tax: &TaxPolicy) -> CategoryRevenue {
    let mut totals = CategoryRevenue::new();
    for record in snapshot {
        totals.add(
            record.category.clone(),
            tax.net_revenue(record.paid, &record.category),
        );
    }
    totals
}

/// Number of records per category, in first-seen order
pub fn category_counts(snapshot: &Snapshot) -> OrderedTotals<Category, usize> {
    let mut counts = OrderedTotals::new();
    for record in snapshot {
        counts.add(record.category.clone(), 1);
    }
    counts
}

pub fn count_in_category(snapshot: &Snapshot, category: &Category) -> usize {
    snapshot.iter().filter(|r| &r.category == category).count()
}

/// Scalar metrics shown in the dashboard header and status cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_revenue: f64,
    pub active_count: usize,
    pub inactive_count: usize,
    pub expired_count: usize,
    pub average_transaction: f64,
    pub current_month_revenue: f64,
}

impl DashboardMetrics {
    /// Recompute every metric from `snapshot` as of `now`
    pub fn compute(snapshot: &Snapshot, tax: &TaxPolicy, now: NaiveDateTime) -> Self {
        Self {
            total_revenue: total_revenue(snapshot, tax),
            active_count: active_count(snapshot),
            inactive_count: inactive_count(snapshot),
            expired_count: expired_count(snapshot, now),
            average_transaction: average_transaction(snapshot, tax),
            current_month_revenue: monthly::current_month_revenue(snapshot, tax, now),
        }
    }
}
