//! Most recent transactions with display status and amount

use std::cmp::Reverse;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::records::{Snapshot, SubscriptionRecord};
use crate::revenue::TaxPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayStatus {
    Active,
    Inactive,
    /// Still flagged active but past its expiration date
    Expired,
}

impl DisplayStatus {
    pub fn of(record: &SubscriptionRecord, now: NaiveDateTime) -> Self {
        if record.is_expired_at(now) {
            DisplayStatus::Expired
        } else if record.is_active() {
            DisplayStatus::Active
        } else {
            DisplayStatus::Inactive
        }
    }
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayStatus::Active => write!(f, "Active"),
            DisplayStatus::Inactive => write!(f, "Inactive"),
            DisplayStatus::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentRow<'a> {
    pub record: &'a SubscriptionRecord,
    pub status: DisplayStatus,
    pub net_amount: f64,
    /// e.g. "$77.00 ($100.00 - 23%)" for taxed payments, "$45.00" otherwise
    pub display_amount: String,
}

/// The `limit` most recent records, newest first.
/// Records sharing a transaction date keep their snapshot order.
pub fn recent_transactions<'a>(
    snapshot: &'a Snapshot,
    tax: &TaxPolicy,
    now: NaiveDateTime,
    limit: usize,
) -> Vec<RecentRow<'a>> {
    let mut records: Vec<&SubscriptionRecord> = snapshot.iter().collect();
    records.sort_by_key(|r| Reverse(r.transaction_date));

    records
        .into_iter()
        .take(limit)
        .map(|record| RecentRow {
            record,
            status: DisplayStatus::of(record, now),
            net_amount: tax.net_revenue(record.paid, &record.category),
            display_amount: display_amount(record, tax),
        })
        .collect()
}

fn display_amount(record: &SubscriptionRecord, tax: &TaxPolicy) -> String {
    let net = tax.net_revenue(record.paid, &record.category);
    if record.category.is_taxed() {
        format!(
            "${:.2} (${:.2} - {}%)",
            net,
            record.paid,
            format_rate(tax.rate_for(&record.category))
        )
    } else {
        format!("${:.2}", net)
    }
}

/// 0.23 -> "23", 0.125 -> "12.5"
fn format_rate(rate: f64) -> String {
    let percent = (rate * 100.0 * 100.0).round() / 100.0;
    format!("{}", percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, record};

    #[test]
    fn test_keeps_latest_ten_newest_first() {
        let records = (1..=15)
            .map(|day| record("Paid Nowpayments", 10.0, "Yes", date(2025, 3, day)))
            .collect();
        let snapshot = Snapshot::new(records);
        let now = date(2025, 3, 20).and_hms_opt(0, 0, 0).unwrap();

        let rows = recent_transactions(&snapshot, &TaxPolicy::default(), now, 10);
        assert_eq!(rows.len(), 10);

        let dates: Vec<_> = rows.iter().map(|r| r.record.transaction_date).collect();
        assert_eq!(dates.first(), Some(&date(2025, 3, 15)));
        assert_eq!(dates.last(), Some(&date(2025, 3, 6)));
        assert!(dates.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn test_fewer_records_than_limit() {
        let snapshot = Snapshot::new(vec![record("Giveaway", 0.0, "No", date(2025, 1, 1))]);
        let now = date(2025, 1, 2).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(
            recent_transactions(&snapshot, &TaxPolicy::default(), now, 10).len(),
            1
        );
    }

    #[test]
    fn test_status_and_amount_annotation() {
        let snapshot = Snapshot::new(vec![
            record("Paid Stripe", 100.0, "Yes", date(2025, 1, 1)),
            record("Paid Nowpayments", 45.0, "Yes", date(2025, 3, 1)),
            record("Giveaway", 0.0, "No", date(2025, 2, 1)),
            record("Giveaway", 0.0, "Unknown", date(2024, 12, 1)),
        ]);
        let now = date(2025, 3, 10).and_hms_opt(0, 0, 0).unwrap();
        let rows = recent_transactions(&snapshot, &TaxPolicy::default(), now, 10);

        assert_eq!(rows[0].status, DisplayStatus::Active);
        assert_eq!(rows[0].display_amount, "$45.00");

        assert_eq!(rows[1].status, DisplayStatus::Inactive);

        // Expired 2025-02-01 but still flagged active
        assert_eq!(rows[2].status, DisplayStatus::Expired);
        assert_eq!(rows[2].display_amount, "$77.00 ($100.00 - 23%)");
        assert!((rows[2].net_amount - 77.0).abs() < 1e-9);

        assert_eq!(rows[3].status, DisplayStatus::Inactive);
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.23), "23");
        assert_eq!(format_rate(0.125), "12.5");
    }
}
