//! Spreading revenue across the calendar months a subscription covers
//!
//! A record with `active_months = N` contributes `net / N` to N consecutive
//! calendar months starting at the month of its transaction date. Buckets are
//! whole months: the day of month plays no part, so a subscription starting
//! on Jan 31 covers Jan, Feb and Mar rather than skipping February.

use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::constants::MONTH_ABBREVIATIONS;
use crate::error::RevenueError;
use crate::records::{Snapshot, SubscriptionRecord};
use crate::revenue::TaxPolicy;
use crate::totals::OrderedTotals;

/// Net revenue per calendar month, in first-seen order
pub type MonthlySeries = OrderedTotals<YearMonth, f64>;

/// A calendar month, ordered chronologically and labelled like "Jan 2025"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// `month` is 1-based
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn plus_months(self, months: u32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(months);
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            MONTH_ABBREVIATIONS[self.month as usize - 1],
            self.year
        )
    }
}

impl std::str::FromStr for YearMonth {
    type Err = RevenueError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let invalid = || RevenueError::InvalidMonthLabel(label.to_string());

        let (name, year) = label.trim().split_once(' ').ok_or_else(invalid)?;
        let month = MONTH_ABBREVIATIONS
            .iter()
            .position(|abbr| abbr.eq_ignore_ascii_case(name))
            .ok_or_else(invalid)?;
        let year = year.trim().parse::<i32>().map_err(|_| invalid())?;

        Ok(Self {
            year,
            month: month as u32 + 1,
        })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl SubscriptionRecord {
    /// The calendar months this record's revenue is spread over
    pub fn active_buckets(&self) -> impl Iterator<Item = YearMonth> + use<> {
        let start = YearMonth::of(&self.transaction_date);
        (0..self.active_months).map(move |i| start.plus_months(i))
    }

    /// Net revenue attributed to each active month
    pub fn monthly_share(&self, tax: &TaxPolicy) -> f64 {
        tax.net_revenue(self.paid, &self.category) / f64::from(self.active_months.max(1))
    }
}

/// Revenue attributed to the month containing `now`
pub fn current_month_revenue(snapshot: &Snapshot, tax: &TaxPolicy, now: NaiveDateTime) -> f64 {
    let current = YearMonth::of(&now);
    snapshot
        .iter()
        .filter(|r| r.active_buckets().any(|bucket| bucket == current))
        .map(|r| r.monthly_share(tax))
        .sum()
}

/// Every record's monthly shares accumulated per month.
/// Keys come out in first-seen order; use [`MonthlySeries::sorted`] for a
/// chronological view.
pub fn monthly_series(snapshot: &Snapshot, tax: &TaxPolicy) -> MonthlySeries {
    let mut series = MonthlySeries::new();
    for record in snapshot {
        let share = record.monthly_share(tax);
        for bucket in record.active_buckets() {
            series.add(bucket, share);
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{approx_eq, date, record};
    use chrono::NaiveDate;

    fn spread(category: &str, paid: f64, start: NaiveDate, months: u32) -> SubscriptionRecord {
        let mut r = record(category, paid, "Yes", start);
        r.active_months = months;
        r
    }

    fn ym(label: &str) -> YearMonth {
        label.parse().unwrap()
    }

    #[test]
    fn test_three_month_spread() {
        let snapshot = Snapshot::new(vec![spread("Paid Nowpayments", 300.0, date(2025, 1, 15), 3)]);
        let series = monthly_series(&snapshot, &TaxPolicy::default());

        let labels: Vec<String> = series.keys().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["Jan 2025", "Feb 2025", "Mar 2025"]);
        for (_, amount) in series.iter() {
            assert!(approx_eq(amount, 100.0));
        }
        assert!(approx_eq(series.values().sum::<f64>(), 300.0));
    }

    #[test]
    fn test_stripe_share_is_net() {
        let snapshot = Snapshot::new(vec![spread("Paid Stripe", 100.0, date(2025, 5, 2), 1)]);
        let series = monthly_series(&snapshot, &TaxPolicy::default());
        assert!(approx_eq(series.get(&ym("May 2025")).unwrap(), 77.0));
    }

    #[test]
    fn test_month_end_start_covers_every_month() {
        let r = spread("Giveaway", 0.0, date(2025, 1, 31), 3);
        let buckets: Vec<String> = r.active_buckets().map(|b| b.to_string()).collect();
        assert_eq!(buckets, vec!["Jan 2025", "Feb 2025", "Mar 2025"]);
    }

    #[test]
    fn test_spread_wraps_year() {
        let r = spread("Giveaway", 0.0, date(2024, 11, 20), 4);
        let buckets: Vec<String> = r.active_buckets().map(|b| b.to_string()).collect();
        assert_eq!(buckets, vec!["Nov 2024", "Dec 2024", "Jan 2025", "Feb 2025"]);
    }

    #[test]
    fn test_series_accumulates_in_first_seen_order() {
        let snapshot = Snapshot::new(vec![
            spread("Paid Nowpayments", 60.0, date(2025, 3, 1), 2),
            spread("Paid Nowpayments", 20.0, date(2025, 1, 1), 3),
        ]);
        let series = monthly_series(&snapshot, &TaxPolicy::default());

        let labels: Vec<String> = series.keys().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["Mar 2025", "Apr 2025", "Jan 2025", "Feb 2025"]);
        assert!(approx_eq(series.get(&ym("Mar 2025")).unwrap(), 30.0 + 20.0 / 3.0));

        let chronological: Vec<String> =
            series.sorted().iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(chronological, vec!["Jan 2025", "Feb 2025", "Mar 2025", "Apr 2025"]);
    }

    #[test]
    fn test_current_month_revenue() {
        let snapshot = Snapshot::new(vec![
            spread("Paid Nowpayments", 300.0, date(2025, 1, 15), 3),
            spread("Paid Stripe", 100.0, date(2025, 2, 28), 1),
            spread("Paid Nowpayments", 50.0, date(2025, 4, 1), 1),
        ]);
        let tax = TaxPolicy::default();

        let feb = date(2025, 2, 10).and_hms_opt(9, 0, 0).unwrap();
        assert!(approx_eq(current_month_revenue(&snapshot, &tax, feb), 177.0));

        let apr = date(2025, 4, 30).and_hms_opt(23, 0, 0).unwrap();
        assert!(approx_eq(current_month_revenue(&snapshot, &tax, apr), 50.0));

        // Same month a year later is a different bucket
        let next_year = date(2026, 2, 10).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(current_month_revenue(&snapshot, &tax, next_year), 0.0);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(ym("Sep 2025"), YearMonth::new(2025, 9).unwrap());
        assert_eq!(ym("dec 1999").month(), 12);
        assert!("September 2025".parse::<YearMonth>().is_err());
        assert!("Jan".parse::<YearMonth>().is_err());
        assert!(YearMonth::new(2025, 13).is_none());
    }

    #[test]
    fn test_zero_revenue_categories_still_create_buckets() {
        let snapshot = Snapshot::new(vec![spread("Giveaway", 0.0, date(2025, 6, 1), 2)]);
        let series = monthly_series(&snapshot, &TaxPolicy::default());
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(&ym("Jul 2025")), Some(0.0));
    }
}
