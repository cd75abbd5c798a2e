//! Report generation (CSV outputs and console summary)

use anyhow::Result;
use chrono::NaiveDateTime;
use csv::Writer;
use std::path::Path;
use subscription_revenue::{
    Category, CategoryRevenue, DashboardMetrics, GoalProgress, GoalTargets, RecentRow, Snapshot,
    Waterfall, YearMonth, goals, monthly, recent, revenue,
};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Config;
use crate::constants;

/// Every derived view of one snapshot, computed once per render
pub struct DashboardView<'a> {
    pub now: NaiveDateTime,
    pub records: usize,
    pub metrics: DashboardMetrics,
    pub targets: GoalTargets,
    pub goals: Waterfall,
    pub category_revenue: CategoryRevenue,
    /// Counts for the fixed status cards: Stripe, NOWPayments, Giveaway
    pub category_cards: [(Category, usize); 3],
    /// Monthly revenue in chronological order
    pub monthly: Vec<(YearMonth, f64)>,
    pub recent: Vec<RecentRow<'a>>,
}

impl<'a> DashboardView<'a> {
    pub fn build(snapshot: &'a Snapshot, config: &Config, now: NaiveDateTime) -> Self {
        let metrics = DashboardMetrics::compute(snapshot, &config.tax, now);
        let goals = goals::allocate(metrics.total_revenue, &config.goals);
        let card = |category: Category| {
            let count = revenue::count_in_category(snapshot, &category);
            (category, count)
        };

        Self {
            now,
            records: snapshot.len(),
            targets: config.goals,
            goals,
            category_revenue: revenue::revenue_by_category(snapshot, &config.tax),
            category_cards: [
                card(Category::PaidStripe),
                card(Category::PaidNowpayments),
                card(Category::Giveaway),
            ],
            monthly: monthly::monthly_series(snapshot, &config.tax).sorted(),
            recent: recent::recent_transactions(snapshot, &config.tax, now, config.recent_limit),
            metrics,
        }
    }
}

/// Generate all CSV reports
pub fn generate_all_reports(output_dir: &Path, view: &DashboardView) -> Result<()> {
    generate_goals(output_dir, view)?;
    generate_category_revenue(output_dir, view)?;
    generate_monthly_revenue(output_dir, view)?;
    generate_recent_subscriptions(output_dir, view)?;

    Ok(())
}

/// Generate goals.csv
fn generate_goals(output_dir: &Path, view: &DashboardView) -> Result<()> {
    let path = output_dir.join(constants::GOALS_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Goal",
        "Target_USD",
        "Current_USD",
        "Progress_Percent",
        "Remaining_USD",
    ])?;

    for (name, target, progress) in [
        ("Operational", view.targets.operational, &view.goals.operational),
        ("Secondary", view.targets.secondary, &view.goals.secondary),
    ] {
        wtr.write_record([
            name,
            &format!("{:.2}", target),
            &format!("{:.2}", progress.current_amount),
            &format!("{:.2}", progress.progress_percent),
            &format!("{:.2}", progress.remaining_amount),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Generate category_revenue.csv
fn generate_category_revenue(output_dir: &Path, view: &DashboardView) -> Result<()> {
    let path = output_dir.join(constants::CATEGORY_REVENUE_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Category", "Net_Revenue_USD"])?;
    for (category, amount) in view.category_revenue.iter() {
        wtr.write_record([category.as_str(), &format!("{:.2}", amount)])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Generate monthly_revenue.csv (chronological)
fn generate_monthly_revenue(output_dir: &Path, view: &DashboardView) -> Result<()> {
    let path = output_dir.join(constants::MONTHLY_REVENUE_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Month", "Net_Revenue_USD"])?;
    for (month, amount) in &view.monthly {
        wtr.write_record([month.to_string(), format!("{:.2}", amount)])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Generate recent_subscriptions.csv
fn generate_recent_subscriptions(output_dir: &Path, view: &DashboardView) -> Result<()> {
    let path = output_dir.join(constants::RECENT_SUBSCRIPTIONS_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Email",
        "Category",
        "Status",
        "Paid_USD",
        "Net_USD",
        "Transaction_Date",
        "Expiration_Date",
    ])?;

    for row in &view.recent {
        let record = row.record;
        wtr.write_record([
            record.email.clone(),
            record.category.to_string(),
            row.status.to_string(),
            format!("{:.2}", record.paid),
            format!("{:.2}", row.net_amount),
            record.transaction_date.to_string(),
            record.expiration_date.to_string(),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

#[derive(Tabled)]
struct RecentTableRow {
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Transaction")]
    transaction_date: String,
    #[tabled(rename = "Expires")]
    expiration_date: String,
}

impl From<&RecentRow<'_>> for RecentTableRow {
    fn from(row: &RecentRow<'_>) -> Self {
        Self {
            email: row.record.email.clone(),
            category: row.record.category.to_string(),
            status: row.status.to_string(),
            amount: row.display_amount.clone(),
            transaction_date: row.record.transaction_date.to_string(),
            expiration_date: row.record.expiration_date.date().to_string(),
        }
    }
}

fn print_goal(name: &str, target: f64, progress: &GoalProgress) {
    println!(
        "  {:<18} ${:>10.2} / ${:>10.2}  {:>5.1}%   ${:>10.2} to go",
        name,
        progress.current_amount,
        target,
        progress.progress_percent,
        progress.remaining_amount
    );
}

/// Print summary to console
pub fn print_summary(view: &DashboardView) {
    println!("\n============================================================");
    println!("                 SUBSCRIPTION REVENUE SUMMARY");
    println!("          as of {}  ({} records)", view.now.format("%Y-%m-%d %H:%M"), view.records);
    println!("============================================================\n");

    println!("GOALS:");
    print_goal("Operational Cost", view.targets.operational, &view.goals.operational);
    print_goal("Secondary", view.targets.secondary, &view.goals.secondary);
    if view.goals.overflow > 0.0 {
        println!("  Unallocated:       ${:>10.2}", view.goals.overflow);
    }

    let m = &view.metrics;
    println!("\nKEY METRICS:");
    println!("  Total Revenue:      ${:>10.2}", m.total_revenue);
    println!("  Active Subs:         {:>10}", m.active_count);
    println!("  This Month:         ${:>10.2}", m.current_month_revenue);
    println!("  Avg Transaction:    ${:>10.2}", m.average_transaction);

    println!("\nSTATUS:");
    println!("  Active:              {:>10}", m.active_count);
    println!("  Inactive:            {:>10}", m.inactive_count);
    for (category, count) in &view.category_cards {
        println!("  {:<19}{:>10}", format!("{}:", category), count);
    }
    println!("  Expired:             {:>10}", m.expired_count);

    println!("\nREVENUE BY CATEGORY:");
    if view.category_revenue.is_empty() {
        println!("  (none)");
    }
    for (category, amount) in view.category_revenue.iter() {
        println!("  {:<19}${:>10.2}", format!("{}:", category), amount);
    }

    println!("\nMONTHLY REVENUE:");
    if view.monthly.is_empty() {
        println!("  (none)");
    }
    for (month, amount) in &view.monthly {
        println!("  {:<19}${:>10.2}", month.to_string(), amount);
    }

    println!("\nRECENT SUBSCRIPTIONS:");
    if view.recent.is_empty() {
        println!("  (none)");
    } else {
        let rows: Vec<RecentTableRow> = view.recent.iter().map(RecentTableRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::psql());
        println!("{}", table);
    }

    println!("============================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use chrono::NaiveDate;

    const DOCUMENT: &str = r#"{"subscriptions":[
        {"email":"a@example.com","category":"Paid Stripe","paid":100,"active":"Yes",
         "transactionDate":"2025-01-15","expirationDate":"2025-02-15","activeMonths":1},
        {"email":"b@example.com","category":"Paid Nowpayments","paid":300,"active":"Yes",
         "transactionDate":"2025-02-01","expirationDate":"2025-05-01","activeMonths":3},
        {"email":"c@example.com","category":"Giveaway","paid":0,"active":"No",
         "transactionDate":"2024-12-24","expirationDate":"2025-01-24"}
    ]}"#;

    fn view_for(snapshot: &Snapshot) -> DashboardView<'_> {
        let config = Config::from_file(&FileConfig::default(), None).unwrap();
        let now = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        DashboardView::build(snapshot, &config, now)
    }

    #[test]
    fn test_view_collects_all_sections() {
        let snapshot = Snapshot::from_json(DOCUMENT).unwrap();
        let view = view_for(&snapshot);

        assert!((view.metrics.total_revenue - 377.0).abs() < 1e-9);
        assert!((view.metrics.current_month_revenue - 100.0).abs() < 1e-9);
        assert_eq!(view.metrics.expired_count, 1);
        assert_eq!(view.category_cards[0], (Category::PaidStripe, 1));
        assert_eq!(view.category_cards[2], (Category::Giveaway, 1));

        let months: Vec<String> = view.monthly.iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(months, vec!["Dec 2024", "Jan 2025", "Feb 2025", "Mar 2025", "Apr 2025"]);

        assert_eq!(view.recent[0].record.email, "b@example.com");
        assert_eq!(view.goals.secondary.current_amount, 0.0);
    }

    #[test]
    fn test_generate_all_reports_writes_csv() {
        let snapshot = Snapshot::from_json(DOCUMENT).unwrap();
        let view = view_for(&snapshot);

        let dir = std::env::temp_dir().join(format!("revenue-dashboard-reports-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        generate_all_reports(&dir, &view).unwrap();

        let monthly = std::fs::read_to_string(dir.join(constants::MONTHLY_REVENUE_FILENAME)).unwrap();
        assert!(monthly.starts_with("Month,Net_Revenue_USD"));
        assert!(monthly.contains("Feb 2025,100.00"));

        let categories =
            std::fs::read_to_string(dir.join(constants::CATEGORY_REVENUE_FILENAME)).unwrap();
        assert!(categories.contains("Paid Stripe,77.00"));

        let recent =
            std::fs::read_to_string(dir.join(constants::RECENT_SUBSCRIPTIONS_FILENAME)).unwrap();
        assert_eq!(recent.lines().count(), 4);

        let goals = std::fs::read_to_string(dir.join(constants::GOALS_FILENAME)).unwrap();
        assert!(goals.contains("Operational,3420.00,377.00"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
