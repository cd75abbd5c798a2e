//! Revenue aggregation and goal allocation for subscription billing records
//!
//! A [`Snapshot`] of [`SubscriptionRecord`]s is decoded once per refresh and
//! every derived view (net revenue, monthly distribution, goal waterfall,
//! recent transactions) is recomputed from it on demand.

pub mod constants;
pub mod error;
pub mod goals;
pub mod monthly;
pub mod recent;
pub mod records;
pub mod revenue;
pub mod store;
pub mod totals;

pub use error::{Result, RevenueError};
pub use goals::{GoalProgress, GoalTargets, Waterfall};
pub use monthly::{MonthlySeries, YearMonth};
pub use recent::{DisplayStatus, RecentRow};
pub use records::{ActiveFlag, Category, Snapshot, SubscriptionRecord};
pub use revenue::{CategoryRevenue, DashboardMetrics, TaxPolicy, net_revenue};
pub use store::{RefreshOutcome, RefreshTicket, SnapshotStore};
pub use totals::OrderedTotals;
