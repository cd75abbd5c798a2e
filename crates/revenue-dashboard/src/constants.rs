//! Centralized constants for the revenue dashboard
//!
//! Engine defaults (tax rate, goal targets) live in `subscription_revenue::constants`.

// =============================================================================
// Files
// =============================================================================

/// Default config file path
pub const CONFIG_FILE: &str = "config.toml";

/// Default output directory for CSV exports
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Revenue by category CSV filename
pub const CATEGORY_REVENUE_FILENAME: &str = "category_revenue.csv";

/// Monthly revenue CSV filename
pub const MONTHLY_REVENUE_FILENAME: &str = "monthly_revenue.csv";

/// Recent subscriptions CSV filename
pub const RECENT_SUBSCRIPTIONS_FILENAME: &str = "recent_subscriptions.csv";

/// Goal progress CSV filename
pub const GOALS_FILENAME: &str = "goals.csv";

// =============================================================================
// Fetching
// =============================================================================

/// Timeout for a single fetch of the subscriptions endpoint
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default delay between refreshes in watch mode
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;
