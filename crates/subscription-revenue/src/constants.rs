//! Centralized constants for revenue aggregation
//!
//! Defaults here can be overridden through the dashboard's config.toml.

// =============================================================================
// Categories and Status Flags
// =============================================================================

/// Category for card payments processed through Stripe (taxed)
pub const CATEGORY_PAID_STRIPE: &str = "Paid Stripe";

/// Category for crypto payments processed through NOWPayments
pub const CATEGORY_PAID_NOWPAYMENTS: &str = "Paid Nowpayments";

/// Category for free subscriptions handed out in giveaways
pub const CATEGORY_GIVEAWAY: &str = "Giveaway";

/// `active` value for a live subscription
pub const ACTIVE_YES: &str = "Yes";

/// `active` value for a cancelled subscription
pub const ACTIVE_NO: &str = "No";

// =============================================================================
// Revenue
// =============================================================================

/// Share of a Stripe payment lost to processor fees and tax
pub const STRIPE_TAX_RATE: f64 = 0.23;

/// Months a payment is spread over when the record doesn't say
pub const DEFAULT_ACTIVE_MONTHS: u32 = 1;

// =============================================================================
// Goals
// =============================================================================

/// Monthly operational cost target (funded first)
pub const DEFAULT_OPERATIONAL_GOAL: f64 = 3420.0;

/// Secondary goal target, funded only from revenue above the operational goal
pub const DEFAULT_SECONDARY_GOAL: f64 = 1500.0;

// =============================================================================
// Display
// =============================================================================

/// Number of rows in the recent transactions view
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Short month names used in monthly series labels ("Jan 2025")
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
