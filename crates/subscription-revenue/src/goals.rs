//! Two-tier waterfall goal funding
//!
//! Revenue funds the operational goal first. Only revenue above the
//! operational target flows to the secondary goal. Anything beyond both
//! targets is reported as `overflow` and belongs to no goal.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Result, RevenueError};

/// Funding targets for the two goals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalTargets {
    pub operational: f64,
    pub secondary: f64,
}

impl Default for GoalTargets {
    fn default() -> Self {
        Self {
            operational: constants::DEFAULT_OPERATIONAL_GOAL,
            secondary: constants::DEFAULT_SECONDARY_GOAL,
        }
    }
}

impl GoalTargets {
    pub fn new(operational: f64, secondary: f64) -> Result<Self> {
        for (name, target) in [("operational", operational), ("secondary", secondary)] {
            if !target.is_finite() || target <= 0.0 {
                return Err(RevenueError::InvalidConfig(format!(
                    "{name} goal must be a positive amount, got {target}"
                )));
            }
        }
        Ok(Self {
            operational,
            secondary,
        })
    }
}

/// Funding state of a single goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub current_amount: f64,
    /// 0 to 100, capped even when the goal is overfunded
    pub progress_percent: f64,
    pub remaining_amount: f64,
}

impl GoalProgress {
    fn funded(amount: f64, target: f64) -> Self {
        let ratio = if target > 0.0 { amount / target } else { 1.0 };
        Self {
            current_amount: amount,
            progress_percent: ratio.min(1.0) * 100.0,
            remaining_amount: (target - amount).max(0.0),
        }
    }

    pub fn is_met(&self) -> bool {
        self.remaining_amount == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waterfall {
    pub operational: GoalProgress,
    pub secondary: GoalProgress,
    /// Revenue beyond both targets
    pub overflow: f64,
}

/// Allocate `revenue` across the goals in priority order
pub fn allocate(revenue: f64, targets: &GoalTargets) -> Waterfall {
    let operational = GoalProgress::funded(revenue.min(targets.operational), targets.operational);

    let excess = if revenue > targets.operational {
        revenue - targets.operational
    } else {
        0.0
    };
    let secondary = GoalProgress::funded(excess, targets.secondary);

    Waterfall {
        operational,
        secondary,
        overflow: (excess - targets.secondary).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.005
    }

    #[test]
    fn test_operational_met_excess_funds_secondary() {
        let w = allocate(4000.0, &GoalTargets::default());

        assert_eq!(w.operational.current_amount, 3420.0);
        assert_eq!(w.operational.progress_percent, 100.0);
        assert_eq!(w.operational.remaining_amount, 0.0);
        assert!(w.operational.is_met());

        assert!(close(w.secondary.current_amount, 580.0));
        assert!(close(w.secondary.progress_percent, 38.67));
        assert!(close(w.secondary.remaining_amount, 920.0));
        assert_eq!(w.overflow, 0.0);
    }

    #[test]
    fn test_operational_underfunded_secondary_gets_nothing() {
        let w = allocate(3000.0, &GoalTargets::default());

        assert_eq!(w.operational.current_amount, 3000.0);
        assert!(close(w.operational.progress_percent, 87.72));
        assert_eq!(w.operational.remaining_amount, 420.0);

        assert_eq!(w.secondary.current_amount, 0.0);
        assert_eq!(w.secondary.progress_percent, 0.0);
        assert_eq!(w.secondary.remaining_amount, 1500.0);
    }

    #[test]
    fn test_exactly_operational_target() {
        let w = allocate(3420.0, &GoalTargets::default());
        assert!(w.operational.is_met());
        assert_eq!(w.secondary.current_amount, 0.0);
        assert_eq!(w.secondary.remaining_amount, 1500.0);
    }

    #[test]
    fn test_beyond_both_targets_caps_percent_and_reports_overflow() {
        let w = allocate(6000.0, &GoalTargets::default());

        assert_eq!(w.secondary.progress_percent, 100.0);
        assert_eq!(w.secondary.remaining_amount, 0.0);
        // Secondary current isn't capped at its target
        assert_eq!(w.secondary.current_amount, 2580.0);
        assert_eq!(w.overflow, 1080.0);
    }

    #[test]
    fn test_zero_revenue() {
        let w = allocate(0.0, &GoalTargets::default());
        assert_eq!(w.operational.progress_percent, 0.0);
        assert_eq!(w.operational.remaining_amount, 3420.0);
        assert_eq!(w.secondary.progress_percent, 0.0);
    }

    #[test]
    fn test_targets_must_be_positive() {
        assert!(GoalTargets::new(0.0, 100.0).is_err());
        assert!(GoalTargets::new(100.0, -1.0).is_err());
        assert!(GoalTargets::new(f64::NAN, 1.0).is_err());

        let targets = GoalTargets::new(1000.0, 500.0).unwrap();
        let w = allocate(1250.0, &targets);
        assert_eq!(w.secondary.progress_percent, 50.0);
    }
}
