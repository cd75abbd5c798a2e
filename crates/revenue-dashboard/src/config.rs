//! Configuration for the revenue dashboard

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use subscription_revenue::constants as engine;
use subscription_revenue::{GoalTargets, TaxPolicy};

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub goals: Option<GoalsConfig>,
    #[serde(default)]
    pub tax: Option<TaxConfig>,
    #[serde(default)]
    pub report: Option<ReportConfig>,
}

/// Where the subscriptions document comes from
#[derive(Debug, Default, Deserialize)]
pub struct SourceConfig {
    /// Spreadsheet web app URL serving `{ "subscriptions": [...] }`
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoalsConfig {
    /// Operational cost target, funded first
    pub operational: f64,
    /// Funded only from revenue above the operational target
    pub secondary: f64,
}

#[derive(Debug, Deserialize)]
pub struct TaxConfig {
    /// Fraction of Stripe payments lost to processor tax (0.23 = 23%)
    pub stripe_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    /// Rows in the recent subscriptions table
    pub recent_limit: usize,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Missing goal amounts (goals.operational, goals.secondary)\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (strings vs numbers)\n\n\
             See config.toml.example for the expected format."
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Main configuration struct with validated values
#[derive(Debug)]
pub struct Config {
    /// Subscriptions endpoint (None when reading a local file)
    pub endpoint: Option<String>,
    pub tax: TaxPolicy,
    pub goals: GoalTargets,
    pub recent_limit: usize,
}

impl Config {
    /// Create config from file config and optional endpoint override
    pub fn from_file(file_config: &FileConfig, endpoint: Option<String>) -> Result<Self> {
        let tax = match &file_config.tax {
            Some(tax) => TaxPolicy::new(tax.stripe_rate).context("Invalid [tax] section")?,
            None => TaxPolicy::default(),
        };

        let goals = match &file_config.goals {
            Some(goals) => GoalTargets::new(goals.operational, goals.secondary)
                .context("Invalid [goals] section")?,
            None => GoalTargets::default(),
        };

        let recent_limit = file_config
            .report
            .as_ref()
            .map_or(engine::DEFAULT_RECENT_LIMIT, |r| r.recent_limit);
        if recent_limit == 0 {
            anyhow::bail!("report.recent_limit must be at least 1");
        }

        Ok(Self {
            // Command-line override wins over config.toml
            endpoint: endpoint.or_else(|| file_config.source.endpoint.clone()),
            tax,
            goals,
            recent_limit,
        })
    }
}
