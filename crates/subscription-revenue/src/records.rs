//! Subscription records and the snapshot they are delivered in
//!
//! The endpoint serves `{ "subscriptions": [...] }` straight from a
//! spreadsheet, so decoding is lenient about shapes a sheet produces
//! (numeric strings, blank cells, timestamps instead of dates) and strict
//! about everything else. One malformed record rejects the whole document.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::constants;
use crate::error::{Result, RevenueError};

/// Payment category of a subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    PaidStripe,
    PaidNowpayments,
    Giveaway,
    /// Any category the sheet introduces later
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::PaidStripe => constants::CATEGORY_PAID_STRIPE,
            Category::PaidNowpayments => constants::CATEGORY_PAID_NOWPAYMENTS,
            Category::Giveaway => constants::CATEGORY_GIVEAWAY,
            Category::Other(name) => name,
        }
    }

    /// Whether payments in this category are reduced by the processor tax
    pub fn is_taxed(&self) -> bool {
        matches!(self, Category::PaidStripe)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s {
            constants::CATEGORY_PAID_STRIPE => Category::PaidStripe,
            constants::CATEGORY_PAID_NOWPAYMENTS => Category::PaidNowpayments,
            constants::CATEGORY_GIVEAWAY => Category::Giveaway,
            other => Category::Other(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match Category::from(s.as_str()) {
            Category::Other(_) => Category::Other(s),
            known => known,
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sheet's `active` column: "Yes", "No", or whatever else was typed in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActiveFlag {
    Yes,
    No,
    /// Counted as neither active nor inactive
    Other(String),
}

impl ActiveFlag {
    pub fn as_str(&self) -> &str {
        match self {
            ActiveFlag::Yes => constants::ACTIVE_YES,
            ActiveFlag::No => constants::ACTIVE_NO,
            ActiveFlag::Other(value) => value,
        }
    }
}

impl From<&str> for ActiveFlag {
    fn from(s: &str) -> Self {
        match s {
            constants::ACTIVE_YES => ActiveFlag::Yes,
            constants::ACTIVE_NO => ActiveFlag::No,
            other => ActiveFlag::Other(other.to_string()),
        }
    }
}

impl From<String> for ActiveFlag {
    fn from(s: String) -> Self {
        match ActiveFlag::from(s.as_str()) {
            ActiveFlag::Other(_) => ActiveFlag::Other(s),
            known => known,
        }
    }
}

impl From<ActiveFlag> for String {
    fn from(flag: ActiveFlag) -> Self {
        match flag {
            ActiveFlag::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ActiveFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One billing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub email: String,
    pub category: Category,
    /// Gross amount charged, before any processor tax
    #[serde(deserialize_with = "deserialize_amount")]
    pub paid: f64,
    pub active: ActiveFlag,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub transaction_date: NaiveDate,
    /// Moment the subscription lapses, in UTC. A plain date means midnight.
    #[serde(deserialize_with = "deserialize_instant")]
    pub expiration_date: NaiveDateTime,
    /// Number of calendar months `paid` is spread over (always >= 1)
    #[serde(
        default = "default_active_months",
        deserialize_with = "deserialize_active_months"
    )]
    pub active_months: u32,
}

impl SubscriptionRecord {
    pub fn is_active(&self) -> bool {
        self.active == ActiveFlag::Yes
    }

    pub fn is_inactive(&self) -> bool {
        self.active == ActiveFlag::No
    }

    /// Active in the sheet but past its expiration at `now` (UTC)
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        self.is_active() && self.expiration_date < now
    }
}

/// The complete set of records from one successful fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    subscriptions: Vec<SubscriptionRecord>,
}

impl Snapshot {
    pub fn new(subscriptions: Vec<SubscriptionRecord>) -> Self {
        Self { subscriptions }
    }

    /// Decode a `{ "subscriptions": [...] }` document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn records(&self) -> &[SubscriptionRecord] {
        &self.subscriptions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubscriptionRecord> {
        self.subscriptions.iter()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a SubscriptionRecord;
    type IntoIter = std::slice::Iter<'a, SubscriptionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parse a sheet date: plain `YYYY-MM-DD`, or an RFC 3339 timestamp whose
/// calendar date in its own offset is taken.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    Err(RevenueError::InvalidDate(raw.to_string()))
}

/// Parse a sheet moment as UTC: an RFC 3339 timestamp keeps its time of day,
/// a plain `YYYY-MM-DD` is midnight.
pub fn parse_instant(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.naive_utc());
    }
    parse_calendar_date(trimmed).map(|date| date.and_time(NaiveTime::MIN))
}

fn default_active_months() -> u32 {
    constants::DEFAULT_ACTIVE_MONTHS
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(de::Error::custom)
}

fn deserialize_instant<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw).map_err(de::Error::custom)
}

/// Sheet cells arrive as numbers, numeric strings, blanks or booleans
#[derive(Deserialize)]
#[serde(untagged)]
enum SheetValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Option::<SheetValue>::deserialize(deserializer)? {
        None => 0.0,
        Some(SheetValue::Number(n)) => n,
        Some(SheetValue::Text(s)) if s.trim().is_empty() => 0.0,
        Some(SheetValue::Text(s)) => s
            .trim()
            .trim_start_matches('$')
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid amount: {s:?}")))?,
        Some(SheetValue::Flag(b)) => {
            return Err(de::Error::custom(format!("invalid amount: {b}")));
        }
    };

    if !amount.is_finite() || amount < 0.0 {
        return Err(de::Error::custom(format!(
            "amount must be a non-negative number, got {amount}"
        )));
    }
    Ok(amount)
}

fn deserialize_active_months<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let months = match Option::<SheetValue>::deserialize(deserializer)? {
        None | Some(SheetValue::Flag(_)) => return Ok(default_active_months()),
        Some(SheetValue::Number(n)) => n,
        Some(SheetValue::Text(s)) if s.trim().is_empty() => return Ok(default_active_months()),
        Some(SheetValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid activeMonths: {s:?}")))?,
    };

    // Falsy and non-positive counts fall back to a single month; fractional
    // counts are truncated.
    if !months.is_finite() || months < 1.0 {
        return Ok(default_active_months());
    }
    Ok(months.trunc().min(u32::MAX as f64) as u32)
}
