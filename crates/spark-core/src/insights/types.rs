//! Core types for the insight engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::EventImpact;

/// Types of insights the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// A recurring low-traffic window in the trading day
    DeadZone,
    /// An item selling below its recent baseline velocity
    YieldAlert,
    /// The current top contribution-margin item
    MarginBoost,
    /// An item about to run out, worth a scarcity post
    SocialOmen,
    /// An upcoming local event that will move demand
    EventAlert,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::DeadZone => "dead_zone",
            InsightType::YieldAlert => "yield_alert",
            InsightType::MarginBoost => "margin_boost",
            InsightType::SocialOmen => "social_omen",
            InsightType::EventAlert => "event_alert",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dead_zone" => Ok(InsightType::DeadZone),
            "yield_alert" => Ok(InsightType::YieldAlert),
            "margin_boost" => Ok(InsightType::MarginBoost),
            "social_omen" => Ok(InsightType::SocialOmen),
            "event_alert" => Ok(InsightType::EventAlert),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// Severity level of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// An actionable signal produced by one analysis cycle
///
/// Insights are regenerated per cycle and never mutated. `detected_at`
/// carries the cycle's as-of instant, so identical inputs produce
/// identical records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessInsight {
    pub insight_type: InsightType,
    /// Unique key for deduplication (e.g., "yield_alert:t2")
    pub key: String,
    pub severity: Severity,
    /// What was observed (e.g., "Queso birria velocity down 12% vs. Tuesday baseline")
    pub message: String,
    /// What to do about it
    pub action: String,
    /// Rule-specific structured data
    pub data: serde_json::Value,
    pub detected_at: DateTime<Utc>,
}

impl BusinessInsight {
    pub fn new(
        insight_type: InsightType,
        key: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        action: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            insight_type,
            key: key.into(),
            severity,
            message: message.into(),
            action: action.into(),
            data: serde_json::Value::Null,
            detected_at,
        }
    }

    /// Attach a structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Data for dead-zone insights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadZoneData {
    /// Start of the flagged hourly bucket (24h clock)
    pub hour: u32,
    /// Mean transactions per day in this bucket over the window
    pub mean_count: f64,
    /// Mean transactions per day in the peak bucket
    pub peak_count: f64,
    /// mean_count / peak_count
    pub share_of_peak: f64,
    pub window_days: u32,
}

/// Data for yield alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldAlertData {
    pub item_id: String,
    pub item_name: String,
    /// Units per trading hour on the as-of day
    pub current_velocity: f64,
    /// Mean units per trading hour over the baseline days
    pub baseline_velocity: f64,
    /// Fractional drop vs baseline (0.12 = down 12%)
    pub drop: f64,
    /// Units sold in the trailing analysis window
    pub window_units: i64,
}

/// Data for margin-boost suggestions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginBoostData {
    pub item_id: String,
    pub item_name: String,
    pub margin_per_unit: f64,
    pub window_units: i64,
    pub window_margin: f64,
}

/// Data for scarcity (social omen) insights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialOmenData {
    pub item_id: String,
    pub item_name: String,
    pub current_stock: i64,
    pub burn_rate: f64,
    /// Trading hours until the stock runs dry at the configured burn rate
    pub hours_remaining: f64,
}

/// Data for event alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAlertData {
    pub event_name: String,
    pub date: NaiveDate,
    pub impact: EventImpact,
    /// Recommended prep increase as a fraction (0.45 = +45%)
    pub prep_increase: f64,
    pub days_out: i64,
}
