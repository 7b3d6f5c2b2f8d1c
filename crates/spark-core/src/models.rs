//! Domain models for QuickSpark

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A menu item in the truck's catalog
///
/// Catalog rows are reference data: loaded once at init and read-only
/// afterwards. `burn_rate` is the configured expected consumption rate in
/// units per trading hour, used for prep planning and scarcity detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Sale price per unit
    pub price: f64,
    /// Cost per unit
    pub cost: f64,
    pub category: String,
    /// Standard portion description (e.g., "2oz meat")
    pub standard_portion: String,
    /// Expected consumption in units per trading hour
    pub burn_rate: f64,
    /// Shelf life in days
    pub expiry_days: u32,
    pub current_stock: i64,
}

impl InventoryItem {
    /// Check the catalog invariants: price > cost >= 0, stock >= 0
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("item id must not be empty".into()));
        }
        if self.cost < 0.0 {
            return Err(Error::Validation(format!(
                "item {}: cost must be >= 0 (got {})",
                self.id, self.cost
            )));
        }
        if self.price <= self.cost {
            return Err(Error::Validation(format!(
                "item {}: price must exceed cost ({} <= {})",
                self.id, self.price, self.cost
            )));
        }
        if self.burn_rate < 0.0 {
            return Err(Error::Validation(format!(
                "item {}: burn rate must be >= 0 (got {})",
                self.id, self.burn_rate
            )));
        }
        if self.current_stock < 0 {
            return Err(Error::Validation(format!(
                "item {}: stock must be >= 0 (got {})",
                self.id, self.current_stock
            )));
        }
        Ok(())
    }
}

/// A recorded sale
///
/// Ledger rows are immutable once recorded; the ledger is append-only and
/// ordered by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub item_id: String,
    pub timestamp: DateTime<Utc>,
    /// Total sale amount for the line
    pub amount: f64,
    pub quantity: i64,
    pub customer_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// A sale to be recorded (before ledger insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Stable id from the POS feed; derived from the row fields when absent
    pub id: String,
    pub item_id: String,
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub quantity: i64,
    pub customer_id: Option<String>,
}

/// Behavioral customer segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    SoloCommuter,
    FamilyBulk,
    LateNightMaverick,
}

impl Cohort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoloCommuter => "solo_commuter",
            Self::FamilyBulk => "family_bulk",
            Self::LateNightMaverick => "late_night_maverick",
        }
    }

    /// Human-readable label for messages and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Self::SoloCommuter => "Solo Commuter",
            Self::FamilyBulk => "Family Bulk",
            Self::LateNightMaverick => "Late Night Maverick",
        }
    }
}

impl std::str::FromStr for Cohort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solo_commuter" => Ok(Self::SoloCommuter),
            "family_bulk" => Ok(Self::FamilyBulk),
            "late_night_maverick" => Ok(Self::LateNightMaverick),
            _ => Err(format!("Unknown cohort: {}", s)),
        }
    }
}

impl std::fmt::Display for Cohort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer profile derived from the ledger
///
/// Derived on demand by the cohort classifier; never stored. `streak`
/// counts consecutive weekly periods with at least one visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPersona {
    pub id: String,
    pub name: String,
    pub cohort: Cohort,
    pub visit_count: u32,
    /// Mode of purchased items, by units
    pub favorite_item: Option<String>,
    pub last_visit: DateTime<Utc>,
    pub streak: u32,
}

/// Expected demand impact of a local event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventImpact {
    High,
    Medium,
}

impl EventImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl std::str::FromStr for EventImpact {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            _ => Err(format!("Unknown event impact: {}", s)),
        }
    }
}

impl std::fmt::Display for EventImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A local event from the read-only calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEvent {
    pub name: String,
    pub date: NaiveDate,
    pub impact: EventImpact,
    pub description: String,
}

/// A registered customer (id to display name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
}
