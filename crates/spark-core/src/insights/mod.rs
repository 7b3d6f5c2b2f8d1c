//! Insight engine - operational signals from the sales ledger
//!
//! The engine turns a ledger/catalog/calendar snapshot into an ordered,
//! deduplicated sequence of actionable insights. Rules are pluggable and
//! each one stays silent when its window lacks enough history.
//!
//! ## Built-in rules
//!
//! - **Dead Zone** - recurring low-traffic windows in the trading day
//! - **Yield Alert** - items selling below their recent weekday baseline
//! - **Margin Boost** - the current top contribution-margin item
//! - **Social Omen** - items about to run out, worth a scarcity post
//! - **Event Alert** - upcoming local events that will move demand
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spark_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new(config)?;
//! let insights = engine.compute(&db, as_of)?;
//! ```

pub mod dead_zone;
pub mod engine;
pub mod event_alert;
pub mod margin_boost;
pub mod social_omen;
pub mod types;
pub mod yield_alert;

pub use dead_zone::DeadZoneRule;
pub use engine::{AnalysisContext, InsightEngine, InsightRule};
pub use event_alert::EventAlertRule;
pub use margin_boost::MarginBoostRule;
pub use social_omen::SocialOmenRule;
pub use types::{
    BusinessInsight, DeadZoneData, EventAlertData, InsightType, MarginBoostData, Severity,
    SocialOmenData, YieldAlertData,
};
pub use yield_alert::YieldAlertRule;
