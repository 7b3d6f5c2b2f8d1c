//! QuickSpark Core Library
//!
//! Shared functionality for the QuickSpark food-truck insight engine:
//! - Append-only sales ledger over SQLite
//! - Catalog and local-event calendar reference data
//! - Rule-based insight engine (dead zones, yield alerts, margin boosts,
//!   scarcity omens, event alerts)
//! - Behavioral cohort classifier with visit streaks
//! - Scarcity-post recommender with a pluggable generative-text backend
//! - POS CSV feed import with stable-id deduplication

pub mod ai;
pub mod cohorts;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;
pub mod seed;
pub mod social;

/// Seed fixtures (menu, events, customers) for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{GenerativeBackend, GenerativeClient, MockBackend, OllamaBackend};
pub use cohorts::CohortClassifier;
pub use config::EngineConfig;
pub use db::{Database, LedgerFilter};
pub use error::{Error, Result};
pub use import::{import_feed, parse_feed_csv, ImportStats};
pub use insights::{
    AnalysisContext, BusinessInsight, InsightEngine, InsightRule, InsightType, Severity,
};
pub use models::{
    Cohort, Customer, CustomerPersona, EventImpact, InventoryItem, LocalEvent, NewTransaction,
    Transaction,
};
pub use seed::SeedFile;
pub use social::{compose_scarcity_post, SocialPostRecommender};
