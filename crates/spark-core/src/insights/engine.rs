//! Insight engine - orchestrates rule evaluation over a ledger snapshot

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::db::Database;
use crate::Result;

use super::types::{BusinessInsight, InsightType};
use super::{
    DeadZoneRule, EventAlertRule, MarginBoostRule, SocialOmenRule, YieldAlertRule,
};

/// Context provided to insight rules for one analysis cycle
pub struct AnalysisContext<'a> {
    /// Ledger, catalog, and calendar snapshot
    pub db: &'a Database,
    /// Validated engine thresholds
    pub config: &'a EngineConfig,
    /// The instant the cycle analyzes up to
    pub as_of: DateTime<Utc>,
}

/// Trait for insight rules
///
/// Rules are synchronous: a cycle runs to completion with no suspension
/// point. A rule that lacks enough history for its window returns an empty
/// vec rather than erroring.
pub trait InsightRule: Send + Sync {
    /// Unique identifier for this rule's insight type
    fn id(&self) -> InsightType;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Analyze the snapshot and produce insights
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<BusinessInsight>>;
}

/// The main insight engine
pub struct InsightEngine {
    config: EngineConfig,
    rules: Vec<Box<dyn InsightRule>>,
}

impl std::fmt::Debug for InsightEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightEngine")
            .field("config", &self.config)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules
    ///
    /// The config is validated here; an invalid threshold set is fatal
    /// before the engine accepts any input.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut engine = Self {
            config,
            rules: vec![],
        };

        engine.register(Box::new(DeadZoneRule::new()));
        engine.register(Box::new(YieldAlertRule::new()));
        engine.register(Box::new(MarginBoostRule::new()));
        engine.register(Box::new(SocialOmenRule::new()));
        engine.register(Box::new(EventAlertRule::new()));

        Ok(engine)
    }

    /// Register an insight rule
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// The engine's validated configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one analysis cycle over the snapshot as of `as_of`
    ///
    /// The result is deduplicated by key and ordered by severity
    /// descending, then type name, then key, so identical inputs yield an
    /// identical sequence. A ledger with zero transactions produces no
    /// insights at all.
    pub fn compute(
        &self,
        db: &Database,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<BusinessInsight>> {
        if db.count_transactions()? == 0 {
            tracing::debug!("Empty ledger; skipping analysis cycle");
            return Ok(vec![]);
        }

        let ctx = AnalysisContext {
            db,
            config: &self.config,
            as_of,
        };

        let mut all = vec![];
        for rule in &self.rules {
            match rule.analyze(&ctx) {
                Ok(insights) => {
                    tracing::debug!(
                        rule = rule.id().as_str(),
                        count = insights.len(),
                        "Rule evaluation complete"
                    );
                    all.extend(insights);
                }
                Err(e) => {
                    tracing::warn!(
                        rule = rule.id().as_str(),
                        error = %e,
                        "Rule evaluation failed"
                    );
                }
            }
        }

        // Dedup by key, first producer wins
        let mut seen = std::collections::HashSet::new();
        all.retain(|insight| seen.insert(insight.key.clone()));

        all.sort_by(|a, b| {
            b.severity
                .priority()
                .cmp(&a.severity.priority())
                .then_with(|| a.insight_type.as_str().cmp(b.insight_type.as_str()))
                .then_with(|| a.key.cmp(&b.key))
        });

        Ok(all)
    }

    /// Get the registered insight types
    pub fn insight_types(&self) -> Vec<InsightType> {
        self.rules.iter().map(|r| r.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::Error;
    use crate::test_utils::{sale, seed_database};

    #[test]
    fn test_engine_registers_all_rules() {
        let engine = InsightEngine::new(EngineConfig::default()).unwrap();
        let types = engine.insight_types();

        assert!(types.contains(&InsightType::DeadZone));
        assert!(types.contains(&InsightType::YieldAlert));
        assert!(types.contains(&InsightType::MarginBoost));
        assert!(types.contains(&InsightType::SocialOmen));
        assert!(types.contains(&InsightType::EventAlert));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = EngineConfig::default();
        config.dead_zone_fraction = 2.0;
        assert!(matches!(
            InsightEngine::new(config).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_empty_ledger_yields_no_insights() {
        let db = seed_database();
        let engine = InsightEngine::new(EngineConfig::default()).unwrap();

        let insights = engine
            .compute(&db, "2025-04-15T18:00:00Z".parse().unwrap())
            .unwrap();
        assert!(insights.is_empty());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let db = seed_database();
        db.record(&sale("s1", "t1", "2025-04-14T12:05:00Z", 4.25, 1, None))
            .unwrap();
        db.record(&sale("s2", "t1", "2025-04-14T12:35:00Z", 8.50, 2, None))
            .unwrap();
        db.record(&sale("s3", "t2", "2025-04-14T18:10:00Z", 5.99, 1, None))
            .unwrap();

        let engine = InsightEngine::new(EngineConfig::default()).unwrap();
        let as_of = "2025-04-15T18:00:00Z".parse().unwrap();

        let first = engine.compute(&db, as_of).unwrap();
        let second = engine.compute(&db, as_of).unwrap();
        assert_eq!(first, second);

        // Ordering invariant: severity never increases down the sequence
        for pair in first.windows(2) {
            assert!(pair[0].severity.priority() >= pair[1].severity.priority());
        }

        // Keys are unique
        let keys: std::collections::HashSet<_> = first.iter().map(|i| &i.key).collect();
        assert_eq!(keys.len(), first.len());
    }
}
