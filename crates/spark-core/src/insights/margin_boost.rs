//! Margin-boost suggestions
//!
//! Ranks items by contribution margin `(price - cost) * units_sold` over a
//! trailing window and highlights the champion.

use chrono::Duration;
use std::collections::HashMap;

use crate::db::LedgerFilter;
use crate::error::Result;

use super::engine::{AnalysisContext, InsightRule};
use super::types::{BusinessInsight, InsightType, MarginBoostData, Severity};

pub struct MarginBoostRule;

impl MarginBoostRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarginBoostRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for MarginBoostRule {
    fn id(&self) -> InsightType {
        InsightType::MarginBoost
    }

    fn name(&self) -> &'static str {
        "Margin Boost"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<BusinessInsight>> {
        let from = ctx.as_of - Duration::days(ctx.config.margin_window_days as i64);

        let window = ctx
            .db
            .query(&LedgerFilter::new().from(from).until(ctx.as_of))?;
        if window.len() < 2 {
            return Ok(vec![]);
        }

        let catalog: HashMap<String, _> = ctx
            .db
            .list_items()?
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();

        let mut units_by_item: HashMap<&str, i64> = HashMap::new();
        for tx in &window {
            *units_by_item.entry(tx.item_id.as_str()).or_default() += tx.quantity;
        }

        let mut ranked: Vec<(&str, i64, f64)> = units_by_item
            .into_iter()
            .filter_map(|(item_id, units)| {
                let item = catalog.get(item_id)?;
                Some((item_id, units, (item.price - item.cost) * units as f64))
            })
            .collect();
        // Highest margin first; item id breaks ties so the champion is stable
        ranked.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let Some(&(item_id, units, margin)) = ranked.first() else {
            return Ok(vec![]);
        };
        let Some(item) = catalog.get(item_id) else {
            return Ok(vec![]);
        };

        let data = MarginBoostData {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            margin_per_unit: item.price - item.cost,
            window_units: units,
            window_margin: margin,
        };

        let insight = BusinessInsight::new(
            InsightType::MarginBoost,
            format!("margin_boost:{}", item.id),
            Severity::Low,
            format!(
                "{} is your margin champion: ${:.2} over the last {} days",
                item.name, margin, ctx.config.margin_window_days
            ),
            format!("Maximize prep efficiency for {} at the evening peak", item.name),
            ctx.as_of,
        )
        .with_data(serde_json::to_value(&data).unwrap_or_default());

        Ok(vec![insight])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::test_utils::{sale, seed_database};

    #[test]
    fn test_picks_top_margin_item() {
        let db = seed_database();
        // Tacos: margin 3.15 * 10 = 31.50
        db.record(&sale("m1", "t1", "2025-04-14T12:00:00Z", 42.50, 10, None))
            .unwrap();
        // Birria: margin 4.19 * 10 = 41.90 -> champion
        db.record(&sale("m2", "t2", "2025-04-14T13:00:00Z", 59.90, 10, None))
            .unwrap();

        let config = EngineConfig::default();
        let ctx = AnalysisContext {
            db: &db,
            config: &config,
            as_of: "2025-04-15T18:00:00Z".parse().unwrap(),
        };
        let insights = MarginBoostRule::new().analyze(&ctx).unwrap();

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Low);
        assert!(insights[0].message.contains("Queso birria"));

        let data: MarginBoostData = serde_json::from_value(insights[0].data.clone()).unwrap();
        assert_eq!(data.item_id, "t2");
        assert!((data.window_margin - 41.90).abs() < 0.001);
    }

    #[test]
    fn test_single_transaction_skips() {
        let db = seed_database();
        db.record(&sale("m1", "t1", "2025-04-14T12:00:00Z", 4.25, 1, None))
            .unwrap();

        let config = EngineConfig::default();
        let ctx = AnalysisContext {
            db: &db,
            config: &config,
            as_of: "2025-04-15T18:00:00Z".parse().unwrap(),
        };
        assert!(MarginBoostRule::new().analyze(&ctx).unwrap().is_empty());
    }
}
