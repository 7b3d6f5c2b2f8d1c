//! Yield alerts
//!
//! Compares each item's sales velocity on the as-of day against the mean
//! of the two prior same-weekday days and flags drops past the configured
//! threshold.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::db::Database;
use crate::error::Result;

use super::engine::{AnalysisContext, InsightRule};
use super::types::{BusinessInsight, InsightType, Severity, YieldAlertData};

pub struct YieldAlertRule;

impl YieldAlertRule {
    pub fn new() -> Self {
        Self
    }

    /// Units of an item sold on one calendar day
    fn units_on(db: &Database, item_id: &str, date: NaiveDate) -> Result<i64> {
        let Some(start) = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()) else {
            return Ok(0);
        };
        db.item_units_between(item_id, start, start + Duration::days(1))
    }
}

impl Default for YieldAlertRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for YieldAlertRule {
    fn id(&self) -> InsightType {
        InsightType::YieldAlert
    }

    fn name(&self) -> &'static str {
        "Yield Alert"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<BusinessInsight>> {
        let config = ctx.config;
        let hours = config.trading_hours();
        let today = ctx.as_of.date_naive();

        let mut insights = vec![];
        for item in ctx.db.list_items()? {
            let current_units = Self::units_on(ctx.db, &item.id, today)?;
            let baseline_1 = Self::units_on(ctx.db, &item.id, today - Duration::days(7))?;
            let baseline_2 = Self::units_on(ctx.db, &item.id, today - Duration::days(14))?;

            // Two comparable days of history or the rule stays quiet
            if baseline_1 == 0 || baseline_2 == 0 {
                continue;
            }

            let current_velocity = current_units as f64 / hours;
            let baseline_velocity = (baseline_1 + baseline_2) as f64 / 2.0 / hours;
            let drop = (baseline_velocity - current_velocity) / baseline_velocity;
            if drop <= config.yield_drop_threshold {
                continue;
            }

            let severity = if drop >= config.yield_high_drop {
                Severity::High
            } else {
                Severity::Medium
            };

            // The rule's own window: the as-of day back through the older
            // baseline day.
            let window_start = (today - Duration::days(14))
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .unwrap_or(ctx.as_of);
            let window_end = window_start + Duration::days(15);
            let window_units =
                ctx.db
                    .item_units_between(&item.id, window_start, window_end.min(end_of(ctx.as_of)))?;

            let data = YieldAlertData {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                current_velocity,
                baseline_velocity,
                drop,
                window_units,
            };

            let insight = BusinessInsight::new(
                InsightType::YieldAlert,
                format!("yield_alert:{}", item.id),
                severity,
                format!(
                    "{} velocity down {:.0}% vs. {} baseline ({} sold in trailing window)",
                    item.name,
                    drop * 100.0,
                    today.format("%A"),
                    window_units
                ),
                format!(
                    "Queue a 'Flash {}' social post to trigger an evening surge",
                    item.name
                ),
                ctx.as_of,
            )
            .with_data(serde_json::to_value(&data).unwrap_or_default());

            insights.push(insight);
        }

        Ok(insights)
    }
}

/// Clamp helper: the end of the as-of instant's window
fn end_of(as_of: DateTime<Utc>) -> DateTime<Utc> {
    as_of + Duration::seconds(1)
}
