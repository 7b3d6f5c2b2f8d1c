//! Scarcity detection for social posts
//!
//! Flags items whose remaining stock covers fewer trading hours than the
//! configured runway at their expected burn rate. These insights feed the
//! social post recommender.

use chrono::DateTime;

use crate::error::Result;

use super::engine::{AnalysisContext, InsightRule};
use super::types::{BusinessInsight, InsightType, Severity, SocialOmenData};

pub struct SocialOmenRule;

impl SocialOmenRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SocialOmenRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for SocialOmenRule {
    fn id(&self) -> InsightType {
        InsightType::SocialOmen
    }

    fn name(&self) -> &'static str {
        "Social Omen"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<BusinessInsight>> {
        let threshold = ctx.config.scarcity_hours;

        let mut insights = vec![];
        for item in ctx.db.list_items()? {
            if item.burn_rate <= 0.0 {
                continue;
            }
            // Items that have never sold don't get a scarcity post
            let sold = ctx
                .db
                .item_units_between(&item.id, DateTime::UNIX_EPOCH, ctx.as_of)?;
            if sold == 0 {
                continue;
            }

            let hours_remaining = item.current_stock as f64 / item.burn_rate;
            if hours_remaining >= threshold {
                continue;
            }

            let severity = if hours_remaining < threshold / 2.0 {
                Severity::High
            } else {
                Severity::Medium
            };

            let data = SocialOmenData {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                current_stock: item.current_stock,
                burn_rate: item.burn_rate,
                hours_remaining,
            };

            let insight = BusinessInsight::new(
                InsightType::SocialOmen,
                format!("social_omen:{}", item.id),
                severity,
                format!(
                    "{} is nearly gone: {} portions left (~{:.1}h of cover at {:.0}/hr)",
                    item.name, item.current_stock, hours_remaining, item.burn_rate
                ),
                format!(
                    "Queue a scarcity post: 'Last {} portions of {} until restock!'",
                    item.current_stock, item.name
                ),
                ctx.as_of,
            )
            .with_data(serde_json::to_value(&data).unwrap_or_default());

            insights.push(insight);
        }

        Ok(insights)
    }
}
