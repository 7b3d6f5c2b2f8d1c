//! Event alerts
//!
//! Scans the local event calendar for dates inside the look-ahead horizon
//! and recommends a prep increase sized to the event's impact tier.

use chrono::{Datelike, Duration};

use crate::error::Result;
use crate::models::EventImpact;

use super::engine::{AnalysisContext, InsightRule};
use super::types::{BusinessInsight, EventAlertData, InsightType, Severity};

pub struct EventAlertRule;

impl EventAlertRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EventAlertRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for EventAlertRule {
    fn id(&self) -> InsightType {
        InsightType::EventAlert
    }

    fn name(&self) -> &'static str {
        "Event Alert"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<BusinessInsight>> {
        let config = ctx.config;
        let today = ctx.as_of.date_naive();
        let horizon = today + Duration::days(config.event_horizon_days as i64);

        let mut insights = vec![];
        for event in ctx.db.events_between(today, horizon)? {
            let (severity, prep_increase) = match event.impact {
                EventImpact::High => (Severity::High, config.event_high_prep_increase),
                EventImpact::Medium => (Severity::Medium, config.event_medium_prep_increase),
            };
            let days_out = (event.date - today).num_days();

            let data = EventAlertData {
                event_name: event.name.clone(),
                date: event.date,
                impact: event.impact,
                prep_increase,
                days_out,
            };

            let insight = BusinessInsight::new(
                InsightType::EventAlert,
                format!("event_alert:{}", event.name),
                severity,
                format!(
                    "{} approaching ({} {})",
                    event.name,
                    event.date.format("%B"),
                    event.date.day()
                ),
                format!(
                    "Increase prep by {:.0}% ahead of {}",
                    prep_increase * 100.0,
                    event.name
                ),
                ctx.as_of,
            )
            .with_data(serde_json::to_value(&data).unwrap_or_default());

            insights.push(insight);
        }

        Ok(insights)
    }
}
