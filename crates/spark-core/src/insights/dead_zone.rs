//! Dead-zone detection
//!
//! Partitions the trading day into hourly buckets and flags buckets whose
//! mean transaction count over a trailing window falls below a configured
//! fraction of the day's peak bucket.

use chrono::{Duration, Timelike};

use crate::db::LedgerFilter;
use crate::error::Result;

use super::engine::{AnalysisContext, InsightRule};
use super::types::{BusinessInsight, DeadZoneData, InsightType, Severity};

pub struct DeadZoneRule;

impl DeadZoneRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeadZoneRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Format an hour-of-day as a 12-hour label (14 -> "2 PM")
fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}

impl InsightRule for DeadZoneRule {
    fn id(&self) -> InsightType {
        InsightType::DeadZone
    }

    fn name(&self) -> &'static str {
        "Dead Zone"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<BusinessInsight>> {
        let config = ctx.config;
        let window_days = config.dead_zone_window_days;

        // Full days strictly before as_of, so every bucket is observed the
        // same number of times.
        let end = ctx
            .as_of
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(ctx.as_of);
        let start = end - Duration::days(window_days as i64);

        let filter = LedgerFilter::new().from(start).until(end);
        let transactions = ctx.db.query(&filter)?;
        if transactions.len() < 2 {
            return Ok(vec![]);
        }

        let open = config.open_hour;
        let close = config.close_hour;
        let mut counts = vec![0u64; (close - open) as usize];
        for tx in &transactions {
            let hour = tx.timestamp.hour();
            if hour >= open && hour < close {
                counts[(hour - open) as usize] += 1;
            }
        }

        let means: Vec<f64> = counts
            .iter()
            .map(|&c| c as f64 / window_days as f64)
            .collect();
        let peak = means.iter().cloned().fold(0.0f64, f64::max);
        if peak <= 0.0 {
            return Ok(vec![]);
        }

        let mut insights = vec![];
        for (offset, &mean) in means.iter().enumerate() {
            let share = mean / peak;
            if share >= config.dead_zone_fraction {
                continue;
            }

            let hour = open + offset as u32;
            // Shortfall relative to the threshold itself
            let deficit = 1.0 - share / config.dead_zone_fraction;
            let severity = if deficit >= config.dead_zone_high_deficit {
                Severity::High
            } else {
                Severity::Medium
            };

            let data = DeadZoneData {
                hour,
                mean_count: mean,
                peak_count: peak,
                share_of_peak: share,
                window_days,
            };

            let insight = BusinessInsight::new(
                InsightType::DeadZone,
                format!("dead_zone:{:02}", hour),
                severity,
                format!(
                    "Traffic drop detected: {} - {} averages {:.1} sales vs {:.1} at peak",
                    hour_label(hour),
                    hour_label(hour + 1),
                    mean,
                    peak
                ),
                format!(
                    "Shift labor to prep-only during the {} window or run a flash promotion",
                    hour_label(hour)
                ),
                ctx.as_of,
            )
            .with_data(serde_json::to_value(&data).unwrap_or_default());

            insights.push(insight);
        }

        Ok(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::test_utils::{sale, seed_database};
    use chrono::{DateTime, Utc};

    /// Seed `days` full trading days before `as_of` with a fixed pattern:
    /// busy at noon (5 sales), quiet at 3 PM (1 sale every other day).
    fn seed_pattern(db: &crate::db::Database, as_of: DateTime<Utc>, days: i64) {
        let mut n = 0;
        for d in 1..=days {
            let date = (as_of - Duration::days(d)).date_naive();
            for k in 0..5 {
                n += 1;
                let ts = format!("{}T12:{:02}:00Z", date, k * 10);
                db.record(&sale(&format!("dz{}", n), "t1", &ts, 4.25, 1, None))
                    .unwrap();
            }
            if d % 2 == 0 {
                n += 1;
                let ts = format!("{}T15:00:00Z", date);
                db.record(&sale(&format!("dz{}", n), "t1", &ts, 4.25, 1, None))
                    .unwrap();
            }
        }
    }

    #[test]
    fn test_flags_quiet_bucket() {
        let db = seed_database();
        let as_of: DateTime<Utc> = "2025-04-15T09:00:00Z".parse().unwrap();
        seed_pattern(&db, as_of, 14);

        let config = EngineConfig::default();
        let ctx = AnalysisContext {
            db: &db,
            config: &config,
            as_of,
        };
        let insights = DeadZoneRule::new().analyze(&ctx).unwrap();

        // 3 PM runs at 10% of the noon peak -> flagged, deep below the
        // 40% threshold -> high severity
        let three_pm = insights
            .iter()
            .find(|i| i.key == "dead_zone:15")
            .expect("3 PM bucket flagged");
        assert_eq!(three_pm.severity, Severity::High);

        // Noon is the peak and never flagged
        assert!(insights.iter().all(|i| i.key != "dead_zone:12"));
    }

    #[test]
    fn test_widening_window_keeps_flags() {
        let db = seed_database();
        let as_of: DateTime<Utc> = "2025-04-15T09:00:00Z".parse().unwrap();
        // Same daily pattern over the entire wider window
        seed_pattern(&db, as_of, 28);

        let mut narrow = EngineConfig::default();
        narrow.dead_zone_window_days = 14;
        let mut wide = EngineConfig::default();
        wide.dead_zone_window_days = 28;

        let flagged = |config: &EngineConfig| -> Vec<String> {
            let ctx = AnalysisContext {
                db: &db,
                config,
                as_of,
            };
            DeadZoneRule::new()
                .analyze(&ctx)
                .unwrap()
                .into_iter()
                .map(|i| i.key)
                .collect()
        };

        let narrow_keys = flagged(&narrow);
        let wide_keys = flagged(&wide);
        assert!(!narrow_keys.is_empty());
        for key in &narrow_keys {
            assert!(wide_keys.contains(key), "{} lost when widening window", key);
        }
    }

    #[test]
    fn test_sparse_data_skips() {
        let db = seed_database();
        let as_of: DateTime<Utc> = "2025-04-15T09:00:00Z".parse().unwrap();
        db.record(&sale("s1", "t1", "2025-04-14T12:00:00Z", 4.25, 1, None))
            .unwrap();

        let config = EngineConfig::default();
        let ctx = AnalysisContext {
            db: &db,
            config: &config,
            as_of,
        };
        assert!(DeadZoneRule::new().analyze(&ctx).unwrap().is_empty());
    }
}
