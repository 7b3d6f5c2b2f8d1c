//! Engine configuration
//!
//! Every detection threshold is tunable. Defaults match the dashboard's
//! shipped behavior; overrides come from a TOML file resolved at startup.
//! Validation runs before the engine accepts any input, and an invalid
//! config is fatal.
//!
//! ```toml
//! [hours]
//! open = 11
//! close = 21
//!
//! [dead_zone]
//! window_days = 14
//! fraction_of_peak = 0.40
//!
//! [yield]
//! drop_threshold = 0.10
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Tunable thresholds for the insight engine, cohort classifier, and
/// social post recommender.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// First trading hour of the day (inclusive)
    pub open_hour: u32,
    /// Last trading hour of the day (exclusive)
    pub close_hour: u32,

    /// Trailing window for dead-zone bucket means, in days
    pub dead_zone_window_days: u32,
    /// A bucket is a dead zone when its mean falls below this fraction of
    /// the peak bucket
    pub dead_zone_fraction: f64,
    /// Shortfall relative to the threshold at which severity becomes high
    pub dead_zone_high_deficit: f64,

    /// Velocity drop vs baseline that triggers a yield alert
    pub yield_drop_threshold: f64,
    /// Velocity drop at which a yield alert becomes high severity
    pub yield_high_drop: f64,

    /// Trailing window for margin ranking, in days
    pub margin_window_days: u32,

    /// Look-ahead horizon for event alerts, in days
    pub event_horizon_days: u32,
    /// Recommended prep increase for high-impact events
    pub event_high_prep_increase: f64,
    /// Recommended prep increase for medium-impact events
    pub event_medium_prep_increase: f64,

    /// Stock runway (hours of burn rate) below which scarcity posts are
    /// recommended
    pub scarcity_hours: f64,

    /// Gap that separates two visits by the same customer, in minutes
    pub visit_gap_minutes: i64,
    /// Visits required before a majority cohort is assigned
    pub min_visits_for_cohort: u32,
    /// Maximum units for a visit to count toward the solo cohort
    pub solo_max_units: i64,
    /// Minimum units for a visit to count toward the family cohort
    pub family_min_units: i64,
    /// Spend above which a visit counts toward the family cohort
    pub family_spend_threshold: f64,
    /// Weekday commute windows for solo classification
    pub commute_windows: Vec<(NaiveTime, NaiveTime)>,
    /// Late-night window; wraps midnight when start > end
    pub late_night_window: (NaiveTime, NaiveTime),

    /// Upper bound on a single generative-text call
    pub generate_timeout: Duration,
    /// Pause before the single retry of a failed generative call
    pub generate_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            open_hour: 11,
            close_hour: 21,
            dead_zone_window_days: 14,
            dead_zone_fraction: 0.40,
            dead_zone_high_deficit: 0.60,
            yield_drop_threshold: 0.10,
            yield_high_drop: 0.25,
            margin_window_days: 14,
            event_horizon_days: 7,
            event_high_prep_increase: 0.45,
            event_medium_prep_increase: 0.20,
            scarcity_hours: 4.0,
            visit_gap_minutes: 45,
            min_visits_for_cohort: 3,
            solo_max_units: 1,
            family_min_units: 3,
            family_spend_threshold: 40.0,
            commute_windows: vec![
                (hm(7, 0), hm(9, 30)),
                (hm(16, 30), hm(18, 30)),
            ],
            late_night_window: (hm(21, 0), hm(2, 0)),
            generate_timeout: Duration::from_secs(10),
            generate_backoff: Duration::from_millis(250),
        }
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    // Only called with literal in-range values
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

impl EngineConfig {
    /// Load configuration from a TOML file, merging over defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML, merging over defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        let config = file.merge_into(Self::default())?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the thresholds are coherent
    ///
    /// Called by `InsightEngine::new` so a bad config fails before any
    /// input is accepted.
    pub fn validate(&self) -> Result<()> {
        if self.close_hour > 24 || self.open_hour >= self.close_hour {
            return Err(Error::Config(format!(
                "trading hours must satisfy open < close <= 24 (got {}..{})",
                self.open_hour, self.close_hour
            )));
        }
        if self.dead_zone_window_days == 0 || self.margin_window_days == 0 {
            return Err(Error::Config("trailing windows must be at least 1 day".into()));
        }
        if self.dead_zone_fraction <= 0.0 || self.dead_zone_fraction >= 1.0 {
            return Err(Error::Config(format!(
                "dead zone fraction must be in (0, 1) (got {})",
                self.dead_zone_fraction
            )));
        }
        if self.dead_zone_high_deficit <= 0.0 || self.dead_zone_high_deficit > 1.0 {
            return Err(Error::Config(format!(
                "dead zone high deficit must be in (0, 1] (got {})",
                self.dead_zone_high_deficit
            )));
        }
        if self.yield_drop_threshold <= 0.0 || self.yield_drop_threshold >= 1.0 {
            return Err(Error::Config(format!(
                "yield drop threshold must be in (0, 1) (got {})",
                self.yield_drop_threshold
            )));
        }
        if self.yield_high_drop < self.yield_drop_threshold || self.yield_high_drop > 1.0 {
            return Err(Error::Config(format!(
                "yield high drop must be in [threshold, 1] (got {})",
                self.yield_high_drop
            )));
        }
        if self.event_horizon_days == 0 {
            return Err(Error::Config("event horizon must be at least 1 day".into()));
        }
        if self.event_high_prep_increase <= 0.0 || self.event_medium_prep_increase <= 0.0 {
            return Err(Error::Config("prep increases must be positive".into()));
        }
        if self.scarcity_hours <= 0.0 {
            return Err(Error::Config("scarcity hours must be positive".into()));
        }
        if self.visit_gap_minutes <= 0 {
            return Err(Error::Config("visit gap must be positive".into()));
        }
        if self.min_visits_for_cohort == 0 {
            return Err(Error::Config("minimum visits must be at least 1".into()));
        }
        if self.family_min_units <= self.solo_max_units {
            return Err(Error::Config(format!(
                "family minimum units must exceed solo maximum ({} <= {})",
                self.family_min_units, self.solo_max_units
            )));
        }
        if self.family_spend_threshold <= 0.0 {
            return Err(Error::Config("family spend threshold must be positive".into()));
        }
        if self.commute_windows.is_empty() {
            return Err(Error::Config("at least one commute window is required".into()));
        }
        for (start, end) in &self.commute_windows {
            if start >= end {
                return Err(Error::Config(format!(
                    "commute window start must precede end ({} >= {})",
                    start, end
                )));
            }
        }
        if self.generate_timeout.is_zero() {
            return Err(Error::Config("generative timeout must be positive".into()));
        }
        Ok(())
    }

    /// Trading hours per day
    pub fn trading_hours(&self) -> f64 {
        (self.close_hour - self.open_hour) as f64
    }
}

// Raw file shape: every section and field optional, merged over defaults.

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    hours: Option<HoursSection>,
    dead_zone: Option<DeadZoneSection>,
    #[serde(rename = "yield")]
    yield_: Option<YieldSection>,
    margin: Option<MarginSection>,
    events: Option<EventsSection>,
    scarcity: Option<ScarcitySection>,
    cohorts: Option<CohortsSection>,
    generate: Option<GenerateSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HoursSection {
    open: Option<u32>,
    close: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeadZoneSection {
    window_days: Option<u32>,
    fraction_of_peak: Option<f64>,
    high_deficit: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct YieldSection {
    drop_threshold: Option<f64>,
    high_drop: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MarginSection {
    window_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EventsSection {
    horizon_days: Option<u32>,
    high_prep_increase: Option<f64>,
    medium_prep_increase: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScarcitySection {
    hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CohortsSection {
    visit_gap_minutes: Option<i64>,
    min_visits: Option<u32>,
    solo_max_units: Option<i64>,
    family_min_units: Option<i64>,
    family_spend_threshold: Option<f64>,
    /// Windows as ["HH:MM", "HH:MM"] pairs
    commute_windows: Option<Vec<[String; 2]>>,
    late_night_window: Option<[String; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GenerateSection {
    timeout_secs: Option<u64>,
    backoff_ms: Option<u64>,
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| Error::Config(format!("invalid time of day {:?}: {}", s, e)))
}

impl ConfigFile {
    fn merge_into(self, mut config: EngineConfig) -> Result<EngineConfig> {
        if let Some(hours) = self.hours {
            if let Some(open) = hours.open {
                config.open_hour = open;
            }
            if let Some(close) = hours.close {
                config.close_hour = close;
            }
        }
        if let Some(dz) = self.dead_zone {
            if let Some(days) = dz.window_days {
                config.dead_zone_window_days = days;
            }
            if let Some(fraction) = dz.fraction_of_peak {
                config.dead_zone_fraction = fraction;
            }
            if let Some(deficit) = dz.high_deficit {
                config.dead_zone_high_deficit = deficit;
            }
        }
        if let Some(y) = self.yield_ {
            if let Some(threshold) = y.drop_threshold {
                config.yield_drop_threshold = threshold;
            }
            if let Some(high) = y.high_drop {
                config.yield_high_drop = high;
            }
        }
        if let Some(m) = self.margin {
            if let Some(days) = m.window_days {
                config.margin_window_days = days;
            }
        }
        if let Some(e) = self.events {
            if let Some(days) = e.horizon_days {
                config.event_horizon_days = days;
            }
            if let Some(high) = e.high_prep_increase {
                config.event_high_prep_increase = high;
            }
            if let Some(medium) = e.medium_prep_increase {
                config.event_medium_prep_increase = medium;
            }
        }
        if let Some(s) = self.scarcity {
            if let Some(hours) = s.hours {
                config.scarcity_hours = hours;
            }
        }
        if let Some(c) = self.cohorts {
            if let Some(gap) = c.visit_gap_minutes {
                config.visit_gap_minutes = gap;
            }
            if let Some(min) = c.min_visits {
                config.min_visits_for_cohort = min;
            }
            if let Some(solo) = c.solo_max_units {
                config.solo_max_units = solo;
            }
            if let Some(family) = c.family_min_units {
                config.family_min_units = family;
            }
            if let Some(spend) = c.family_spend_threshold {
                config.family_spend_threshold = spend;
            }
            if let Some(windows) = c.commute_windows {
                let mut parsed = Vec::with_capacity(windows.len());
                for [start, end] in &windows {
                    parsed.push((parse_time(start)?, parse_time(end)?));
                }
                config.commute_windows = parsed;
            }
            if let Some([start, end]) = c.late_night_window {
                config.late_night_window = (parse_time(&start)?, parse_time(&end)?);
            }
        }
        if let Some(g) = self.generate {
            if let Some(secs) = g.timeout_secs {
                config.generate_timeout = Duration::from_secs(secs);
            }
            if let Some(ms) = g.backoff_ms {
                config.generate_backoff = Duration::from_millis(ms);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_toml_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [dead_zone]
            window_days = 7
            fraction_of_peak = 0.5

            [yield]
            drop_threshold = 0.15
            high_drop = 0.30

            [cohorts]
            commute_windows = [["06:30", "09:00"]]
            "#,
        )
        .unwrap();

        assert_eq!(config.dead_zone_window_days, 7);
        assert!((config.dead_zone_fraction - 0.5).abs() < f64::EPSILON);
        assert!((config.yield_drop_threshold - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.commute_windows.len(), 1);
        // Untouched fields keep their defaults
        assert_eq!(config.event_horizon_days, 7);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[events]\nhorizon_days = 10").unwrap();
        file.flush().unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.event_horizon_days, 10);
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [dead_zone]
            fraction_of_peak = 1.4
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_inverted_hours_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [hours]
            open = 21
            close = 11
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(EngineConfig::from_toml_str("[dead_zone]\nwindw_days = 7\n").is_err());
    }
}
