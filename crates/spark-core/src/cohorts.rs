//! Cohort classification
//!
//! Buckets customers into behavioral cohorts from their visit history. A
//! visit is a run of transactions by one customer separated by no more
//! than the configured gap. Classification is a pure function of the
//! history: replaying the same ledger yields the same persona.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use std::collections::{HashMap, HashSet};

use crate::config::EngineConfig;
use crate::db::{Database, LedgerFilter};
use crate::error::{Error, Result};
use crate::models::{Cohort, CustomerPersona, Transaction};

/// How one visit counts toward the cohort tallies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitKind {
    Solo,
    Family,
    LateNight,
    Unclassified,
}

impl VisitKind {
    fn cohort(self) -> Option<Cohort> {
        match self {
            VisitKind::Solo => Some(Cohort::SoloCommuter),
            VisitKind::Family => Some(Cohort::FamilyBulk),
            VisitKind::LateNight => Some(Cohort::LateNightMaverick),
            VisitKind::Unclassified => None,
        }
    }
}

#[derive(Debug)]
struct Visit {
    start: DateTime<Utc>,
    units: i64,
    spend: f64,
}

/// Classifies customers from the ledger snapshot
pub struct CohortClassifier<'a> {
    db: &'a Database,
    config: &'a EngineConfig,
}

impl<'a> CohortClassifier<'a> {
    pub fn new(db: &'a Database, config: &'a EngineConfig) -> Self {
        Self { db, config }
    }

    /// Derive the persona for a customer from transactions before `as_of`
    ///
    /// Fails with `Error::NotFound` when the customer has no recorded
    /// transactions.
    pub fn classify(&self, customer_id: &str, as_of: DateTime<Utc>) -> Result<CustomerPersona> {
        let transactions = self.db.query(
            &LedgerFilter::new()
                .customer(customer_id)
                .until(as_of + Duration::seconds(1)),
        )?;
        if transactions.is_empty() {
            return Err(Error::NotFound(format!(
                "no transactions for customer {}",
                customer_id
            )));
        }

        let visits = self.group_visits(&transactions);
        let kinds: Vec<VisitKind> = visits.iter().map(|v| self.classify_visit(v)).collect();
        let cohort = self.decide_cohort(&kinds);

        let name = self
            .db
            .get_customer_name(customer_id)?
            .unwrap_or_else(|| customer_id.to_string());

        Ok(CustomerPersona {
            id: customer_id.to_string(),
            name,
            cohort,
            visit_count: visits.len() as u32,
            favorite_item: self.favorite_item(&transactions)?,
            last_visit: transactions
                .last()
                .map(|t| t.timestamp)
                .unwrap_or(as_of),
            streak: streak_weeks(&visits),
        })
    }

    /// Group a customer's transactions into visits by the configured gap
    fn group_visits(&self, transactions: &[Transaction]) -> Vec<Visit> {
        let gap = Duration::minutes(self.config.visit_gap_minutes);
        let mut visits: Vec<Visit> = vec![];
        let mut last_ts: Option<DateTime<Utc>> = None;

        for tx in transactions {
            let start_new = match last_ts {
                Some(prev) => tx.timestamp - prev > gap,
                None => true,
            };
            if start_new {
                visits.push(Visit {
                    start: tx.timestamp,
                    units: 0,
                    spend: 0.0,
                });
            }
            if let Some(visit) = visits.last_mut() {
                visit.units += tx.quantity;
                visit.spend += tx.amount;
            }
            last_ts = Some(tx.timestamp);
        }

        visits
    }

    fn classify_visit(&self, visit: &Visit) -> VisitKind {
        let config = self.config;

        // Bulk orders win regardless of when they happen
        if visit.units >= config.family_min_units || visit.spend > config.family_spend_threshold {
            return VisitKind::Family;
        }

        let time = visit.start.time();
        let weekday = !matches!(visit.start.weekday(), Weekday::Sat | Weekday::Sun);
        if visit.units <= config.solo_max_units && weekday && self.in_commute_window(time) {
            return VisitKind::Solo;
        }

        if in_window_wrapping(time, self.config.late_night_window) {
            return VisitKind::LateNight;
        }

        VisitKind::Unclassified
    }

    fn in_commute_window(&self, time: NaiveTime) -> bool {
        self.config
            .commute_windows
            .iter()
            .any(|&(start, end)| time >= start && time < end)
    }

    /// Majority counter after enough visits; otherwise the most recent
    /// classified visit wins, and a history with no classified visit
    /// defaults to solo.
    fn decide_cohort(&self, kinds: &[VisitKind]) -> Cohort {
        let most_recent = kinds
            .iter()
            .rev()
            .find_map(|k| k.cohort())
            .unwrap_or(Cohort::SoloCommuter);

        if (kinds.len() as u32) < self.config.min_visits_for_cohort {
            return most_recent;
        }

        let count = |kind: VisitKind| kinds.iter().filter(|&&k| k == kind).count();
        let tallies = [
            (Cohort::SoloCommuter, count(VisitKind::Solo)),
            (Cohort::FamilyBulk, count(VisitKind::Family)),
            (Cohort::LateNightMaverick, count(VisitKind::LateNight)),
        ];

        let max = tallies.iter().map(|&(_, n)| n).max().unwrap_or(0);
        let leaders: Vec<Cohort> = tallies
            .iter()
            .filter(|&&(_, n)| n == max && n > 0)
            .map(|&(c, _)| c)
            .collect();

        match leaders.as_slice() {
            [winner] => *winner,
            _ => most_recent, // tie, or nothing classified
        }
    }

    /// Mode of purchased units, ties broken by item id
    fn favorite_item(&self, transactions: &[Transaction]) -> Result<Option<String>> {
        let mut units: HashMap<&str, i64> = HashMap::new();
        for tx in transactions {
            *units.entry(tx.item_id.as_str()).or_default() += tx.quantity;
        }

        let mut ranked: Vec<(&str, i64)> = units.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let Some(&(item_id, _)) = ranked.first() else {
            return Ok(None);
        };
        let name = self
            .db
            .get_item(item_id)?
            .map(|item| item.name)
            .unwrap_or_else(|| item_id.to_string());
        Ok(Some(name))
    }
}

/// True when `time` is inside a window that may wrap past midnight
fn in_window_wrapping(time: NaiveTime, (start, end): (NaiveTime, NaiveTime)) -> bool {
    if start <= end {
        time >= start && time < end
    } else {
        time >= start || time < end
    }
}

/// Monday of the ISO week containing `date`
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Consecutive weekly periods with at least one visit, counting back from
/// the last visit's week. Any missed week resets the run.
fn streak_weeks(visits: &[Visit]) -> u32 {
    let weeks: HashSet<NaiveDate> = visits
        .iter()
        .map(|v| week_start(v.start.date_naive()))
        .collect();

    let Some(last) = visits.last() else {
        return 0;
    };

    let mut streak = 0;
    let mut week = week_start(last.start.date_naive());
    while weeks.contains(&week) {
        streak += 1;
        week -= Duration::days(7);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sale, seed_database};

    fn classify(db: &Database, customer: &str) -> CustomerPersona {
        let config = EngineConfig::default();
        CohortClassifier::new(db, &config)
            .classify(customer, "2025-04-30T00:00:00Z".parse().unwrap())
            .unwrap()
    }

    #[test]
    fn test_unknown_customer() {
        let db = seed_database();
        let config = EngineConfig::default();
        let err = CohortClassifier::new(&db, &config)
            .classify("ghost", "2025-04-30T00:00:00Z".parse().unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_solo_commuter() {
        let db = seed_database();
        // Single-item weekday breakfast runs (Mon 04-14, Tue 04-15, Wed 04-16)
        for (i, day) in ["2025-04-14", "2025-04-15", "2025-04-16"].iter().enumerate() {
            let ts = format!("{}T08:05:00Z", day);
            db.record(&sale(&format!("v{}", i), "t1", &ts, 4.25, 1, Some("c1")))
                .unwrap();
        }

        let persona = classify(&db, "c1");
        assert_eq!(persona.cohort, Cohort::SoloCommuter);
        assert_eq!(persona.visit_count, 3);
        assert_eq!(persona.favorite_item.as_deref(), Some("Tacos"));
    }

    #[test]
    fn test_family_bulk_by_units() {
        let db = seed_database();
        for (i, day) in ["2025-04-12", "2025-04-14", "2025-04-16"].iter().enumerate() {
            let ts = format!("{}T18:45:00Z", day);
            db.record(&sale(&format!("v{}", i), "t3", &ts, 59.96, 4, Some("c2")))
                .unwrap();
        }

        let persona = classify(&db, "c2");
        assert_eq!(persona.cohort, Cohort::FamilyBulk);
    }

    #[test]
    fn test_family_bulk_by_spend() {
        let db = seed_database();
        // 2 units but spend over the $40 family-order threshold
        for (i, day) in ["2025-04-12", "2025-04-14", "2025-04-16"].iter().enumerate() {
            let ts = format!("{}T12:10:00Z", day);
            db.record(&sale(&format!("v{}", i), "t3", &ts, 44.97, 2, Some("c3")))
                .unwrap();
        }

        let persona = classify(&db, "c3");
        assert_eq!(persona.cohort, Cohort::FamilyBulk);
    }

    #[test]
    fn test_late_night_maverick() {
        let db = seed_database();
        for (i, ts) in [
            "2025-04-12T23:30:00Z",
            "2025-04-15T01:15:00Z",
            "2025-04-18T22:05:00Z",
        ]
        .iter()
        .enumerate()
        {
            db.record(&sale(&format!("v{}", i), "t2", ts, 5.99, 1, Some("c4")))
                .unwrap();
        }

        let persona = classify(&db, "c4");
        assert_eq!(persona.cohort, Cohort::LateNightMaverick);
    }

    #[test]
    fn test_tie_prefers_most_recent_visit() {
        let db = seed_database();
        // Two solo commute visits, then two family visits, most recent family
        db.record(&sale("v1", "t1", "2025-04-14T08:05:00Z", 4.25, 1, Some("c5")))
            .unwrap();
        db.record(&sale("v2", "t1", "2025-04-15T08:05:00Z", 4.25, 1, Some("c5")))
            .unwrap();
        db.record(&sale("v3", "t3", "2025-04-16T18:45:00Z", 59.96, 4, Some("c5")))
            .unwrap();
        db.record(&sale("v4", "t3", "2025-04-17T18:45:00Z", 59.96, 4, Some("c5")))
            .unwrap();

        let persona = classify(&db, "c5");
        assert_eq!(persona.cohort, Cohort::FamilyBulk);
    }

    #[test]
    fn test_gap_groups_one_visit() {
        let db = seed_database();
        // Three line items 10 minutes apart form a single 5-unit visit
        db.record(&sale("v1", "t1", "2025-04-14T12:00:00Z", 8.50, 2, Some("c6")))
            .unwrap();
        db.record(&sale("v2", "t2", "2025-04-14T12:10:00Z", 11.98, 2, Some("c6")))
            .unwrap();
        db.record(&sale("v3", "t8", "2025-04-14T12:20:00Z", 5.50, 1, Some("c6")))
            .unwrap();

        let persona = classify(&db, "c6");
        assert_eq!(persona.visit_count, 1);
        assert_eq!(persona.cohort, Cohort::FamilyBulk);
    }

    #[test]
    fn test_streak_counts_consecutive_weeks() {
        let db = seed_database();
        // Visits in ISO weeks of Mar 31, Apr 7, Apr 14 - three week run
        for (i, day) in ["2025-04-02", "2025-04-09", "2025-04-16"].iter().enumerate() {
            let ts = format!("{}T12:00:00Z", day);
            db.record(&sale(&format!("v{}", i), "t1", &ts, 4.25, 1, Some("c7")))
                .unwrap();
        }

        let persona = classify(&db, "c7");
        assert_eq!(persona.streak, 3);
    }

    #[test]
    fn test_streak_resets_on_missed_week() {
        let db = seed_database();
        // Week of Mar 31, skip week of Apr 7, then week of Apr 14
        for (i, day) in ["2025-04-02", "2025-04-16"].iter().enumerate() {
            let ts = format!("{}T12:00:00Z", day);
            db.record(&sale(&format!("v{}", i), "t1", &ts, 4.25, 1, Some("c8")))
                .unwrap();
        }

        let persona = classify(&db, "c8");
        assert_eq!(persona.streak, 1);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let db = seed_database();
        for (i, day) in ["2025-04-12", "2025-04-14", "2025-04-16"].iter().enumerate() {
            let ts = format!("{}T18:45:00Z", day);
            db.record(&sale(&format!("v{}", i), "t3", &ts, 59.96, 4, Some("c9")))
                .unwrap();
        }

        let first = classify(&db, "c9");
        let second = classify(&db, "c9");
        assert_eq!(first.cohort, second.cohort);
        assert_eq!(first.streak, second.streak);
        assert_eq!(first.visit_count, second.visit_count);
        assert_eq!(first.favorite_item, second.favorite_item);
    }
}
