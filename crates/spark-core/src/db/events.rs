//! Event calendar operations

use chrono::NaiveDate;
use rusqlite::params;
use tracing::warn;

use super::Database;
use crate::error::Result;
use crate::models::{EventImpact, LocalEvent};

impl Database {
    /// Load calendar events, replacing any existing row with the same name
    pub fn load_events(&self, events: &[LocalEvent]) -> Result<usize> {
        let conn = self.conn()?;
        for event in events {
            conn.execute(
                r#"
                INSERT INTO events (name, date, impact, description)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(name) DO UPDATE SET
                    date = excluded.date,
                    impact = excluded.impact,
                    description = excluded.description
                "#,
                params![
                    event.name,
                    event.date.to_string(),
                    event.impact.as_str(),
                    event.description,
                ],
            )?;
        }
        Ok(events.len())
    }

    /// List all calendar events ordered by date
    pub fn list_events(&self) -> Result<Vec<LocalEvent>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT name, date, impact, description FROM events ORDER BY date, name")?;
        let rows = stmt
            .query_map([], row_to_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows.into_iter().flatten().collect())
    }

    /// Events with a date in `[from, to]` inclusive, ordered by date
    pub fn events_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<LocalEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, date, impact, description FROM events
             WHERE date >= ? AND date <= ? ORDER BY date, name",
        )?;
        let rows = stmt
            .query_map(params![from.to_string(), to.to_string()], row_to_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows.into_iter().flatten().collect())
    }
}

/// Map a row to an event, dropping rows whose stored fields no longer parse
fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Option<LocalEvent>> {
    let name: String = row.get(0)?;
    let date_raw: String = row.get(1)?;
    let impact_raw: String = row.get(2)?;
    let description: String = row.get(3)?;

    let date = match date_raw.parse::<NaiveDate>() {
        Ok(d) => d,
        Err(e) => {
            warn!(event = %name, error = %e, "Skipping event with unparseable date");
            return Ok(None);
        }
    };
    let impact = match impact_raw.parse::<EventImpact>() {
        Ok(i) => i,
        Err(e) => {
            warn!(event = %name, error = %e, "Skipping event with unknown impact");
            return Ok(None);
        }
    };

    Ok(Some(LocalEvent {
        name,
        date,
        impact,
        description,
    }))
}
