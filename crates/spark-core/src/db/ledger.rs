//! Sales ledger operations
//!
//! The ledger is append-only: `record` validates and inserts, queries read,
//! and nothing updates or deletes a recorded row.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{encode_timestamp, parse_datetime, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction};

/// Filter over the ledger
///
/// A filter is reusable: every `Database::query` call re-executes it
/// against the current snapshot and yields matches in timestamp order,
/// so callers can restart the sequence at will.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    item_id: Option<String>,
    customer_id: Option<String>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl LedgerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only transactions for this item
    pub fn item(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    /// Only transactions tied to this customer
    pub fn customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Only transactions at or after this instant
    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Only transactions strictly before this instant
    pub fn until(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }
}

impl Database {
    /// Append a validated transaction to the ledger
    ///
    /// Fails with `Error::Validation` when the item id does not resolve in
    /// the catalog, the quantity is not positive, the timestamp is in the
    /// future, or the id was already recorded. Validation failures are
    /// terminal; callers should not retry them.
    pub fn record(&self, tx: &NewTransaction) -> Result<Transaction> {
        if tx.id.trim().is_empty() {
            return Err(Error::Validation("transaction id must not be empty".into()));
        }
        if tx.quantity <= 0 {
            return Err(Error::Validation(format!(
                "transaction {}: quantity must be positive (got {})",
                tx.id, tx.quantity
            )));
        }
        if tx.timestamp > Utc::now() {
            return Err(Error::Validation(format!(
                "transaction {}: timestamp {} is in the future",
                tx.id, tx.timestamp
            )));
        }
        if self.get_item(&tx.item_id)?.is_none() {
            return Err(Error::Validation(format!(
                "transaction {}: unknown item {}",
                tx.id, tx.item_id
            )));
        }

        let conn = self.conn()?;

        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM transactions WHERE id = ?",
                params![tx.id],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::Validation(format!(
                "transaction {} already recorded",
                tx.id
            )));
        }

        conn.execute(
            r#"
            INSERT INTO transactions (id, item_id, ts, amount, quantity, customer_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.id,
                tx.item_id,
                encode_timestamp(tx.timestamp),
                tx.amount,
                tx.quantity,
                tx.customer_id,
            ],
        )?;
        drop(conn);

        self.get_transaction(&tx.id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {} after insert", tx.id)))
    }

    /// Fetch a single transaction by id
    pub fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, item_id, ts, amount, quantity, customer_id, recorded_at
                 FROM transactions WHERE id = ?",
                params![id],
                row_to_raw,
            )
            .optional()?;
        row.map(raw_to_transaction).transpose()
    }

    /// Run a ledger filter, ordered by timestamp ascending
    pub fn query(&self, filter: &LedgerFilter) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref item_id) = filter.item_id {
            conditions.push("item_id = ?");
            params.push(Box::new(item_id.clone()));
        }
        if let Some(ref customer_id) = filter.customer_id {
            conditions.push("customer_id = ?");
            params.push(Box::new(customer_id.clone()));
        }
        if let Some(from) = filter.from {
            conditions.push("ts >= ?");
            params.push(Box::new(encode_timestamp(from)));
        }
        if let Some(to) = filter.to {
            conditions.push("ts < ?");
            params.push(Box::new(encode_timestamp(to)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT id, item_id, ts, amount, quantity, customer_id, recorded_at
             FROM transactions {} ORDER BY ts, id",
            where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
            .query_map(rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())), row_to_raw)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raws.into_iter().map(raw_to_transaction).collect()
    }

    /// Total number of recorded transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Units sold per item over `[from, to)`, ordered by item id
    pub fn units_by_item_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT item_id, SUM(quantity) FROM transactions
             WHERE ts >= ? AND ts < ? GROUP BY item_id ORDER BY item_id",
        )?;
        let rows = stmt
            .query_map(
                params![encode_timestamp(from), encode_timestamp(to)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Units of one item sold over `[from, to)`
    pub fn item_units_between(
        &self,
        item_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let units = conn.query_row(
            "SELECT COALESCE(SUM(quantity), 0) FROM transactions
             WHERE item_id = ? AND ts >= ? AND ts < ?",
            params![item_id, encode_timestamp(from), encode_timestamp(to)],
            |row| row.get(0),
        )?;
        Ok(units)
    }
}

struct RawTransaction {
    id: String,
    item_id: String,
    ts: String,
    amount: f64,
    quantity: i64,
    customer_id: Option<String>,
    recorded_at: String,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTransaction> {
    Ok(RawTransaction {
        id: row.get(0)?,
        item_id: row.get(1)?,
        ts: row.get(2)?,
        amount: row.get(3)?,
        quantity: row.get(4)?,
        customer_id: row.get(5)?,
        recorded_at: row.get(6)?,
    })
}

fn raw_to_transaction(raw: RawTransaction) -> Result<Transaction> {
    Ok(Transaction {
        timestamp: parse_timestamp(&raw.ts)?,
        recorded_at: parse_datetime(&raw.recorded_at),
        id: raw.id,
        item_id: raw.item_id,
        amount: raw.amount,
        quantity: raw.quantity,
        customer_id: raw.customer_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sale, seed_menu};
    use chrono::Duration;

    fn db_with_menu() -> Database {
        let db = Database::in_memory().unwrap();
        db.load_catalog(&seed_menu()).unwrap();
        db
    }

    #[test]
    fn test_record_round_trip() {
        let db = db_with_menu();
        let tx = sale("s1", "t2", "2025-08-01T12:15:00Z", 11.98, 2, Some("c7"));

        let recorded = db.record(&tx).unwrap();
        let fetched = db.get_transaction("s1").unwrap().unwrap();

        assert_eq!(recorded, fetched);
        assert_eq!(fetched.item_id, "t2");
        assert_eq!(fetched.quantity, 2);
        assert!((fetched.amount - 11.98).abs() < 0.001);
        assert_eq!(fetched.customer_id.as_deref(), Some("c7"));
        assert_eq!(fetched.timestamp, tx.timestamp);
    }

    #[test]
    fn test_record_rejects_unknown_item() {
        let db = db_with_menu();
        let tx = sale("s1", "t99", "2025-08-01T12:15:00Z", 4.25, 1, None);
        let err = db.record(&tx).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_record_rejects_nonpositive_quantity() {
        let db = db_with_menu();
        let tx = sale("s1", "t1", "2025-08-01T12:15:00Z", 4.25, 0, None);
        assert!(matches!(db.record(&tx).unwrap_err(), Error::Validation(_)));
    }

    #[test]
    fn test_record_rejects_future_timestamp() {
        let db = db_with_menu();
        let mut tx = sale("s1", "t1", "2025-08-01T12:15:00Z", 4.25, 1, None);
        tx.timestamp = Utc::now() + Duration::hours(1);
        assert!(matches!(db.record(&tx).unwrap_err(), Error::Validation(_)));
    }

    #[test]
    fn test_record_rejects_duplicate_id() {
        let db = db_with_menu();
        let tx = sale("s1", "t1", "2025-08-01T12:15:00Z", 4.25, 1, None);
        db.record(&tx).unwrap();
        assert!(matches!(db.record(&tx).unwrap_err(), Error::Validation(_)));
    }

    #[test]
    fn test_query_is_ordered_and_restartable() {
        let db = db_with_menu();
        // Inserted out of order on purpose
        db.record(&sale("s2", "t1", "2025-08-01T13:00:00Z", 4.25, 1, None))
            .unwrap();
        db.record(&sale("s1", "t1", "2025-08-01T11:00:00Z", 4.25, 1, None))
            .unwrap();
        db.record(&sale("s3", "t2", "2025-08-01T14:00:00Z", 5.99, 1, None))
            .unwrap();

        let filter = LedgerFilter::new().item("t1");
        let first = db.query(&filter).unwrap();
        assert_eq!(
            first.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["s1", "s2"]
        );

        // Re-running the same filter restarts the sequence
        let second = db.query(&filter).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_time_range_filter() {
        let db = db_with_menu();
        db.record(&sale("s1", "t1", "2025-08-01T11:00:00Z", 4.25, 1, None))
            .unwrap();
        db.record(&sale("s2", "t1", "2025-08-01T13:00:00Z", 4.25, 1, None))
            .unwrap();

        let from = "2025-08-01T12:00:00Z".parse().unwrap();
        let to = "2025-08-01T14:00:00Z".parse().unwrap();
        let hits = db.query(&LedgerFilter::new().from(from).until(to)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "s2");
    }

    #[test]
    fn test_units_aggregates() {
        let db = db_with_menu();
        db.record(&sale("s1", "t1", "2025-08-01T11:00:00Z", 8.50, 2, None))
            .unwrap();
        db.record(&sale("s2", "t1", "2025-08-01T12:00:00Z", 4.25, 1, None))
            .unwrap();
        db.record(&sale("s3", "t2", "2025-08-01T12:30:00Z", 5.99, 1, None))
            .unwrap();

        let from = "2025-08-01T00:00:00Z".parse().unwrap();
        let to = "2025-08-02T00:00:00Z".parse().unwrap();

        assert_eq!(db.item_units_between("t1", from, to).unwrap(), 3);
        let by_item = db.units_by_item_between(from, to).unwrap();
        assert_eq!(by_item, vec![("t1".to_string(), 3), ("t2".to_string(), 1)]);
    }
}
