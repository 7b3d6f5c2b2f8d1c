//! POS feed import
//!
//! Parses point-of-sale CSV exports into ledger transactions. Expected
//! columns: `timestamp,item_id,quantity,amount,customer_id,id`; the last
//! two may be empty. Rows without an id get one derived from a SHA-256
//! over the row fields, so replaying the same export never double-records.

use std::io::Read;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::NewTransaction;

/// One row of a POS export
#[derive(Debug, Deserialize)]
struct FeedRow {
    timestamp: String,
    item_id: String,
    quantity: i64,
    amount: f64,
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Statistics from an import run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub recorded: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Derive a stable transaction id from the row fields
fn derive_id(row: &FeedRow) -> String {
    let mut hasher = Sha256::new();
    hasher.update(row.timestamp.as_bytes());
    hasher.update(b"|");
    hasher.update(row.item_id.as_bytes());
    hasher.update(b"|");
    hasher.update(row.quantity.to_le_bytes());
    hasher.update(b"|");
    hasher.update(row.amount.to_le_bytes());
    hasher.update(b"|");
    hasher.update(row.customer_id.as_deref().unwrap_or("").as_bytes());

    let digest = hasher.finalize();
    format!("pos-{}", &hex::encode(digest)[..16])
}

fn row_to_transaction(row: FeedRow) -> Result<NewTransaction> {
    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Validation(format!("invalid timestamp {:?}: {}", row.timestamp, e)))?;

    let id = match row.id {
        Some(ref id) if !id.trim().is_empty() => id.clone(),
        _ => derive_id(&row),
    };

    Ok(NewTransaction {
        id,
        item_id: row.item_id,
        timestamp,
        amount: row.amount,
        quantity: row.quantity,
        customer_id: row.customer_id.filter(|c| !c.trim().is_empty()),
    })
}

/// Parse a POS export into transactions
///
/// Strict: the first malformed row fails the whole parse. Use
/// `import_feed` for the lenient row-by-row path.
pub fn parse_feed_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut transactions = vec![];
    for row in csv_reader.deserialize::<FeedRow>() {
        transactions.push(row_to_transaction(row?)?);
    }
    Ok(transactions)
}

/// Import a POS export into the ledger
///
/// Malformed and invalid rows are counted, logged, and skipped; rows whose
/// id is already recorded count as duplicates. Only infrastructure errors
/// abort the run.
pub fn import_feed<R: Read>(db: &Database, reader: R) -> Result<ImportStats> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut stats = ImportStats::default();

    for (index, row) in csv_reader.deserialize::<FeedRow>().enumerate() {
        let tx = match row.map_err(Error::from).and_then(row_to_transaction) {
            Ok(tx) => tx,
            Err(e) => {
                warn!(row = index + 1, error = %e, "Rejected feed row");
                stats.rejected += 1;
                continue;
            }
        };

        if db.get_transaction(&tx.id)?.is_some() {
            stats.duplicates += 1;
            continue;
        }

        match db.record(&tx) {
            Ok(_) => stats.recorded += 1,
            Err(Error::Validation(reason)) => {
                warn!(row = index + 1, %reason, "Rejected feed row");
                stats.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        recorded = stats.recorded,
        duplicates = stats.duplicates,
        rejected = stats.rejected,
        "Feed import complete"
    );
    Ok(stats)
}
