//! Ledger command implementations (record, import, transactions)

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use spark_core::{import_feed, Database, LedgerFilter, NewTransaction};

pub fn cmd_record(
    db: &Database,
    item_id: &str,
    quantity: i64,
    amount: Option<f64>,
    customer: Option<&str>,
    at: Option<&str>,
    id: Option<&str>,
) -> Result<()> {
    let Some(item) = db.get_item(item_id)? else {
        bail!("Unknown item '{}'. Run 'quickspark menu' to list the catalog.", item_id);
    };

    let timestamp: DateTime<Utc> = match at {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid --at timestamp {:?} (use RFC 3339)", raw))?,
        None => Utc::now(),
    };

    let amount = amount.unwrap_or(item.price * quantity as f64);
    let id = id.map(str::to_string).unwrap_or_else(|| {
        format!("man-{}-{}", timestamp.timestamp_millis(), item_id)
    });

    let tx = NewTransaction {
        id,
        item_id: item_id.to_string(),
        timestamp,
        amount,
        quantity,
        customer_id: customer.map(str::to_string),
    };

    let recorded = db.record(&tx)?;
    println!(
        "✅ Recorded {} x{} (${:.2}) as {}",
        item.name, recorded.quantity, recorded.amount, recorded.id
    );
    Ok(())
}

pub fn cmd_import(db: &Database, file: &Path) -> Result<()> {
    let reader =
        File::open(file).with_context(|| format!("Failed to open feed {}", file.display()))?;
    let stats = import_feed(db, reader)?;

    println!();
    println!("📥 Feed import: {}", file.display());
    println!("   Recorded: {}", stats.recorded);
    println!("   Duplicates skipped: {}", stats.duplicates);
    if stats.rejected > 0 {
        println!("   ⚠️  Rejected rows: {}", stats.rejected);
    }
    Ok(())
}

pub fn cmd_transactions(db: &Database, limit: usize) -> Result<()> {
    let mut transactions = db.query(&LedgerFilter::new())?;

    if transactions.is_empty() {
        println!("No transactions recorded. Import a feed with:");
        println!("  quickspark import --file feed.csv");
        return Ok(());
    }

    // Newest last, capped to the requested tail
    if transactions.len() > limit {
        transactions.drain(..transactions.len() - limit);
    }

    println!();
    println!("🧾 Transactions (last {})", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &transactions {
        let customer = tx.customer_id.as_deref().unwrap_or("-");
        println!(
            "   {}  {:<4} x{:<3} ${:>8.2}  {}  [{}]",
            tx.timestamp.format("%Y-%m-%d %H:%M"),
            tx.item_id,
            tx.quantity,
            tx.amount,
            customer,
            tx.id
        );
    }

    Ok(())
}
