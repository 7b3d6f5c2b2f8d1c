//! Lifecycle command implementations (init, status)

use std::path::Path;

use anyhow::{Context, Result};
use spark_core::SeedFile;

use super::open_db;

pub fn cmd_init(db_path: &Path, seed: Option<&Path>) -> Result<()> {
    let db = open_db(db_path)?;
    println!("✅ Database initialized at {}", db_path.display());

    if let Some(seed_path) = seed {
        let seed = SeedFile::load(seed_path)
            .with_context(|| format!("Failed to read seed file {}", seed_path.display()))?;
        seed.apply(&db)?;
        println!(
            "   Loaded {} items, {} events, {} customers from {}",
            seed.items.len(),
            seed.events.len(),
            seed.customers.len(),
            seed_path.display()
        );
    } else {
        println!("   No seed file given; load the catalog later with 'quickspark init --seed truck.toml'");
    }

    Ok(())
}

pub fn cmd_status(db_path: &Path) -> Result<()> {
    use std::fs;

    println!();
    println!("⚡ QuickSpark Status");
    println!("   ─────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
        println!();
        return Ok(());
    }

    match open_db(db_path) {
        Ok(db) => {
            println!();
            println!("   Menu items: {}", db.list_items()?.len());
            println!("   Calendar events: {}", db.list_events()?.len());
            println!("   Customers: {}", db.list_customers()?.len());
            println!("   Transactions: {}", db.count_transactions()?);
        }
        Err(e) => {
            println!();
            println!("   ❌ Error opening database: {}", e);
        }
    }

    println!();
    Ok(())
}
