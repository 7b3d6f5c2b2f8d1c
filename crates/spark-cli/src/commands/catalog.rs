//! Catalog and calendar command implementations

use anyhow::Result;
use spark_core::Database;

pub fn cmd_menu(db: &Database) -> Result<()> {
    let items = db.list_items()?;

    if items.is_empty() {
        println!("Catalog is empty. Load it with:");
        println!("  quickspark init --seed truck.toml");
        return Ok(());
    }

    println!();
    println!("🌮 Menu");
    println!("   ─────────────────────────────────────────────────────────────");

    for item in &items {
        let margin = item.price - item.cost;
        println!(
            "   {:<4} {:<18} ${:>5.2} (margin ${:>4.2})  stock {:>4}  {:>4.0}/hr burn",
            item.id, item.name, item.price, margin, item.current_stock, item.burn_rate
        );
    }

    Ok(())
}

pub fn cmd_events(db: &Database) -> Result<()> {
    let events = db.list_events()?;

    if events.is_empty() {
        println!("Calendar is empty. Load it with:");
        println!("  quickspark init --seed truck.toml");
        return Ok(());
    }

    println!();
    println!("📅 Local events");
    println!("   ─────────────────────────────────────────────────────────────");

    for event in &events {
        println!(
            "   {}  [{}]  {} - {}",
            event.date, event.impact, event.name, event.description
        );
    }

    Ok(())
}
