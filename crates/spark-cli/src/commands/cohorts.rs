//! Cohort command implementation

use anyhow::Result;
use spark_core::{CohortClassifier, Database, EngineConfig};

use super::parse_as_of;

pub fn cmd_classify(
    db: &Database,
    config: &EngineConfig,
    customer: &str,
    as_of: Option<&str>,
) -> Result<()> {
    let as_of = parse_as_of(as_of)?;
    let persona = CohortClassifier::new(db, config).classify(customer, as_of)?;

    println!();
    println!("👤 {} ({})", persona.name, persona.id);
    println!("   ─────────────────────────────────────────────");
    println!("   Cohort: {}", persona.cohort.label());
    println!("   Visits: {}", persona.visit_count);
    if let Some(favorite) = &persona.favorite_item {
        println!("   Favorite: {}", favorite);
    }
    println!("   Last visit: {}", persona.last_visit.format("%Y-%m-%d %H:%M"));
    println!("   Streak: {} week(s)", persona.streak);
    println!();

    Ok(())
}
