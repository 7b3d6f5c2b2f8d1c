//! Insight command implementation

use anyhow::Result;
use spark_core::{Database, EngineConfig, InsightEngine, Severity};

use super::parse_as_of;

pub fn cmd_insights(
    db: &Database,
    config: EngineConfig,
    as_of: Option<&str>,
    json: bool,
) -> Result<()> {
    let as_of = parse_as_of(as_of)?;
    let engine = InsightEngine::new(config)?;
    let insights = engine.compute(db, as_of)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if insights.is_empty() {
        println!("✅ No insights. Either the ledger is quiet or everything is on pace.");
        return Ok(());
    }

    println!();
    println!("🧠 Insights as of {}", as_of.format("%Y-%m-%d %H:%M"));
    println!("   ─────────────────────────────────────────────────────────────");

    for insight in &insights {
        let icon = match insight.severity {
            Severity::High => "🔴",
            Severity::Medium => "🟡",
            Severity::Low => "🟢",
        };
        println!("   {} [{}] {}", icon, insight.insight_type, insight.message);
        println!("      → {}", insight.action);
        println!();
    }

    Ok(())
}
