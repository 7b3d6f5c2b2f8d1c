//! Social post command implementation

use anyhow::Result;
use spark_core::{
    compose_scarcity_post, Database, EngineConfig, GenerativeClient, InsightEngine, InsightType,
    SocialPostRecommender,
};
use tracing::warn;

use super::parse_as_of;

pub async fn cmd_social(
    db: &Database,
    config: EngineConfig,
    live: bool,
    as_of: Option<&str>,
) -> Result<()> {
    let as_of = parse_as_of(as_of)?;
    let engine = InsightEngine::new(config)?;
    let insights = engine.compute(db, as_of)?;

    let yields: Vec<_> = insights
        .iter()
        .filter(|i| i.insight_type == InsightType::YieldAlert)
        .cloned()
        .collect();
    let events: Vec<_> = insights
        .iter()
        .filter(|i| i.insight_type == InsightType::EventAlert)
        .cloned()
        .collect();

    let top_item = top_item_name(db, &insights, as_of)?;

    let post = if live {
        match GenerativeClient::from_env() {
            Some(client) => {
                SocialPostRecommender::new(engine.config())
                    .compose_styled(&client, &yields, &events, &top_item)
                    .await
            }
            None => {
                warn!("No generative backend configured (set OLLAMA_HOST); using the template");
                compose_scarcity_post(&yields, &events, &top_item)
            }
        }
    } else {
        compose_scarcity_post(&yields, &events, &top_item)
    };

    println!();
    println!("📣 Scarcity post draft");
    println!("   ─────────────────────────────────────────────");
    println!("{}", post);
    println!();

    Ok(())
}

/// Pick the post's headline item: the margin champion when the engine
/// found one, else the best seller over the margin window, else the first
/// catalog item.
fn top_item_name(
    db: &Database,
    insights: &[spark_core::BusinessInsight],
    as_of: chrono::DateTime<chrono::Utc>,
) -> Result<String> {
    if let Some(boost) = insights
        .iter()
        .find(|i| i.insight_type == InsightType::MarginBoost)
    {
        if let Some(name) = boost.data.get("item_name").and_then(|v| v.as_str()) {
            return Ok(name.to_string());
        }
    }

    let from = as_of - chrono::Duration::days(14);
    let mut by_units = db.units_by_item_between(from, as_of)?;
    by_units.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if let Some((item_id, _)) = by_units.first() {
        if let Some(item) = db.get_item(item_id)? {
            return Ok(item.name);
        }
    }

    Ok(db
        .list_items()?
        .first()
        .map(|item| item.name.clone())
        .unwrap_or_else(|| "today's special".to_string()))
}
