//! CLI command tests

use std::io::Write;

use clap::Parser;
use spark_core::test_utils::seed_database;
use spark_core::{Database, EngineConfig};

use crate::cli::{Cli, Commands};
use crate::commands;

fn setup_test_db() -> Database {
    seed_database()
}

// ========== Argument Parsing ==========

#[test]
fn test_parse_record_args() {
    let cli = Cli::try_parse_from([
        "quickspark", "record", "--item", "t2", "--quantity", "3", "--customer", "c1",
    ])
    .unwrap();

    match cli.command {
        Commands::Record {
            item,
            quantity,
            customer,
            amount,
            ..
        } => {
            assert_eq!(item, "t2");
            assert_eq!(quantity, 3);
            assert_eq!(customer.as_deref(), Some("c1"));
            assert!(amount.is_none());
        }
        _ => panic!("expected record command"),
    }
}

#[test]
fn test_parse_insights_defaults() {
    let cli = Cli::try_parse_from(["quickspark", "insights"]).unwrap();
    match cli.command {
        Commands::Insights { as_of, json } => {
            assert!(as_of.is_none());
            assert!(!json);
        }
        _ => panic!("expected insights command"),
    }
    assert_eq!(cli.db.to_string_lossy(), "quickspark.db");
}

#[test]
fn test_parse_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["quickspark", "frobnicate"]).is_err());
}

// ========== Record Command ==========

#[test]
fn test_cmd_record_defaults_amount_from_catalog() {
    let db = setup_test_db();
    commands::cmd_record(
        &db,
        "t2",
        2,
        None,
        Some("c1"),
        Some("2025-04-14T12:00:00Z"),
        Some("s1"),
    )
    .unwrap();

    let tx = db.get_transaction("s1").unwrap().unwrap();
    assert_eq!(tx.quantity, 2);
    // 2 x 5.99 from the catalog
    assert!((tx.amount - 11.98).abs() < 0.001);
}

#[test]
fn test_cmd_record_unknown_item_fails() {
    let db = setup_test_db();
    let result = commands::cmd_record(&db, "t99", 1, None, None, None, None);
    assert!(result.is_err());
}

// ========== Import Command ==========

#[test]
fn test_cmd_import_feed_file() {
    let db = setup_test_db();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "timestamp,item_id,quantity,amount,customer_id,id").unwrap();
    writeln!(file, "2025-04-14T12:05:00Z,t1,2,8.50,c1,s1").unwrap();
    writeln!(file, "2025-04-14T12:35:00Z,t2,1,5.99,,s2").unwrap();
    file.flush().unwrap();

    commands::cmd_import(&db, file.path()).unwrap();
    assert_eq!(db.count_transactions().unwrap(), 2);
}

// ========== Insight / Classify / Social Commands ==========

#[test]
fn test_cmd_insights_runs_on_seeded_ledger() {
    let db = setup_test_db();
    commands::cmd_record(
        &db,
        "t1",
        2,
        None,
        None,
        Some("2025-04-14T12:00:00Z"),
        Some("s1"),
    )
    .unwrap();

    let result = commands::cmd_insights(
        &db,
        EngineConfig::default(),
        Some("2025-04-15T18:00:00Z"),
        false,
    );
    assert!(result.is_ok());
}

#[test]
fn test_cmd_insights_rejects_bad_as_of() {
    let db = setup_test_db();
    let result = commands::cmd_insights(&db, EngineConfig::default(), Some("yesterday"), false);
    assert!(result.is_err());
}

#[test]
fn test_cmd_classify_unknown_customer_fails() {
    let db = setup_test_db();
    let config = EngineConfig::default();
    let result = commands::cmd_classify(&db, &config, "ghost", Some("2025-04-15T18:00:00Z"));
    assert!(result.is_err());
}

#[test]
fn test_cmd_classify_known_customer() {
    let db = setup_test_db();
    for (i, day) in ["2025-04-14", "2025-04-15", "2025-04-16"].iter().enumerate() {
        commands::cmd_record(
            &db,
            "t1",
            1,
            None,
            Some("c1"),
            Some(&format!("{}T08:05:00Z", day)),
            Some(&format!("s{}", i)),
        )
        .unwrap();
    }

    let config = EngineConfig::default();
    let result = commands::cmd_classify(&db, &config, "c1", Some("2025-04-30T00:00:00Z"));
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_social_template_path() {
    let db = setup_test_db();
    commands::cmd_record(
        &db,
        "t2",
        2,
        None,
        None,
        Some("2025-04-14T12:00:00Z"),
        Some("s1"),
    )
    .unwrap();

    let result = commands::cmd_social(
        &db,
        EngineConfig::default(),
        false,
        Some("2025-04-15T18:00:00Z"),
    )
    .await;
    assert!(result.is_ok());
}
