//! Test fixtures
//!
//! The menu, calendar, and customer arrays the original dashboard shipped
//! as mock data survive here as seed fixtures for tests. Production data
//! arrives through the seed file and the POS feed.

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::Database;
use crate::models::{Customer, EventImpact, InventoryItem, LocalEvent, NewTransaction};

fn item(
    id: &str,
    name: &str,
    price: f64,
    cost: f64,
    category: &str,
    portion: &str,
    burn_rate: f64,
    expiry_days: u32,
    stock: i64,
) -> InventoryItem {
    InventoryItem {
        id: id.into(),
        name: name.into(),
        price,
        cost,
        category: category.into(),
        standard_portion: portion.into(),
        burn_rate,
        expiry_days,
        current_stock: stock,
    }
}

/// The truck's menu
pub fn seed_menu() -> Vec<InventoryItem> {
    vec![
        item("t1", "Tacos", 4.25, 1.10, "Main", "2oz meat", 15.0, 3, 450),
        item("t2", "Queso birria", 5.99, 1.80, "Premium", "3oz birria", 25.0, 2, 120),
        item("t3", "Super Burritos", 14.99, 4.50, "Main", "6oz meat", 35.0, 4, 80),
        item("t4", "Regular Burritos", 12.25, 3.80, "Main", "4oz meat", 20.0, 4, 65),
        item("t5", "Veggie Burrito", 12.25, 2.50, "Main", "beans/rice", 10.0, 5, 40),
        item("t6", "Quesadilla", 13.75, 4.00, "Main", "5oz cheese/meat", 30.0, 4, 55),
        item("t7", "Torta", 13.75, 4.20, "Sandwich", "Multi-meat", 15.0, 3, 25),
        item("t8", "Agua Fresca", 5.50, 0.80, "Drinks", "20oz", 5.0, 2, 100),
    ]
}

/// The local event calendar
pub fn seed_events() -> Vec<LocalEvent> {
    fn event(name: &str, date: (i32, u32, u32), impact: EventImpact, desc: &str) -> LocalEvent {
        LocalEvent {
            name: name.into(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            impact,
            description: desc.into(),
        }
    }

    vec![
        event(
            "Apple Blossom Festival",
            (2025, 4, 20),
            EventImpact::High,
            "Large crowds in downtown Sebastopol.",
        ),
        event(
            "Gravenstein Apple Fair",
            (2025, 8, 12),
            EventImpact::High,
            "Major regional draw for tourists.",
        ),
        event(
            "Cajun Festival",
            (2025, 6, 15),
            EventImpact::Medium,
            "Increased weekend foot traffic.",
        ),
        event(
            "St. Patrick's Day",
            (2025, 3, 17),
            EventImpact::Medium,
            "Higher demand for hearty evening meals.",
        ),
    ]
}

/// Registered regulars
pub fn seed_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "c1".into(),
            name: "Sebastopol Regular".into(),
        },
        Customer {
            id: "c2".into(),
            name: "The Park Family".into(),
        },
        Customer {
            id: "c3".into(),
            name: "Gravenstein Local".into(),
        },
    ]
}

/// A throwaway database seeded with the menu, calendar, and customers
pub fn seed_database() -> Database {
    let db = Database::in_memory().expect("in-memory database");
    db.load_catalog(&seed_menu()).expect("seed catalog");
    db.load_events(&seed_events()).expect("seed events");
    for customer in seed_customers() {
        db.upsert_customer(&customer.id, &customer.name)
            .expect("seed customer");
    }
    db
}

/// Build a sale for ledger tests
pub fn sale(
    id: &str,
    item_id: &str,
    timestamp: &str,
    amount: f64,
    quantity: i64,
    customer_id: Option<&str>,
) -> NewTransaction {
    let timestamp: DateTime<Utc> = timestamp.parse().expect("valid RFC 3339 timestamp");
    NewTransaction {
        id: id.into(),
        item_id: item_id.into(),
        timestamp,
        amount,
        quantity,
        customer_id: customer_id.map(Into::into),
    }
}
