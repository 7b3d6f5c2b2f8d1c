//! Catalog and calendar seed files
//!
//! The catalog and event calendar are read-only inputs loaded at process
//! start from a TOML file. Dates must be quoted strings (`"2025-04-20"`).
//!
//! ```toml
//! [[items]]
//! id = "t1"
//! name = "Tacos"
//! price = 4.25
//! cost = 1.10
//! category = "Main"
//! standard_portion = "2oz meat"
//! burn_rate = 15.0
//! expiry_days = 3
//! current_stock = 450
//!
//! [[events]]
//! name = "Apple Blossom Festival"
//! date = "2025-04-20"
//! impact = "high"
//! description = "Large crowds downtown."
//!
//! [[customers]]
//! id = "c1"
//! name = "Sebastopol Regular"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Customer, InventoryItem, LocalEvent};

/// Parsed seed file contents
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
    #[serde(default)]
    pub events: Vec<LocalEvent>,
    #[serde(default)]
    pub customers: Vec<Customer>,
}

impl SeedFile {
    /// Read and parse a seed file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse seed file contents
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load the parsed data into the database
    ///
    /// Item invariants are validated by the catalog load; a bad item
    /// rejects the whole file.
    pub fn apply(&self, db: &Database) -> Result<()> {
        db.load_catalog(&self.items)?;
        db.load_events(&self.events)?;
        for customer in &self.customers {
            db.upsert_customer(&customer.id, &customer.name)?;
        }
        info!(
            items = self.items.len(),
            events = self.events.len(),
            customers = self.customers.len(),
            "Seed file applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"
        [[items]]
        id = "t1"
        name = "Tacos"
        price = 4.25
        cost = 1.10
        category = "Main"
        standard_portion = "2oz meat"
        burn_rate = 15.0
        expiry_days = 3
        current_stock = 450

        [[events]]
        name = "Apple Blossom Festival"
        date = "2025-04-20"
        impact = "high"
        description = "Large crowds downtown."

        [[customers]]
        id = "c1"
        name = "Sebastopol Regular"
    "#;

    #[test]
    fn test_parse_and_apply() {
        let seed = SeedFile::from_toml_str(SEED).unwrap();
        assert_eq!(seed.items.len(), 1);
        assert_eq!(seed.events.len(), 1);
        assert_eq!(seed.customers.len(), 1);

        let db = Database::in_memory().unwrap();
        seed.apply(&db).unwrap();

        assert!(db.get_item("t1").unwrap().is_some());
        assert_eq!(db.list_events().unwrap().len(), 1);
        assert_eq!(
            db.get_customer_name("c1").unwrap().as_deref(),
            Some("Sebastopol Regular")
        );
    }

    #[test]
    fn test_invalid_item_rejected() {
        let bad = SEED.replace("price = 4.25", "price = 0.50");
        let seed = SeedFile::from_toml_str(&bad).unwrap();
        let db = Database::in_memory().unwrap();
        assert!(seed.apply(&db).is_err());
    }
}
