//! Catalog operations
//!
//! Menu items are reference data loaded at init. The insight engine and
//! cohort classifier only ever read them.

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::InventoryItem;

impl Database {
    /// Load catalog items, replacing any existing row with the same id
    ///
    /// Each item is validated against the catalog invariants before any
    /// row is written; a single bad item rejects the whole load.
    pub fn load_catalog(&self, items: &[InventoryItem]) -> Result<usize> {
        for item in items {
            item.validate()?;
        }

        let conn = self.conn()?;
        for item in items {
            conn.execute(
                r#"
                INSERT INTO items (id, name, price, cost, category, standard_portion, burn_rate, expiry_days, current_stock)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    price = excluded.price,
                    cost = excluded.cost,
                    category = excluded.category,
                    standard_portion = excluded.standard_portion,
                    burn_rate = excluded.burn_rate,
                    expiry_days = excluded.expiry_days,
                    current_stock = excluded.current_stock
                "#,
                params![
                    item.id,
                    item.name,
                    item.price,
                    item.cost,
                    item.category,
                    item.standard_portion,
                    item.burn_rate,
                    item.expiry_days,
                    item.current_stock,
                ],
            )?;
        }

        Ok(items.len())
    }

    /// Look up a single catalog item
    pub fn get_item(&self, id: &str) -> Result<Option<InventoryItem>> {
        let conn = self.conn()?;
        let item = conn
            .query_row(
                "SELECT id, name, price, cost, category, standard_portion, burn_rate, expiry_days, current_stock
                 FROM items WHERE id = ?",
                params![id],
                row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    /// List all catalog items ordered by id
    pub fn list_items(&self) -> Result<Vec<InventoryItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, price, cost, category, standard_portion, burn_rate, expiry_days, current_stock
             FROM items ORDER BY id",
        )?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        cost: row.get(3)?,
        category: row.get(4)?,
        standard_portion: row.get(5)?,
        burn_rate: row.get(6)?,
        expiry_days: row.get(7)?,
        current_stock: row.get(8)?,
    })
}
