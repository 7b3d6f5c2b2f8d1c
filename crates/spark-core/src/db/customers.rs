//! Customer registry operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::Customer;

impl Database {
    /// Register a customer or update their display name
    pub fn upsert_customer(&self, id: &str, name: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO customers (id, name) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![id, name],
        )?;
        Ok(())
    }

    /// Display name for a customer, if registered
    pub fn get_customer_name(&self, id: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let name = conn
            .query_row(
                "SELECT name FROM customers WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    /// List registered customers ordered by id
    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM customers ORDER BY id")?;
        let customers = stmt
            .query_map([], |row| {
                Ok(Customer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(customers)
    }
}
