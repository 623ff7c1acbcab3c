//! Contact Store - SQLite persistence for emergency contacts

use crate::error::{AlertSrvError, Result};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};

/// Required length of a domestic phone number
pub const PHONE_LENGTH: usize = 11;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS emergency_contacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        phone TEXT NOT NULL UNIQUE,
        relation TEXT NOT NULL DEFAULT ''
    )
"#;

/// Registered emergency contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub relation: String,
}

/// Check that `phone` is exactly 11 ASCII digits
pub fn validate_phone(phone: &str) -> Result<()> {
    if phone.len() != PHONE_LENGTH || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AlertSrvError::validation(format!(
            "Phone number must be {} digits",
            PHONE_LENGTH
        )));
    }
    Ok(())
}

fn hydrate_contact(row: &SqliteRow) -> Result<Contact> {
    Ok(Contact {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        relation: row.try_get("relation")?,
    })
}

/// Emergency contact repository
///
/// Every operation is a single statement, so each call is atomic on its own.
#[derive(Clone)]
pub struct ContactStore {
    pool: SqlitePool,
}

impl ContactStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the table if it does not exist
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        debug!("emergency_contacts table ready");
        Ok(())
    }

    /// Register a new contact
    ///
    /// Duplicate phones are caught by the UNIQUE index, so two concurrent
    /// registrations of the same number cannot both succeed.
    pub async fn register(&self, name: &str, phone: &str) -> Result<Contact> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AlertSrvError::validation("Name must not be empty"));
        }
        validate_phone(phone)?;

        let row = sqlx::query(
            r#"
            INSERT INTO emergency_contacts (name, phone)
            VALUES (?, ?)
            RETURNING id, name, phone, relation
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AlertSrvError::DuplicatePhone(phone.to_string())
            },
            other => other.into(),
        })?;

        let contact = hydrate_contact(&row)?;
        info!("Registered contact {} ({})", contact.id, contact.name);
        Ok(contact)
    }

    /// All contacts by id ascending
    pub async fn list(&self) -> Result<Vec<Contact>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, phone, relation
            FROM emergency_contacts
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(hydrate_contact).collect()
    }

    /// Overwrite the relation label of a contact
    pub async fn update_relation(&self, id: i64, relation: &str) -> Result<Contact> {
        let row = sqlx::query(
            r#"
            UPDATE emergency_contacts
            SET relation = ?
            WHERE id = ?
            RETURNING id, name, phone, relation
            "#,
        )
        .bind(relation)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => hydrate_contact(&row),
            None => Err(AlertSrvError::NotFound(id)),
        }
    }

    /// Remove a contact permanently
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM emergency_contacts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AlertSrvError::NotFound(id));
        }

        info!("Deleted contact {}", id);
        Ok(())
    }
}
