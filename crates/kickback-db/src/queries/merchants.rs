//! Merchant geo-rule query functions.
//!
//! Country lists are stored as JSON text columns, mirroring how other
//! list-valued attributes are persisted elsewhere in the platform.

use rusqlite::{Connection, OptionalExtension};

use kickback_types::merchant::MerchantRule;
use kickback_types::MerchantId;

use crate::{DbError, Result};

/// Insert a merchant with its allow/block country lists.
pub fn insert(
    conn: &Connection,
    name: &str,
    allow_countries: &[String],
    block_countries: &[String],
) -> Result<MerchantId> {
    let allow_json = serde_json::to_string(allow_countries)
        .map_err(|e| DbError::Serialization(e.to_string()))?;
    let block_json = serde_json::to_string(block_countries)
        .map_err(|e| DbError::Serialization(e.to_string()))?;

    conn.execute(
        "INSERT INTO merchants (name, allow_countries, block_countries)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![name, allow_json, block_json],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Load one merchant rule.
pub fn get(conn: &Connection, merchant_id: MerchantId) -> Result<MerchantRule> {
    let row = conn
        .query_row(
            "SELECT id, name, allow_countries, block_countries FROM merchants WHERE id = ?1",
            [merchant_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| DbError::NotFound(format!("merchant {merchant_id}")))?;

    let (id, name, allow_json, block_json) = row;
    let allow_countries: Vec<String> = serde_json::from_str(&allow_json)
        .map_err(|e| DbError::Serialization(format!("allow_countries: {e}")))?;
    let block_countries: Vec<String> = serde_json::from_str(&block_json)
        .map_err(|e| DbError::Serialization(format!("block_countries: {e}")))?;

    Ok(MerchantRule {
        id,
        name,
        allow_countries,
        block_countries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_insert_and_get() {
        let conn = test_db();
        let id = insert(
            &conn,
            "US Electronics",
            &["US".to_string(), "CA".to_string()],
            &["PH".to_string()],
        )
        .expect("insert");

        let rule = get(&conn, id).expect("get");
        assert_eq!(rule.name, "US Electronics");
        assert_eq!(rule.allow_countries, vec!["US", "CA"]);
        assert_eq!(rule.block_countries, vec!["PH"]);
    }

    #[test]
    fn test_unrestricted_merchant() {
        let conn = test_db();
        let id = insert(&conn, "Worldwide", &[], &[]).expect("insert");
        let rule = get(&conn, id).expect("get");
        assert!(rule.allow_countries.is_empty());
        assert!(rule.block_countries.is_empty());
    }

    #[test]
    fn test_get_missing() {
        let conn = test_db();
        assert!(matches!(get(&conn, 5), Err(DbError::NotFound(_))));
    }
}
