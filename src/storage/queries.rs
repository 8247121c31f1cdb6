use crate::error::{AppError, Result};
use crate::storage::models::DeliveryConfig;
use rusqlite::{params, Connection, OptionalExtension};

// Config queries

pub fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM config WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

pub fn set_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO config (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        params![key, value],
    )?;
    Ok(())
}

/// Load the delivery credentials, trimming surrounding whitespace.
///
/// Fails with `ConfigMissing` naming every absent or blank key, so the
/// status message can tell the user what to fix.
pub fn load_delivery_config(conn: &Connection) -> Result<DeliveryConfig> {
    let mut missing = Vec::new();
    let mut fetch = |key: &'static str| -> Result<String> {
        let value = get_value(conn, key)?
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        if value.is_empty() {
            missing.push(key);
        }
        Ok(value)
    };

    let gemini_key = fetch("gemini_key")?;
    let telegram_token = fetch("telegram_token")?;
    let chat_id = fetch("chat_id")?;

    if !missing.is_empty() {
        return Err(AppError::ConfigMissing(missing.join(", ")));
    }

    Ok(DeliveryConfig {
        gemini_key,
        telegram_token,
        chat_id,
    })
}

// Log buffer queries

pub fn get_log_buffer(conn: &Connection) -> Result<String> {
    let buffer = conn.query_row("SELECT buffer FROM logs WHERE id = 1", [], |row| {
        row.get(0)
    })?;
    Ok(buffer)
}

pub fn set_log_buffer(conn: &Connection, buffer: &str) -> Result<()> {
    conn.execute("UPDATE logs SET buffer = ?1 WHERE id = 1", [buffer])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Store;

    #[test]
    fn test_value_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_conn(|conn| {
                assert!(get_value(conn, "gemini_key").unwrap().is_none());
                set_value(conn, "gemini_key", "abc")?;
                set_value(conn, "gemini_key", "def")?;
                assert_eq!(get_value(conn, "gemini_key").unwrap().as_deref(), Some("def"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_load_delivery_config_reports_missing_keys() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .with_conn(|conn| {
                set_value(conn, "gemini_key", "  key  ")?;
                set_value(conn, "chat_id", "   ")?;
                load_delivery_config(conn)
            })
            .unwrap_err();

        match err {
            crate::error::AppError::ConfigMissing(keys) => {
                assert_eq!(keys, "telegram_token, chat_id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_delivery_config_trims_values() {
        let store = Store::open_in_memory().unwrap();
        let config = store
            .with_conn(|conn| {
                set_value(conn, "gemini_key", " key ")?;
                set_value(conn, "telegram_token", "token\n")?;
                set_value(conn, "chat_id", "42")?;
                load_delivery_config(conn)
            })
            .unwrap();

        assert_eq!(config.gemini_key, "key");
        assert_eq!(config.telegram_token, "token");
        assert_eq!(config.chat_id, "42");
    }

    #[test]
    fn test_log_buffer_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_conn(|conn| {
                assert_eq!(get_log_buffer(conn).unwrap(), "");
                set_log_buffer(conn, "[12:00:00] hello\n")?;
                assert_eq!(get_log_buffer(conn).unwrap(), "[12:00:00] hello\n");
                Ok(())
            })
            .unwrap();
    }
}
