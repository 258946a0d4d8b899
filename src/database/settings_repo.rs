// Settings repository
// The single `default` row that records the persistence mode

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::http_request::{Settings, DEFAULT_SETTINGS_ID};
use super::DatabaseManager;

impl DatabaseManager {
    /// Read the settings row, creating it with `use_database = true` if it is missing
    pub fn get_or_create_settings(&self) -> Result<Settings> {
        self.with_connection(get_or_create_settings_impl)
    }

    /// Upsert the persistence mode
    pub fn set_use_database(&self, use_database: bool) -> Result<Settings> {
        self.with_connection(|conn| {
            set_use_database_impl(conn, use_database)
        })
    }
}

fn get_or_create_settings_impl(conn: &Connection) -> Result<Settings> {
    // a concurrent creator makes this a no-op instead of a duplicate
    conn.execute(
        "INSERT OR IGNORE INTO app_settings (id, use_database) VALUES (?1, 1)",
        params![DEFAULT_SETTINGS_ID],
    ).context("Failed to create settings")?;

    read_settings(conn)
}

fn set_use_database_impl(conn: &Connection, use_database: bool) -> Result<Settings> {
    conn.execute(
        r#"
        INSERT INTO app_settings (id, use_database)
        VALUES (?1, ?2)
        ON CONFLICT(id) DO UPDATE SET
            use_database = excluded.use_database
        "#,
        params![DEFAULT_SETTINGS_ID, use_database],
    ).context("Failed to update settings")?;

    read_settings(conn)
}

fn read_settings(conn: &Connection) -> Result<Settings> {
    conn.query_row(
        "SELECT id, use_database FROM app_settings WHERE id = ?",
        params![DEFAULT_SETTINGS_ID],
        |row| {
            Ok(Settings {
                id: row.get(0)?,
                use_database: row.get(1)?,
            })
        },
    ).context("Failed to fetch settings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn create_test_db() -> (TempDir, DatabaseManager) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = DatabaseManager::new(db_path).unwrap();
        (dir, db)
    }

    fn settings_rows(db: &DatabaseManager) -> i32 {
        db.with_connection(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM app_settings", [], |row| row.get(0))?)
        }).unwrap()
    }

    #[test]
    fn test_settings_created_lazily() {
        let (_dir, db) = create_test_db();
        assert_eq!(settings_rows(&db), 0);

        let settings = db.get_or_create_settings().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings_rows(&db), 1);
    }

    #[test]
    fn test_get_settings_is_idempotent() {
        let (_dir, db) = create_test_db();

        let first = db.get_or_create_settings().unwrap();
        let second = db.get_or_create_settings().unwrap();
        assert_eq!(first, second);
        assert_eq!(settings_rows(&db), 1);
    }

    #[test]
    fn test_update_upserts() {
        let (_dir, db) = create_test_db();

        let settings = db.set_use_database(false).unwrap();
        assert!(!settings.use_database);
        assert_eq!(settings.id, DEFAULT_SETTINGS_ID);

        assert!(!db.get_or_create_settings().unwrap().use_database);
        assert!(db.set_use_database(true).unwrap().use_database);
        assert_eq!(settings_rows(&db), 1);
    }
}
