// Owns the SQLite connection that the repositories run against

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::migrations;

/// Database manager that owns the SQLite connection
pub struct DatabaseManager {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DatabaseManager {
    /// Open (or create) the database at the specified path and bring the schema up to date
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create database directory")?;
            }
        }

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        migrations::run_migrations(&conn)
            .context("Failed to run database migrations")?;

        log::debug!("Database initialized at: {:?}", db_path);

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Execute a function with access to the database connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock database connection: {}", e))?;
        f(&conn)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_creation() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("test.db");

        let manager = DatabaseManager::new(db_path.clone()).unwrap();
        assert!(db_path.exists());
        assert_eq!(manager.db_path(), db_path.as_path());

        manager.with_connection(|conn| {
            let count: i32 = conn.query_row(
                "SELECT COUNT(*) FROM saved_request",
                [],
                |row| row.get(0),
            )?;
            assert_eq!(count, 0);
            Ok(())
        }).unwrap();
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let manager = DatabaseManager::new(db_path.clone()).unwrap();
            manager.set_use_database(false).unwrap();
        }

        let manager = DatabaseManager::new(db_path).unwrap();
        assert!(!manager.get_or_create_settings().unwrap().use_database);
    }
}
