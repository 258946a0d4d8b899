// Saved request repository
// Create, list and delete request presets

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use crate::http_request::{NewSavedRequest, SavedRequest};
use super::DatabaseManager;

impl DatabaseManager {
    /// All saved requests, newest first
    pub fn list_saved_requests(&self) -> Result<Vec<SavedRequest>> {
        self.with_connection(list_saved_requests_impl)
    }

    /// Insert a request; the id and creation time are assigned here
    pub fn create_saved_request(&self, request: &NewSavedRequest) -> Result<SavedRequest> {
        self.with_connection(|conn| {
            create_saved_request_impl(conn, request)
        })
    }

    /// Returns false when no row had the given id
    pub fn delete_saved_request(&self, id: &str) -> Result<bool> {
        self.with_connection(|conn| {
            delete_saved_request_impl(conn, id)
        })
    }
}

fn row_to_saved_request(row: &Row<'_>) -> rusqlite::Result<SavedRequest> {
    Ok(SavedRequest {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        method: row.get(3)?,
        headers: row.get(4)?,
        body: row.get(5)?,
        created_at: Some(row.get(6)?),
    })
}

fn list_saved_requests_impl(conn: &Connection) -> Result<Vec<SavedRequest>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, name, url, method, headers, body, created_at
        FROM saved_request
        ORDER BY created_at DESC, rowid DESC
        "#
    ).context("Failed to prepare list_saved_requests query")?;

    let requests = stmt.query_map([], row_to_saved_request)
        .context("Failed to query saved requests")?;

    requests.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to fetch requests")
}

fn create_saved_request_impl(conn: &Connection, request: &NewSavedRequest) -> Result<SavedRequest> {
    let saved = request.clone().into_saved(Uuid::new_v4().to_string(), Some(Utc::now()));

    conn.execute(
        r#"
        INSERT INTO saved_request (id, name, url, method, headers, body, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            saved.id,
            saved.name,
            saved.url,
            saved.method,
            saved.headers,
            saved.body,
            saved.created_at,
        ],
    ).context("Failed to create request")?;

    log::debug!("Inserted saved request {}", saved.id);
    Ok(saved)
}

fn delete_saved_request_impl(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM saved_request WHERE id = ?",
        params![id],
    ).context("Failed to delete request")?;

    Ok(deleted > 0)
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

    fn new_request(name: &str) -> NewSavedRequest {
        NewSavedRequest {
            name: name.to_string(),
            url: "https://sandbox.array.io/api/user/v2".to_string(),
            method: "POST".to_string(),
            headers: "Content-Type: application/json; charset=utf-8".to_string(),
            body: "{\"firstName\": \"THOMAS\"}".to_string(),
        }
    }

    #[test]
    fn test_create_assigns_id_and_timestamp() {
        let (_dir, db) = create_test_db();

        let saved = db.create_saved_request(&new_request("Create User")).unwrap();
        assert!(Uuid::parse_str(&saved.id).is_ok());
        assert!(saved.created_at.is_some());
        assert_eq!(saved.to_new(), new_request("Create User"));
    }

    #[test]
    fn test_list_is_newest_first() {
        let (_dir, db) = create_test_db();

        db.create_saved_request(&new_request("first")).unwrap();
        db.create_saved_request(&new_request("second")).unwrap();
        db.create_saved_request(&new_request("third")).unwrap();

        let names: Vec<String> = db.list_saved_requests().unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_list_round_trips_fields() {
        let (_dir, db) = create_test_db();

        let saved = db.create_saved_request(&new_request("Order Credit Report")).unwrap();
        let listed = db.list_saved_requests().unwrap();
        assert_eq!(listed, vec![saved]);
    }

    #[test]
    fn test_delete_reports_missing_rows() {
        let (_dir, db) = create_test_db();

        let saved = db.create_saved_request(&new_request("gone")).unwrap();
        assert!(db.delete_saved_request(&saved.id).unwrap());
        assert!(!db.delete_saved_request(&saved.id).unwrap());
        assert!(db.list_saved_requests().unwrap().is_empty());
    }
}
