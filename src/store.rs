//! Document store seam
//!
//! The tracker persists JSON documents addressed by slash-separated paths
//! (`users/{uid}/logs/{id}`). Document paths have an even number of
//! segments, collection paths an odd number. Stores are constructed
//! explicitly and handed to the service that uses them.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Document paths for a user's data
pub mod paths {
    pub fn user_prefix(uid: &str) -> String {
        format!("users/{}/", uid)
    }

    pub fn profile(uid: &str) -> String {
        format!("users/{}/profile/data", uid)
    }

    pub fn muscle_recovery(uid: &str) -> String {
        format!("users/{}/state/muscle_recovery", uid)
    }

    pub fn logs(uid: &str) -> String {
        format!("users/{}/logs", uid)
    }

    pub fn log(uid: &str, log_id: &str) -> String {
        format!("users/{}/logs/{}", uid, log_id)
    }

    pub fn exercises(uid: &str) -> String {
        format!("users/{}/exercises", uid)
    }

    pub fn exercise(uid: &str, exercise_id: &str) -> String {
        format!("users/{}/exercises/{}", uid, exercise_id)
    }
}

/// Key-value contract over JSON documents
pub trait DocumentStore {
    /// Fetch a document
    fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Create or fully replace a document
    fn set(&self, path: &str, value: &Value) -> Result<()>;

    /// Shallow-merge the fields of `patch` into an object document, creating it if absent
    fn merge(&self, path: &str, patch: &Value) -> Result<()>;

    /// Remove a document, returning whether it existed
    fn delete(&self, path: &str) -> Result<bool>;

    /// Documents directly inside `collection` as `(id, body)`, ordered by id
    fn list(&self, collection: &str) -> Result<Vec<(String, Value)>>;

    /// Remove every document whose path starts with `prefix`
    fn delete_prefix(&self, prefix: &str) -> Result<usize>;
}

/// Split a document path into its parent collection and id
fn split_document_path(path: &str) -> Result<(&str, &str)> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 || segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidPath {
            path: path.to_string(),
        }
        .into());
    }
    // rsplit_once cannot fail once there are at least two segments
    path.rsplit_once('/').ok_or_else(|| {
        StoreError::InvalidPath {
            path: path.to_string(),
        }
        .into()
    })
}

fn validate_collection_path(path: &str) -> Result<()> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() % 2 != 1 || segments.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidPath {
            path: path.to_string(),
        }
        .into());
    }
    Ok(())
}

fn merge_object(path: &str, existing: Option<Value>, patch: &Value) -> Result<Value> {
    let not_object = || StoreError::NotObject {
        path: path.to_string(),
    };
    let patch = patch.as_object().ok_or_else(not_object)?;
    let mut merged = match existing {
        Some(Value::Object(map)) => map,
        Some(_) => return Err(not_object().into()),
        None => Map::new(),
    };
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(merged))
}

/// In-process store, used by tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Value>>> {
        self.documents.lock().map_err(|_| StoreError::Poisoned.into())
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, path: &str) -> Result<Option<Value>> {
        split_document_path(path)?;
        Ok(self.documents()?.get(path).cloned())
    }

    fn set(&self, path: &str, value: &Value) -> Result<()> {
        split_document_path(path)?;
        self.documents()?.insert(path.to_string(), value.clone());
        Ok(())
    }

    fn merge(&self, path: &str, patch: &Value) -> Result<()> {
        split_document_path(path)?;
        let mut documents = self.documents()?;
        let merged = merge_object(path, documents.get(path).cloned(), patch)?;
        documents.insert(path.to_string(), merged);
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<bool> {
        split_document_path(path)?;
        Ok(self.documents()?.remove(path).is_some())
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        validate_collection_path(collection)?;
        let prefix = format!("{}/", collection);
        Ok(self
            .documents()?
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter_map(|(path, value)| {
                let id = &path[prefix.len()..];
                (!id.contains('/')).then(|| (id.to_string(), value.clone()))
            })
            .collect())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let mut documents = self.documents()?;
        let before = documents.len();
        documents.retain(|path, _| !path.starts_with(prefix));
        Ok(before - documents.len())
    }
}

/// SQLite-backed store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create or open a database at the specified path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Private database that lives as long as the store
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                path TEXT PRIMARY KEY,
                parent TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_parent ON documents(parent)",
            [],
        )?;
        Ok(())
    }

    fn write(&self, path: &str, parent: &str, value: &Value) -> Result<()> {
        let body = serde_json::to_string(value)?;
        self.conn.execute(
            r#"
            INSERT INTO documents (path, parent, body, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(path) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
            params![path, parent, body, Utc::now().to_rfc3339()],
        )?;
        debug!(path, "Document written");
        Ok(())
    }
}

fn decode(path: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| {
        StoreError::Serialization(format!("{}: {}", path, e)).into()
    })
}

impl DocumentStore for SqliteStore {
    fn get(&self, path: &str) -> Result<Option<Value>> {
        split_document_path(path)?;
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|body| decode(path, &body)).transpose()
    }

    fn set(&self, path: &str, value: &Value) -> Result<()> {
        let (parent, _) = split_document_path(path)?;
        self.write(path, parent, value)
    }

    fn merge(&self, path: &str, patch: &Value) -> Result<()> {
        let (parent, _) = split_document_path(path)?;
        let merged = merge_object(path, self.get(path)?, patch)?;
        self.write(path, parent, &merged)
    }

    fn delete(&self, path: &str) -> Result<bool> {
        split_document_path(path)?;
        let removed = self
            .conn
            .execute("DELETE FROM documents WHERE path = ?1", params![path])?;
        Ok(removed > 0)
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        validate_collection_path(collection)?;
        let mut stmt = self
            .conn
            .prepare("SELECT path, body FROM documents WHERE parent = ?1 ORDER BY path")?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (path, body) = row?;
            let id = path
                .rsplit_once('/')
                .map(|(_, id)| id.to_string())
                .unwrap_or_else(|| path.clone());
            documents.push((id, decode(&path, &body)?));
        }
        Ok(documents)
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE substr(path, 1, length(?1)) = ?1",
            params![prefix],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exercise_store(store: &dyn DocumentStore) {
        let path = paths::profile("u1");
        assert_eq!(store.get(&path).unwrap(), None);

        store.set(&path, &json!({"goal": "cut", "bmr": 1933})).unwrap();
        assert_eq!(store.get(&path).unwrap(), Some(json!({"goal": "cut", "bmr": 1933})));

        store.merge(&path, &json!({"goal": "bulk", "tdee": 2320})).unwrap();
        assert_eq!(
            store.get(&path).unwrap(),
            Some(json!({"goal": "bulk", "bmr": 1933, "tdee": 2320}))
        );

        store.set(&paths::log("u1", "b"), &json!({"n": 2})).unwrap();
        store.set(&paths::log("u1", "a"), &json!({"n": 1})).unwrap();
        store.set(&paths::log("u2", "c"), &json!({"n": 3})).unwrap();

        let logs = store.list(&paths::logs("u1")).unwrap();
        let ids: Vec<&str> = logs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(store.delete(&paths::log("u1", "a")).unwrap());
        assert!(!store.delete(&paths::log("u1", "a")).unwrap());

        assert_eq!(store.delete_prefix(&paths::user_prefix("u1")).unwrap(), 2);
        assert_eq!(store.get(&path).unwrap(), None);
        assert_eq!(store.list(&paths::logs("u2")).unwrap().len(), 1);
    }

    #[test]
    fn test_memory_store_contract() {
        exercise_store(&MemoryStore::new());
    }

    #[test]
    fn test_sqlite_store_contract() {
        exercise_store(&SqliteStore::in_memory().unwrap());
    }

    #[test]
    fn test_sqlite_store_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("fitlab.db");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.set(&paths::muscle_recovery("u1"), &json!({"chest": "2024-03-10T12:00:00.000Z"})).unwrap();
        }

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            store.get(&paths::muscle_recovery("u1")).unwrap(),
            Some(json!({"chest": "2024-03-10T12:00:00.000Z"}))
        );
    }

    #[test]
    fn test_invalid_paths_rejected() {
        let store = MemoryStore::new();
        assert!(store.get("users").is_err());
        assert!(store.get("users/u1/logs").is_err());
        assert!(store.set("users//profile/data", &json!({})).is_err());
        assert!(store.list("users/u1").is_err());
    }

    #[test]
    fn test_merge_requires_objects() {
        let store = MemoryStore::new();
        let path = paths::muscle_recovery("u1");
        assert!(store.merge(&path, &json!("not an object")).is_err());

        store.set(&path, &json!([1, 2])).unwrap();
        assert!(store.merge(&path, &json!({"chest": "x"})).is_err());
    }
}
