//! SQLite-backed store and entry operations.
//!
//! Each entry write is a single UPSERT, so concurrent writers for the same key
//! resolve as last writer wins and a reader never sees a partial entry.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::store::{CacheEntry, CacheStorage, StoreHandle};
use crate::Error;
use crate::http::RequestKey;

const UPSERT_ENTRY: &str = "INSERT INTO entries (
        store, key_hash, method, url, status, headers_json, body, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(store, key_hash) DO UPDATE SET
        method = excluded.method,
        url = excluded.url,
        status = excluded.status,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

/// Row form of a [`CacheEntry`], encoded before entering the connection thread.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: i64,
    headers_json: String,
    body: Vec<u8>,
    stored_at: String,
}

impl EntryRow {
    fn encode(entry: &CacheEntry) -> Result<Self, Error> {
        Ok(Self {
            key_hash: entry.key.hash(),
            method: entry.key.method.clone(),
            url: entry.key.url.clone(),
            status: i64::from(entry.status),
            headers_json: serde_json::to_string(&entry.headers)?,
            body: entry.body.to_vec(),
            stored_at: entry.stored_at.clone(),
        })
    }

    fn insert(&self, conn: &rusqlite::Connection, store: &str) -> Result<(), rusqlite::Error> {
        conn.execute(
            UPSERT_ENTRY,
            params![
                store,
                &self.key_hash,
                &self.method,
                &self.url,
                self.status,
                &self.headers_json,
                &self.body,
                &self.stored_at,
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<StoreHandle, Error> {
        let store = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO stores (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
                    params![store, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;
        Ok(StoreHandle::new(name))
    }

    async fn get(&self, store: &StoreHandle, key: &RequestKey) -> Result<Option<CacheEntry>, Error> {
        let store = store.name().to_string();
        let key = key.clone();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, headers_json, body, stored_at
                    FROM entries WHERE store = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key.hash()], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                });

                match result {
                    Ok((status, headers_json, body, stored_at)) => Ok(Some(CacheEntry {
                        key,
                        status: u16::try_from(status)
                            .map_err(|_| Error::Serialization(format!("stored status out of range: {status}")))?,
                        headers: serde_json::from_str(&headers_json)?,
                        body: body.into(),
                        stored_at,
                    })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, store: &StoreHandle, entry: &CacheEntry) -> Result<(), Error> {
        let store = store.name().to_string();
        let row = EntryRow::encode(entry)?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                row.insert(conn, &store)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, store: &StoreHandle, entries: &[CacheEntry]) -> Result<(), Error> {
        let store = store.name().to_string();
        let rows = entries.iter().map(EntryRow::encode).collect::<Result<Vec<_>, _>>()?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    row.insert(&tx, &store)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, store: &StoreHandle, key: &RequestKey) -> Result<bool, Error> {
        let store = store.name().to_string();
        let key_hash = key.hash();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count =
                    conn.execute("DELETE FROM entries WHERE store = ?1 AND key_hash = ?2", params![store, key_hash])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn entry_count(&self, store: &StoreHandle) -> Result<u64, Error> {
        let store = store.name().to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store = ?1", params![store], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
