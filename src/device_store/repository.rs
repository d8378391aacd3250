//! Device store repository
//!
//! Database access layer for the device store: a single SQLite table
//! mapping registry IDs to record JSON.

use super::types::{DeviceRecord, StoreOp};
use crate::error::Result;
use sqlx::{Row, SqlitePool};

/// Durable registry-id to record mapping.
#[derive(Clone)]
pub struct DeviceStore {
    pool: SqlitePool,
}

impl DeviceStore {
    /// Create new store over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    const UPSERT_RECORD: &'static str = r#"
        INSERT INTO device_records (registry_id, record, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(registry_id) DO UPDATE SET
            record = excluded.record,
            updated_at = excluded.updated_at
    "#;

    /// Create the backing table if missing.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS device_records (
                registry_id TEXT PRIMARY KEY,
                record TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get one record by registry ID.
    pub async fn get(&self, registry_id: &str) -> Result<Option<DeviceRecord>> {
        let row = sqlx::query("SELECT record FROM device_records WHERE registry_id = ?")
            .bind(registry_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let json: String = row.get("record");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    /// Insert or replace one record.
    pub async fn set(&self, record: &DeviceRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;

        sqlx::query(Self::UPSERT_RECORD)
            .bind(&record.registry_id)
            .bind(&json)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete one record by registry ID. Deleting an absent key is a no-op.
    pub async fn delete(&self, registry_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM device_records WHERE registry_id = ?")
            .bind(registry_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Apply a sequence of mutations in one transaction.
    ///
    /// Enumeration in this process never observes a partial batch.
    pub async fn batch_apply(&self, operations: Vec<StoreOp>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for operation in operations {
            match operation {
                StoreOp::Set(record) => {
                    let json = serde_json::to_string(&record)?;
                    sqlx::query(Self::UPSERT_RECORD)
                        .bind(&record.registry_id)
                        .bind(&json)
                        .bind(chrono::Utc::now())
                        .execute(&mut *tx)
                        .await?;
                }
                StoreOp::Delete(registry_id) => {
                    sqlx::query("DELETE FROM device_records WHERE registry_id = ?")
                        .bind(&registry_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// All records, ordered by registry ID.
    pub async fn values(&self) -> Result<Vec<DeviceRecord>> {
        let rows = sqlx::query("SELECT record FROM device_records ORDER BY registry_id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let json: String = row.get("record");
                Ok(serde_json::from_str(&json)?)
            })
            .collect()
    }

    /// All registry IDs, ordered.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT registry_id FROM device_records ORDER BY registry_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("registry_id")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeDevice, DeviceDefinition, Expose};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> DeviceStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = DeviceStore::new(pool);
        store.init().await.unwrap();
        store
    }

    fn record(registry_id: &str, ieee_address: &str) -> DeviceRecord {
        DeviceRecord {
            registry_id: registry_id.to_string(),
            device: BridgeDevice {
                ieee_address: ieee_address.to_string(),
                friendly_name: format!("device_{}", ieee_address),
                power_source: None,
                supported: true,
                definition: Some(DeviceDefinition {
                    description: None,
                    exposes: vec![Expose::Binary {
                        property: "state".to_string(),
                        access: 7,
                        description: None,
                    }],
                }),
            },
        }
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = memory_store().await;
        store.set(&record("r1", "0x01")).await.unwrap();

        let loaded = store.get("r1").await.unwrap().unwrap();
        assert_eq!(loaded, record("r1", "0x01"));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = memory_store().await;
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_key() {
        let store = memory_store().await;
        store.set(&record("r1", "0x01")).await.unwrap();
        store.set(&record("r1", "0x02")).await.unwrap();

        let loaded = store.get("r1").await.unwrap().unwrap();
        assert_eq!(loaded.device.ieee_address, "0x02");
        assert_eq!(store.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = memory_store().await;
        store.set(&record("r1", "0x01")).await.unwrap();
        store.delete("r1").await.unwrap();

        assert!(store.get("r1").await.unwrap().is_none());
        // deleting again is a no-op
        store.delete("r1").await.unwrap();
    }

    #[tokio::test]
    async fn test_keys_and_values_enumerate_everything() {
        let store = memory_store().await;
        store.set(&record("b", "0x02")).await.unwrap();
        store.set(&record("a", "0x01")).await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);

        let values = store.values().await.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].registry_id, "a");
        assert_eq!(values[1].registry_id, "b");
    }

    #[tokio::test]
    async fn test_batch_apply_mixes_sets_and_deletes() {
        let store = memory_store().await;
        store.set(&record("stale", "0x0a")).await.unwrap();

        store
            .batch_apply(vec![
                StoreOp::Set(record("new1", "0x01")),
                StoreOp::Set(record("new2", "0x02")),
                StoreOp::Delete("stale".to_string()),
            ])
            .await
            .unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["new1", "new2"]);
    }

    #[tokio::test]
    async fn test_records_survive_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("devices.db").display()
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        let store = DeviceStore::new(pool.clone());
        store.init().await.unwrap();
        store.set(&record("r1", "0x01")).await.unwrap();
        pool.close().await;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        let store = DeviceStore::new(pool);
        let loaded = store.get("r1").await.unwrap().unwrap();
        assert_eq!(loaded.device.ieee_address, "0x01");
    }
}
