//! Device repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{Device, DeviceFields, DeviceListQuery, DevicePatch};

const DEVICE_COLUMNS: &str = "id, name, location, type, model, serial_number, owner";

/// Repository for device records.
///
/// Every write is a single statement, scoped by id and owner.
#[derive(Debug, Clone)]
pub struct DeviceRepository {
    pool: SqlitePool,
}

impl DeviceRepository {
    /// Create a new device repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a device owned by `owner`.
    #[instrument(skip(self, fields))]
    pub async fn insert(&self, owner: &str, fields: &DeviceFields) -> Result<Device> {
        let sql = format!(
            r#"
            INSERT INTO devices (name, location, type, model, serial_number, owner)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {DEVICE_COLUMNS}
            "#
        );

        let device = sqlx::query_as::<_, Device>(&sql)
            .bind(&fields.name)
            .bind(&fields.location)
            .bind(&fields.device_type)
            .bind(&fields.model)
            .bind(&fields.serial_number)
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .context("Failed to insert device")?;

        debug!(device_id = device.id, "Inserted device");
        Ok(device)
    }

    /// Get a device by ID, regardless of owner.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Device>> {
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM devices WHERE id = ?");

        let device = sqlx::query_as::<_, Device>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch device")?;

        Ok(device)
    }

    /// List devices owned by `owner`, narrowed by equality filters.
    ///
    /// `id` must already be parsed; the caller handles non-numeric ids.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        owner: &str,
        id: Option<i64>,
        query: &DeviceListQuery,
    ) -> Result<Vec<Device>> {
        let mut sql = format!("SELECT {DEVICE_COLUMNS} FROM devices WHERE owner = ?");

        if id.is_some() {
            sql.push_str(" AND id = ?");
        }

        let text_filters = query.text_filters();
        for (column, _) in &text_filters {
            sql.push_str(&format!(" AND {column} = ?"));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut query_builder = sqlx::query_as::<_, Device>(&sql).bind(owner);

        if let Some(id) = id {
            query_builder = query_builder.bind(id);
        }

        for (_, value) in &text_filters {
            query_builder = query_builder.bind(*value);
        }

        let devices = query_builder
            .fetch_all(&self.pool)
            .await
            .context("Failed to list devices")?;

        Ok(devices)
    }

    /// Overwrite all client-settable fields. Returns None if no row matched.
    #[instrument(skip(self, fields))]
    pub async fn replace(
        &self,
        id: i64,
        owner: &str,
        fields: &DeviceFields,
    ) -> Result<Option<Device>> {
        let sql = format!(
            r#"
            UPDATE devices
            SET name = ?, location = ?, type = ?, model = ?, serial_number = ?
            WHERE id = ? AND owner = ?
            RETURNING {DEVICE_COLUMNS}
            "#
        );

        let device = sqlx::query_as::<_, Device>(&sql)
            .bind(&fields.name)
            .bind(&fields.location)
            .bind(&fields.device_type)
            .bind(&fields.model)
            .bind(&fields.serial_number)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to replace device")?;

        Ok(device)
    }

    /// Overwrite only the supplied fields. Returns None if no row matched.
    #[instrument(skip(self, patch))]
    pub async fn patch(&self, id: i64, owner: &str, patch: &DevicePatch) -> Result<Option<Device>> {
        let mut updates = Vec::new();
        let mut values: Vec<&str> = Vec::new();

        if let Some(name) = &patch.name {
            updates.push("name = ?");
            values.push(name);
        }

        if let Some(location) = &patch.location {
            updates.push("location = ?");
            values.push(location);
        }

        if updates.is_empty() {
            return self.get_owned(id, owner).await;
        }

        let sql = format!(
            "UPDATE devices SET {} WHERE id = ? AND owner = ? RETURNING {DEVICE_COLUMNS}",
            updates.join(", ")
        );

        let mut query_builder = sqlx::query_as::<_, Device>(&sql);
        for value in values {
            query_builder = query_builder.bind(value);
        }

        let device = query_builder
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to patch device")?;

        Ok(device)
    }

    /// Delete a device. Returns false if no row matched.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64, owner: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM devices WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .context("Failed to delete device")?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every device.
    pub async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM devices")
            .execute(&self.pool)
            .await
            .context("Failed to clear devices")?;

        Ok(result.rows_affected())
    }

    async fn get_owned(&self, id: i64, owner: &str) -> Result<Option<Device>> {
        Ok(self.get(id).await?.filter(|d| d.owner == owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn fields(name: &str) -> DeviceFields {
        DeviceFields {
            name: name.to_string(),
            location: "Kitchen".to_string(),
            device_type: "Refrigerator".to_string(),
            model: "El Gee Mondo21".to_string(),
            serial_number: "LGM-20201".to_string(),
        }
    }

    async fn repo() -> DeviceRepository {
        let db = Database::in_memory().await.unwrap();
        DeviceRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let device = repo.insert("alice", &fields("Fridge")).await.unwrap();

        assert!(device.id > 0);
        assert_eq!(device.owner, "alice");
        assert_eq!(repo.get(device.id).await.unwrap(), Some(device));
        assert_eq!(repo.get(999_999_999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let repo = repo().await;
        let a = repo.insert("alice", &fields("A")).await.unwrap();
        let b = repo.insert("alice", &fields("B")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_list_scoped_and_filtered() {
        let repo = repo().await;
        let a = repo.insert("alice", &fields("A")).await.unwrap();
        repo.insert("alice", &fields("B")).await.unwrap();
        repo.insert("bob", &fields("A")).await.unwrap();

        let all = repo
            .list("alice", None, &DeviceListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|d| d.owner == "alice"));

        let query = DeviceListQuery {
            name: Some("A".to_string()),
            ..Default::default()
        };
        let named = repo.list("alice", None, &query).await.unwrap();
        assert_eq!(named, vec![a.clone()]);

        let by_id = repo
            .list("alice", Some(a.id), &DeviceListQuery::default())
            .await
            .unwrap();
        assert_eq!(by_id, vec![a.clone()]);

        let other_owner = repo
            .list("bob", Some(a.id), &DeviceListQuery::default())
            .await
            .unwrap();
        assert!(other_owner.is_empty());
    }

    #[tokio::test]
    async fn test_replace_scoped_by_owner() {
        let repo = repo().await;
        let device = repo.insert("alice", &fields("A")).await.unwrap();

        assert_eq!(
            repo.replace(device.id, "bob", &fields("Z")).await.unwrap(),
            None
        );

        let replaced = repo
            .replace(device.id, "alice", &fields("Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.id, device.id);
        assert_eq!(replaced.name, "Z");
        assert_eq!(replaced.owner, "alice");
    }

    #[tokio::test]
    async fn test_patch_only_touches_supplied_fields() {
        let repo = repo().await;
        let device = repo.insert("alice", &fields("A")).await.unwrap();

        let patch = DevicePatch {
            name: None,
            location: Some("Garage".to_string()),
        };
        let patched = repo.patch(device.id, "alice", &patch).await.unwrap().unwrap();
        assert_eq!(patched.name, "A");
        assert_eq!(patched.location, "Garage");
        assert_eq!(patched.model, device.model);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let device = repo.insert("alice", &fields("A")).await.unwrap();

        assert!(!repo.delete(device.id, "bob").await.unwrap());
        assert!(repo.delete(device.id, "alice").await.unwrap());
        assert!(!repo.delete(device.id, "alice").await.unwrap());
        assert_eq!(repo.get(device.id).await.unwrap(), None);
    }
}
