//! Sample data for fresh installations.

use anyhow::Result;
use tracing::info;

use super::models::{Device, DeviceFields};
use super::repository::DeviceRepository;

fn fields(name: &str, location: &str, device_type: &str, model: &str, serial: &str) -> DeviceFields {
    DeviceFields {
        name: name.to_string(),
        location: location.to_string(),
        device_type: device_type.to_string(),
        model: model.to_string(),
        serial_number: serial.to_string(),
    }
}

/// The sample devices and their owners.
pub fn sample_devices() -> Vec<(&'static str, DeviceFields)> {
    vec![
        (
            "pythonista",
            fields(
                "Front Porch Light",
                "Front Porch",
                "Light Switch",
                "GenLight 64B",
                "GL64B-99987",
            ),
        ),
        (
            "pythonista",
            fields(
                "Main Thermostat",
                "Living Room",
                "Thermostat",
                "ThermoBest 3G",
                "TB3G-12345",
            ),
        ),
        (
            "engineer",
            fields(
                "Family Fridge",
                "Kitchen",
                "Refrigerator",
                "El Gee Mondo21",
                "LGM-20201",
            ),
        ),
    ]
}

/// Remove every device and insert the samples.
pub async fn reseed(repo: &DeviceRepository) -> Result<Vec<Device>> {
    let removed = repo.clear().await?;

    let mut devices = Vec::new();
    for (owner, fields) in sample_devices() {
        devices.push(repo.insert(owner, &fields).await?);
    }

    info!(removed, inserted = devices.len(), "Seeded device registry");
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::device::DeviceListQuery;

    #[tokio::test]
    async fn test_reseed_replaces_existing_rows() {
        let db = Database::in_memory().await.unwrap();
        let repo = DeviceRepository::new(db.pool().clone());

        repo.insert("alice", &fields("Old", "Attic", "Fan", "F1", "F-1"))
            .await
            .unwrap();

        let devices = reseed(&repo).await.unwrap();
        assert_eq!(devices.len(), 3);

        let alice = repo
            .list("alice", None, &DeviceListQuery::default())
            .await
            .unwrap();
        assert!(alice.is_empty());

        let pythonista = repo
            .list("pythonista", None, &DeviceListQuery::default())
            .await
            .unwrap();
        assert_eq!(pythonista.len(), 2);
        assert_eq!(pythonista[1].name, "Main Thermostat");

        // Running twice leaves exactly one copy.
        reseed(&repo).await.unwrap();
        let engineer = repo
            .list("engineer", None, &DeviceListQuery::default())
            .await
            .unwrap();
        assert_eq!(engineer.len(), 1);
    }
}
