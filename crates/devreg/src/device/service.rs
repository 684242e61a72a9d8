//! Device service: ownership checks and validation around the repository.

use thiserror::Error;
use tracing::{info, instrument};

use crate::auth::{Principal, guard};

use super::models::{Device, DeviceListQuery};
use super::report::DeviceReport;
use super::repository::DeviceRepository;
use super::validation::{self, ValidationError};

/// Device operation failures.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device {0} not found")]
    NotFound(i64),

    #[error("device {0} is owned by another user")]
    Forbidden(i64),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Orchestrates device operations for an authenticated principal.
///
/// Per-device operations run lookup, ownership check, validation and the
/// write in that order; the first failure stops the operation.
#[derive(Debug, Clone)]
pub struct DeviceService {
    repo: DeviceRepository,
}

impl DeviceService {
    /// Create a new device service.
    pub fn new(repo: DeviceRepository) -> Self {
        Self { repo }
    }

    /// List the principal's devices matching `query`.
    #[instrument(skip(self, principal), fields(principal = %principal))]
    pub async fn list(
        &self,
        principal: &Principal,
        query: &DeviceListQuery,
    ) -> DeviceResult<Vec<Device>> {
        let id = match query.id.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => return Ok(Vec::new()),
            },
        };

        Ok(self.repo.list(principal.as_str(), id, query).await?)
    }

    /// Get one device.
    #[instrument(skip(self, principal), fields(principal = %principal))]
    pub async fn get(&self, principal: &Principal, id: i64) -> DeviceResult<Device> {
        self.find_owned(principal, id).await
    }

    /// Create a device owned by the principal from a raw JSON body.
    #[instrument(skip(self, principal, body), fields(principal = %principal))]
    pub async fn create(&self, principal: &Principal, body: &[u8]) -> DeviceResult<Device> {
        let payload = validation::parse_payload(body)?;
        let fields = validation::validate_full(&payload)?;

        let device = self.repo.insert(principal.as_str(), &fields).await?;
        info!(device_id = device.id, owner = %device.owner, "Created device");

        Ok(device)
    }

    /// Replace all client-settable fields of a device.
    #[instrument(skip(self, principal, body), fields(principal = %principal))]
    pub async fn replace(&self, principal: &Principal, id: i64, body: &[u8]) -> DeviceResult<Device> {
        self.find_owned(principal, id).await?;

        let payload = validation::parse_payload(body)?;
        let fields = validation::validate_full(&payload)?;

        let device = self
            .repo
            .replace(id, principal.as_str(), &fields)
            .await?
            .ok_or(DeviceError::NotFound(id))?;
        info!(device_id = id, "Replaced device");

        Ok(device)
    }

    /// Update `name` and/or `location` of a device.
    #[instrument(skip(self, principal, body), fields(principal = %principal))]
    pub async fn patch(&self, principal: &Principal, id: i64, body: &[u8]) -> DeviceResult<Device> {
        self.find_owned(principal, id).await?;

        let payload = validation::parse_payload(body)?;
        let patch = validation::validate_partial(&payload)?;

        let device = self
            .repo
            .patch(id, principal.as_str(), &patch)
            .await?
            .ok_or(DeviceError::NotFound(id))?;
        info!(device_id = id, "Patched device");

        Ok(device)
    }

    /// Delete a device.
    #[instrument(skip(self, principal), fields(principal = %principal))]
    pub async fn delete(&self, principal: &Principal, id: i64) -> DeviceResult<()> {
        self.find_owned(principal, id).await?;

        if !self.repo.delete(id, principal.as_str()).await? {
            return Err(DeviceError::NotFound(id));
        }
        info!(device_id = id, "Deleted device");

        Ok(())
    }

    /// Render the text report of a device.
    #[instrument(skip(self, principal), fields(principal = %principal))]
    pub async fn report(&self, principal: &Principal, id: i64) -> DeviceResult<DeviceReport> {
        let device = self.find_owned(principal, id).await?;
        Ok(DeviceReport::new(&device))
    }

    /// Look up a device and apply the ownership guard.
    async fn find_owned(&self, principal: &Principal, id: i64) -> DeviceResult<Device> {
        let device = self.repo.get(id).await?.ok_or(DeviceError::NotFound(id))?;

        if !guard::check(principal, &device.owner).is_allowed() {
            return Err(DeviceError::Forbidden(id));
        }

        Ok(device)
    }
}
