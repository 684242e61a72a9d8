//! Device records.
//!
//! Provides the device model, payload validation, the SQLite repository and
//! the owner-scoped service used by the HTTP handlers, plus sample data.

mod models;
mod report;
mod repository;
pub mod seed;
mod service;
pub mod validation;

pub use models::{
    DEVICE_FIELDS, Device, DeviceFields, DeviceList, DeviceListQuery, DevicePatch,
    PATCHABLE_FIELDS,
};
pub use report::DeviceReport;
pub use repository::DeviceRepository;
pub use service::{DeviceError, DeviceResult, DeviceService};
pub use validation::ValidationError;
