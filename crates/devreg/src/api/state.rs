//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::auth::AuthState;
use crate::device::DeviceService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Device service for registry operations.
    pub devices: Arc<DeviceService>,
    /// Authentication state.
    pub auth: AuthState,
    /// When the server started, for `/status/`.
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state.
    pub fn new(devices: DeviceService, auth: AuthState) -> Self {
        Self {
            devices: Arc::new(devices),
            auth,
            started_at: Instant::now(),
        }
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
