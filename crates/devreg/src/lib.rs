//! Devreg library crate.
//!
//! Multi-tenant registry of smart-home devices behind a small REST API.
//! The binary in `main.rs` wires configuration and logging around it.

pub mod api;
pub mod auth;
pub mod db;
pub mod device;
