//! Wallet balance probe
//!
//! Issues one authenticated balance request against a wallet service and
//! diagnoses the outcome.
//!
//! This crate provides:
//! - Environment-driven probe configuration
//! - A transport seam with a reqwest implementation
//! - The probe itself, with best-effort CORS failure classification

pub mod client;
pub mod config;
pub mod error;
pub mod probe;

pub use config::ProbeConfig;
pub use error::ProbeError;
pub use probe::{run_probe, Probe, ProbeResponse};
