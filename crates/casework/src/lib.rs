//! Domain services for the case-management backend: client records, case
//! assignments, and the intervention-outcome recommendation engine.

pub mod assessment;
pub mod clients;
pub mod config;
pub mod error;
pub mod telemetry;
