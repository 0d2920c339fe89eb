//! Residential society management: location reference data, the maintenance
//! category catalog, properties, and maintenance requests.
//!
//! Each area exposes a repository trait over the document store, a state holder
//! ("desk" or "board") that tracks per-operation [`response::Response`] values,
//! and an axum router.

pub mod catalog;
pub mod config;
pub mod error;
pub mod location;
pub mod maintenance;
pub mod property;
pub mod response;
pub mod session;
pub mod telemetry;
pub mod users;
