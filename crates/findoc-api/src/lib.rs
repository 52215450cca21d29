//! Axum HTTP surface for the financial document analyzer.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
