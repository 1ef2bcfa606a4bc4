pub mod config;
pub mod error;
pub mod stays;
pub mod telemetry;
