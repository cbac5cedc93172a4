//! Loan origination workflow: application intake, credit assessment, and approval.

pub mod applications;
pub mod config;
pub mod error;
pub mod telemetry;
