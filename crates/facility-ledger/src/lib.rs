//! Facility ledger: resident stay periods and enrollment-day accounting used
//! for monthly billing, plus the service plumbing around it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
