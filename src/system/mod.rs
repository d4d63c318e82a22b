//! System-level modules
//!
//! - Instance identity for push grouping labels
//! - Logging initialization

pub mod identity;
pub mod logging;
