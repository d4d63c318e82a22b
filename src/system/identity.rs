//! Instance identity
//!
//! The `instance` grouping label is the host name, suffixed with the worker
//! id when the process runs as one worker of a multi-process model.

use sysinfo::System;

const FALLBACK_HOSTNAME: &str = "localhost";

/// Host name from the OS, then `$HOSTNAME`, then `localhost`.
pub fn hostname() -> String {
    System::host_name()
        .filter(|h| !h.trim().is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.trim().is_empty()))
        .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string())
}

pub fn instance_name(worker_id: Option<&str>) -> String {
    instance_name_for(&hostname(), worker_id)
}

/// `<host>-<worker>` for workers, bare `<host>` otherwise.
pub fn instance_name_for(host: &str, worker_id: Option<&str>) -> String {
    match worker_id.map(str::trim).filter(|w| !w.is_empty()) {
        Some(worker) => format!("{}-{}", host, worker),
        None => host.to_string(),
    }
}
