//! Configuration value checks

use url::Url;

use crate::errors::{MetricsError, Result};

/// Parse `value` as an absolute http(s) URL.
pub fn validate_http_url(option: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| {
        MetricsError::configuration(format!("{} = '{}' is not a valid URL: {}", option, value, e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(MetricsError::configuration(format!(
                "{} must use http or https, got '{}'",
                option, other
            )));
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(MetricsError::configuration(format!(
            "{} = '{}' has no host",
            option, value
        )));
    }
    Ok(url)
}

/// Mount paths are absolute route paths like `/metrics`.
pub fn validate_mount_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(MetricsError::configuration(format!(
            "METRICS_MOUNT_PATH must start with '/', got '{}'",
            path
        )));
    }
    if path.contains(char::is_whitespace) {
        return Err(MetricsError::configuration(format!(
            "METRICS_MOUNT_PATH must not contain whitespace, got '{}'",
            path
        )));
    }
    Ok(())
}

/// Options that become mandatory once a push gateway is set.
pub(crate) fn require<'a>(option: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| {
        MetricsError::configuration(format!(
            "{} is required when PUSH_GATEWAY_URL is set",
            option
        ))
    })
}
