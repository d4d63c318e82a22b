use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use url::Url;

/// Content type sent to the gateway.
pub const PUSH_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Value of the `TTL` header on every push.
pub const PUSH_TTL_SECONDS: u32 = 10;

/// One delivery attempt's worth of data. Built per tick, dropped after.
#[derive(Debug, Clone)]
pub struct PushJob {
    pub job: String,
    /// Grouping labels in path order.
    pub grouping: Vec<(String, String)>,
    pub payload: Vec<u8>,
}

impl PushJob {
    pub fn new(job: impl Into<String>, grouping: Vec<(String, String)>, payload: Vec<u8>) -> Self {
        Self {
            job: job.into(),
            grouping,
            payload,
        }
    }

    /// `/metrics/job/<job>/<label>/<value>...`
    pub fn path(&self) -> String {
        let mut path = format!("/metrics/{}", path_segment("job", &self.job));
        for (label, value) in &self.grouping {
            path.push('/');
            path.push_str(&path_segment(label, value));
        }
        path
    }

    pub fn url(&self, gateway: &Url) -> String {
        format!("{}{}", gateway.as_str().trim_end_matches('/'), self.path())
    }
}

/// Values that cannot travel as a plain path segment use the gateway's
/// `<label>@base64/<value>` form; an empty value is written as `=`.
fn path_segment(label: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{}@base64/=", label)
    } else if value.contains('/') {
        format!("{}@base64/{}", label, URL_SAFE.encode(value))
    } else {
        format!("{}/{}", label, urlencoding::encode(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(instance: &str) -> PushJob {
        PushJob::new(
            "api",
            vec![
                ("instance".into(), instance.into()),
                ("installation_domain".into(), "app.example.com".into()),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn builds_plain_path() {
        assert_eq!(
            job("web-1").path(),
            "/metrics/job/api/instance/web-1/installation_domain/app.example.com"
        );
    }

    #[test]
    fn percent_encodes_values() {
        assert_eq!(
            job("web 1").path(),
            "/metrics/job/api/instance/web%201/installation_domain/app.example.com"
        );
    }

    #[test]
    fn slash_and_empty_use_base64() {
        assert!(job("a/b").path().contains("/instance@base64/YS9i/"));
        assert!(job("").path().contains("/instance@base64/=/"));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let gateway = Url::parse("http://gateway:9091/").unwrap();
        assert_eq!(
            job("web-1").url(&gateway),
            "http://gateway:9091/metrics/job/api/instance/web-1/installation_domain/app.example.com"
        );

        let prefixed = Url::parse("http://gateway:9091/pg").unwrap();
        assert!(job("web-1").url(&prefixed).starts_with("http://gateway:9091/pg/metrics/job/api"));
    }
}
