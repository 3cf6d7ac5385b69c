//! HTTP probes built on a shared `reqwest` client.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Error;

use super::traits::{Probe, ProbeKind, ProbeOutcome};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Issues one request per invocation and reads the body to completion.
pub struct HttpProbe {
    client: Client,
    method: Method,
    url: Url,
    expect_status: Option<StatusCode>,
}

impl HttpProbe {
    pub fn new(method: Method, url: Url, config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        let expect_status = config
            .expect_status
            .map(StatusCode::from_u16)
            .transpose()
            .map_err(|e| Error::InvalidConfig(format!("expected status: {}", e)))?;

        Ok(Self {
            client,
            method,
            url,
            expect_status,
        })
    }

    fn accepts(&self, status: StatusCode) -> bool {
        match self.expect_status {
            Some(expected) => status == expected,
            None => status.is_success(),
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self) -> Result<ProbeOutcome> {
        let response = self
            .client
            .request(self.method.clone(), self.url.clone())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        tracing::trace!(%status, bytes = body.len(), "response received");

        if self.accepts(status) {
            Ok(ProbeOutcome::Success)
        } else {
            Ok(ProbeOutcome::Failure(format!("unexpected status {}", status)))
        }
    }
}

/// HTTP probe kind, one instance per request method.
pub struct HttpKind {
    name: &'static str,
    description: &'static str,
    method: Method,
}

impl HttpKind {
    pub fn get() -> Self {
        Self {
            name: "http",
            description: "HTTP GET, body read to completion",
            method: Method::GET,
        }
    }

    pub fn head() -> Self {
        Self {
            name: "head",
            description: "HTTP HEAD, headers only",
            method: Method::HEAD,
        }
    }
}

impl ProbeKind for HttpKind {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn open(&self, target: &str, config: &Config) -> Result<Arc<dyn Probe>> {
        let url = parse_url(target)?;
        Ok(Arc::new(HttpProbe::new(self.method.clone(), url, config)?))
    }
}

fn parse_url(target: &str) -> Result<Url, Error> {
    let url = Url::parse(target)
        .map_err(|e| Error::InvalidTarget(format!("'{}' is not a URL: {}", target, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidTarget(format!(
            "unsupported scheme '{}' in '{}'",
            scheme, target
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_accepts_http_and_https() {
        assert!(parse_url("http://localhost:8080/health").is_ok());
        assert!(parse_url("https://example.com").is_ok());
    }

    #[test]
    fn test_parse_url_rejects_other_targets() {
        assert!(matches!(
            parse_url("ftp://example.com"),
            Err(Error::InvalidTarget(_))
        ));
        assert!(matches!(parse_url("example.com"), Err(Error::InvalidTarget(_))));
    }

    #[test]
    fn test_expected_status() {
        let mut config = Config::default();
        let url = parse_url("http://localhost").unwrap();

        let probe = HttpProbe::new(Method::GET, url.clone(), &config).unwrap();
        assert!(probe.accepts(StatusCode::OK));
        assert!(probe.accepts(StatusCode::NO_CONTENT));
        assert!(!probe.accepts(StatusCode::NOT_FOUND));

        config.expect_status = Some(404);
        let probe = HttpProbe::new(Method::GET, url, &config).unwrap();
        assert!(probe.accepts(StatusCode::NOT_FOUND));
        assert!(!probe.accepts(StatusCode::OK));
    }
}
