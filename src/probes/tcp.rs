//! TCP connect probe.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::Config;
use crate::error::Error;

use super::traits::{Probe, ProbeKind, ProbeOutcome};

/// Times the TCP handshake to `host:port`; the connection is dropped right away.
pub struct TcpProbe {
    addr: String,
}

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self) -> Result<ProbeOutcome> {
        let stream = TcpStream::connect(&self.addr).await?;
        stream.set_nodelay(true)?;
        Ok(ProbeOutcome::Success)
    }
}

pub struct TcpKind;

impl ProbeKind for TcpKind {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn description(&self) -> &'static str {
        "TCP connect to host:port"
    }

    fn open(&self, target: &str, _config: &Config) -> Result<Arc<dyn Probe>> {
        let (host, port) = target
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidTarget(format!("'{}' is not host:port", target)))?;
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(Error::InvalidTarget(format!("'{}' is not host:port", target)).into());
        }
        Ok(Arc::new(TcpProbe {
            addr: target.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_requires_host_and_port() {
        let config = Config::default();
        assert!(TcpKind.open("127.0.0.1:80", &config).is_ok());
        assert!(TcpKind.open("localhost:443", &config).is_ok());
        assert!(TcpKind.open("localhost", &config).is_err());
        assert!(TcpKind.open(":80", &config).is_err());
        assert!(TcpKind.open("localhost:http", &config).is_err());
    }
}
