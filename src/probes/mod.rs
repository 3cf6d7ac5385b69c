//! Probe implementations.

mod http;
mod tcp;
mod traits;

use http::HttpKind;
use tcp::TcpKind;
pub use traits::{Probe, ProbeKind, ProbeOutcome, ProbeRegistry};

/// Create a registry with all available probe kinds.
pub fn create_registry() -> ProbeRegistry {
    let mut registry = ProbeRegistry::new();
    registry.register(std::sync::Arc::new(HttpKind::get()));
    registry.register(std::sync::Arc::new(HttpKind::head()));
    registry.register(std::sync::Arc::new(TcpKind));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = create_registry();
        assert_eq!(registry.available(), vec!["http", "head", "tcp"]);
        assert_eq!(registry.get("head").unwrap().name(), "head");
        assert!(registry.get("udp").is_none());
    }
}
