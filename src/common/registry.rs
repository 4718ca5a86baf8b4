//! Provider registry.
//!
//! Built once at start-up and handed by reference to whatever needs to turn
//! configuration into a provider. There is no global registration.

use std::collections::BTreeMap;

use super::{ConfigSnafu, Provider, Result};
use crate::Config;

/// Constructs a provider from configuration.
pub trait ProviderFactory {
    fn create(&self, config: &Config) -> Result<Box<dyn Provider>>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&Config) -> Result<Box<dyn Provider>>,
{
    fn create(&self, config: &Config) -> Result<Box<dyn Provider>> {
        self(config)
    }
}

#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, Box<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every provider shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::ns1::register(&mut registry);
        crate::jsonfile::register(&mut registry);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: Box<dyn ProviderFactory>) {
        let name = name.into().to_ascii_lowercase();
        if self.factories.insert(name.clone(), factory).is_some() {
            tracing::warn!(provider = name, "Replaced existing provider registration");
        }
    }

    pub fn create(&self, name: &str, config: &Config) -> Result<Box<dyn Provider>> {
        match self.factories.get(&name.to_ascii_lowercase()) {
            Some(factory) => factory.create(config),
            None => ConfigSnafu {
                message: format!(
                    "Unknown provider {name}, expected one of: {}",
                    self.names().join(", ")
                ),
                prefix: "provider",
            }
            .fail(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Correction, Error, ProviderRecord};

    struct NullProvider;

    impl Provider for NullProvider {
        fn name(&self) -> &str {
            "null"
        }

        fn fetch_zone(&mut self, _zone: &str) -> Result<Vec<ProviderRecord>> {
            Ok(Vec::new())
        }

        fn apply_correction(&mut self, _zone: &str, _correction: &Correction) -> Result<()> {
            Ok(())
        }
    }

    fn null_factory(_config: &Config) -> Result<Box<dyn Provider>> {
        Ok(Box::new(NullProvider))
    }

    #[test]
    fn registration() {
        let mut registry = ProviderRegistry::new();
        assert!(!registry.contains("null"));

        registry.register("Null", Box::new(null_factory));
        assert!(registry.contains("null"));
        assert_eq!(registry.names(), vec!["null"]);

        let provider = registry.create("NULL", &Config::default()).unwrap();
        assert_eq!(provider.name(), "null");
    }

    #[test]
    fn unknown_provider() {
        let registry = ProviderRegistry::with_builtin();
        assert_eq!(registry.names(), vec!["jsonfile", "ns1"]);

        let err = registry.create("route53", &Config::default()).err().unwrap();
        assert!(matches!(err, Error::ConfigError { .. }));
    }
}
