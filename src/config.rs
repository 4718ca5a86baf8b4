use crate::common::{ConfigSnafu, ProviderRegistry, Result};
use crate::jsonfile::JsonFileSource;
use crate::service::ZoneSync;

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// Registered name of the provider to converge.
    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub sync: crate::service::Config,

    pub jsonfile: Option<crate::jsonfile::Config>,
    pub ns1: Option<crate::ns1::Config>,
}

impl Config {
    pub fn get_service(self, registry: &ProviderRegistry) -> Result<ZoneSync> {
        let source = match self.jsonfile.as_ref().and_then(|cfg| cfg.source.clone()) {
            Some(path) => JsonFileSource::new(path),
            None => {
                return ConfigSnafu {
                    message: "a declared zones file is required",
                    prefix: "jsonfile.source",
                }
                .fail()
            }
        };

        if self.provider.is_empty() {
            return ConfigSnafu {
                message: format!("no provider selected, expected one of: {}", registry.names().join(", ")),
                prefix: "provider",
            }
            .fail();
        }
        let provider = registry.create(&self.provider, &self)?;

        Ok(ZoneSync::new(self.sync, Box::new(source), provider))
    }
}
