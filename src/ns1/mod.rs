mod config;
mod models;
mod provider;

pub use config::*;
pub use provider::*;

use crate::common::{ConfigSnafu, Provider, ProviderRegistry, Result};

pub const PROVIDER_NAME: &str = "NS1";

fn create(config: &crate::Config) -> Result<Box<dyn Provider>> {
    let Some(cfg) = &config.ns1 else {
        return ConfigSnafu {
            message: "NS1 settings are required",
            prefix: "ns1",
        }
        .fail();
    };
    Ok(Box::new(Ns1Provider::new(cfg)?))
}

pub fn register(registry: &mut ProviderRegistry) {
    registry.register("ns1", Box::new(create));
}
