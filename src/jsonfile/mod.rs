mod config;
mod models;
mod provider;
mod source;

pub use config::*;
pub use provider::*;
pub use source::*;

use crate::common::{ConfigSnafu, Provider, ProviderRegistry, Result};

fn create(config: &crate::Config) -> Result<Box<dyn Provider>> {
    match &config.jsonfile {
        Some(Config {
            state: Some(state),
            nameservers,
            ..
        }) => Ok(Box::new(
            JsonFileProvider::new(state).with_nameservers(nameservers.clone()),
        )),
        _ => ConfigSnafu {
            message: "a state file is required",
            prefix: "jsonfile.state",
        }
        .fail(),
    }
}

pub fn register(registry: &mut ProviderRegistry) {
    registry.register("jsonfile", Box::new(create));
}
