#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// TTL for declared records which do not set one.
    pub default_ttl: u32,

    /// Treat a changed target under the same name and type as a modification.
    pub pair_changed_targets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: crate::DEFAULT_TTL,
            pair_changed_targets: false,
        }
    }
}
