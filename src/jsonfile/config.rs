use std::path::PathBuf;

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// Declared zones.
    pub source: Option<PathBuf>,

    /// Zone state used by the file provider.
    pub state: Option<PathBuf>,

    /// Nameservers reported for every zone.
    #[serde(default)]
    pub nameservers: Vec<String>,
}
