#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// API key, or `@path` to read it from a file.
    pub api_key: String,

    pub base_url: Option<url::Url>,
}
