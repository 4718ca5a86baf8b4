use super::{ConfigSnafu, Result};

/// If the value begins with an '@', read the secret from the file path that
/// follows, otherwise return the value itself.
///
/// prefix names the setting in case of an error.
pub(crate) fn secret_or_file(value: &str, prefix: &str) -> Result<String> {
    let secret: String = match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| {
                ConfigSnafu {
                    message: format!("Failed to read secret from {path}: {err}"),
                    prefix,
                }
                .build()
            })?
            .trim()
            .into(),
        None => value.into(),
    };

    if secret.is_empty() {
        return ConfigSnafu {
            message: "Value must not be empty",
            prefix,
        }
        .fail();
    }
    Ok(secret)
}
