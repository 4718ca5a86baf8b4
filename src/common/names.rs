//! Conversions between zone-relative and fully-qualified names.
//!
//! Every name leaving this module is lowercased and carries no trailing dot.
//! The zone apex is represented by the empty relative name.

use super::{InvalidNameSnafu, Result};

/// Label accepted in declared records as an alias for the zone apex.
pub const APEX_LABEL: &str = "@";

/// Lowercase `name` and drop surrounding whitespace and one trailing dot.
pub fn normalize(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

/// Return `fqdn` relative to `origin`, or `""` if it is the apex itself.
pub fn trim(fqdn: &str, origin: &str) -> Result<String> {
    let fqdn_norm = normalize(fqdn);
    let origin_norm = normalize(origin);

    if fqdn_norm == origin_norm {
        return Ok(String::new());
    }

    match fqdn_norm.strip_suffix(&origin_norm) {
        Some(label) if !origin_norm.is_empty() && label.len() > 1 && label.ends_with('.') => {
            Ok(label[..label.len() - 1].to_string())
        }
        _ => InvalidNameSnafu {
            name: fqdn,
            origin,
        }
        .fail(),
    }
}

/// Join a relative name onto `origin`.
pub fn fqdn(name: &str, origin: &str) -> String {
    let name = normalize(name);
    let origin = normalize(origin);
    if name.is_empty() || name == APEX_LABEL {
        origin
    } else {
        format!("{name}.{origin}")
    }
}

/// Fully-qualified form of a declared name: names with a trailing dot are
/// already absolute, everything else is joined onto `origin`.
pub fn absolute(name: &str, origin: &str) -> String {
    if name.trim_end().ends_with('.') {
        normalize(name)
    } else {
        fqdn(name, origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    #[test]
    fn trim_subdomain() {
        assert_eq!(trim("www.example.com", "example.com").unwrap(), "www");
        assert_eq!(trim("a.b.example.com.", "example.com").unwrap(), "a.b");
        assert_eq!(trim("WWW.Example.COM", "example.com.").unwrap(), "www");
    }

    #[test]
    fn trim_apex() {
        assert_eq!(trim("example.com.", "example.com").unwrap(), "");
    }

    #[test]
    fn trim_foreign_name() {
        let err = trim("www.other.com", "example.com").unwrap_err();
        assert!(matches!(err, Error::InvalidNameError { .. }));
    }

    #[test]
    fn trim_requires_label_boundary() {
        // "badexample.com" ends with "example.com" but is not inside the zone
        assert!(trim("badexample.com", "example.com").is_err());
        assert!(trim(".example.com", "example.com").is_err());
    }

    #[test]
    fn fqdn_joins_origin() {
        assert_eq!(fqdn("www", "example.com."), "www.example.com");
        assert_eq!(fqdn("", "example.com"), "example.com");
        assert_eq!(fqdn("@", "Example.com"), "example.com");
    }

    #[test]
    fn absolute_keeps_trailing_dot_names() {
        assert_eq!(absolute("Mail.Other.com.", "example.com"), "mail.other.com");
        assert_eq!(absolute("mail", "example.com."), "mail.example.com");
        assert_eq!(absolute("@", "example.com"), "example.com");
    }
}
