use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::num::NonZeroU32;

use snafu::ensure;

use super::{names, Correction, DoubleInlineSnafu, InvalidTargetSnafu, MissingFieldSnafu, Result};

pub const RECORD_KIND_A: &str = "A";
pub const RECORD_KIND_AAAA: &str = "AAAA";
pub const RECORD_KIND_CNAME: &str = "CNAME";
pub const RECORD_KIND_MX: &str = "MX";
pub const RECORD_KIND_SRV: &str = "SRV";
pub const RECORD_KIND_TXT: &str = "TXT";

/// Types whose target is a single host name.
pub(crate) const HOST_TARGET_KINDS: &[&str] = &["CNAME", "NS", "PTR", "ALIAS", "ANAME", "DNAME"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// The provider applies its zone-wide default.
    ZoneDefault,
    Seconds(NonZeroU32),
}

impl Ttl {
    pub fn seconds(secs: u32) -> Option<Self> {
        NonZeroU32::new(secs).map(Ttl::Seconds)
    }

    /// Wire value, where providers use zero for the zone default.
    pub fn as_secs(&self) -> u32 {
        match self {
            Ttl::ZoneDefault => 0,
            Ttl::Seconds(secs) => secs.get(),
        }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::ZoneDefault => f.write_str("default"),
            Ttl::Seconds(secs) => write!(f, "{secs}"),
        }
    }
}

/// How a zero TTL coming from a provider or a declaration is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroTtl {
    ZoneDefault,
    #[default]
    Reject,
}

/// A canonical DNS record.
///
/// Constructed once per reconciliation pass. The only transform is
/// [`RecordConfig::inline_priority`], which folds MX and SRV fields into the
/// target and must run exactly once before the record is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordConfig {
    name: String,
    name_fqdn: String,
    kind: String,
    ttl: Ttl,
    target: String,
    priority: Option<u16>,
    weight: Option<u16>,
    port: Option<u16>,
    inlined: bool,
}

impl RecordConfig {
    /// Build a desired-side record.
    ///
    /// `name` is relative to `origin`; `""` and `"@"` denote the apex, and a
    /// name with a trailing dot is treated as absolute and must lie inside the
    /// zone. A and AAAA targets must be addresses of the matching family.
    pub fn new(name: &str, origin: &str, kind: &str, ttl: Ttl, target: &str) -> Result<Self> {
        let name = if name.trim_end().ends_with('.') {
            names::trim(name, origin)?
        } else {
            let name = names::normalize(name);
            if name == names::APEX_LABEL {
                String::new()
            } else {
                name
            }
        };
        let kind = kind.trim().to_ascii_uppercase();
        let target = if has_structured_fields(&kind) {
            target.trim().to_string()
        } else {
            canonical_target(&kind, target)
        };
        let name_fqdn = names::fqdn(&name, origin);
        check_address(&name_fqdn, &kind, &target)?;

        Ok(Self {
            name_fqdn,
            name,
            kind,
            ttl,
            target,
            priority: None,
            weight: None,
            port: None,
            inlined: false,
        })
    }

    /// Build an actual-side record from one answer of a provider record.
    /// Provider answers already carry the inlined encoding.
    pub fn from_answer(fqdn: &str, origin: &str, kind: &str, ttl: Ttl, answer: &str) -> Result<Self> {
        let name = names::trim(fqdn, origin)?;
        let kind = kind.trim().to_ascii_uppercase();
        let name_fqdn = names::fqdn(&name, origin);
        let target = canonical_target(&kind, answer);
        check_address(&name_fqdn, &kind, &target)?;
        Ok(Self {
            name_fqdn,
            name,
            target,
            kind,
            ttl,
            priority: None,
            weight: None,
            port: None,
            inlined: true,
        })
    }

    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Fold the structured fields of MX and SRV records into the target,
    /// using the same encoding providers report (`"10 mx1.example.com"`,
    /// `"10 5 5060 sip.example.com"`).
    pub fn inline_priority(mut self) -> Result<Self> {
        if self.inlined {
            return DoubleInlineSnafu {
                name: self.name_fqdn,
                kind: self.kind,
            }
            .fail();
        }

        let encoded = match self.kind.as_str() {
            RECORD_KIND_MX => {
                let priority = self.require(self.priority, "priority")?;
                Some(format!("{priority} {}", self.target))
            }
            RECORD_KIND_SRV => {
                let priority = self.require(self.priority, "priority")?;
                let weight = self.require(self.weight, "weight")?;
                let port = self.require(self.port, "port")?;
                Some(format!("{priority} {weight} {port} {}", self.target))
            }
            _ => None,
        };

        if let Some(encoded) = encoded {
            self.target = canonical_target(&self.kind, &encoded);
        }
        self.priority = None;
        self.weight = None;
        self.port = None;
        self.inlined = true;
        Ok(self)
    }

    fn require(&self, value: Option<u16>, field: &'static str) -> Result<u16> {
        value.ok_or_else(|| {
            MissingFieldSnafu {
                name: self.name_fqdn.as_str(),
                kind: self.kind.as_str(),
                field,
            }
            .build()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_fqdn(&self) -> &str {
        &self.name_fqdn
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn priority(&self) -> Option<u16> {
        self.priority
    }

    pub fn is_inlined(&self) -> bool {
        self.inlined
    }

    /// Whether this record has to be inlined before comparison.
    pub fn needs_inlining(&self) -> bool {
        !self.inlined && has_structured_fields(&self.kind)
    }

    /// Identity key: two records with equal keys are the same DNS entry.
    pub fn key(&self) -> RecordKey<'_> {
        RecordKey {
            name_fqdn: &self.name_fqdn,
            kind: &self.kind,
            target: &self.target,
        }
    }

    /// Grouping key shared by all answers of one name and type.
    pub fn group(&self) -> (&str, &str) {
        (&self.name_fqdn, &self.kind)
    }
}

impl fmt::Display for RecordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name_fqdn, self.kind, self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey<'a> {
    pub name_fqdn: &'a str,
    pub kind: &'a str,
    pub target: &'a str,
}

pub(crate) fn has_structured_fields(kind: &str) -> bool {
    kind == RECORD_KIND_MX || kind == RECORD_KIND_SRV
}

fn check_address(name_fqdn: &str, kind: &str, target: &str) -> Result<()> {
    let valid = match kind {
        RECORD_KIND_A => target.parse::<Ipv4Addr>().is_ok(),
        RECORD_KIND_AAAA => target.parse::<Ipv6Addr>().is_ok(),
        _ => true,
    };
    ensure!(
        valid,
        InvalidTargetSnafu {
            name: name_fqdn,
            kind,
            target,
        }
    );
    Ok(())
}

/// Normal form of a target so that equal payloads compare equal as strings.
pub(crate) fn canonical_target(kind: &str, target: &str) -> String {
    let target = target.trim();
    match kind {
        RECORD_KIND_A | RECORD_KIND_AAAA => match target.parse::<std::net::IpAddr>() {
            Ok(ip) => ip.to_string(),
            Err(_) => target.to_string(),
        },
        RECORD_KIND_MX | RECORD_KIND_SRV => {
            let mut fields: Vec<String> = target.split_whitespace().map(str::to_string).collect();
            if let Some(host) = fields.last_mut() {
                *host = names::normalize(host);
            }
            fields.join(" ")
        }
        kind if HOST_TARGET_KINDS.contains(&kind) => names::normalize(target),
        _ => target.to_string(),
    }
}

/// A record as reported by a provider: one name and type, one or many
/// answers sharing a TTL.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProviderRecord {
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ttl: u32,
    pub answers: Vec<String>,
}

/// A record as written in declared configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeclaredRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeclaredZone {
    pub name: String,
    #[serde(default)]
    pub records: Vec<DeclaredRecord>,
}

/// Supplies the declared state of every managed zone.
pub trait Source {
    fn name(&self) -> &str;
    fn read_zones(&self) -> super::Result<Vec<DeclaredZone>>;
}

/// An authoritative DNS provider.
///
/// Providers only fetch and apply; deciding what to change is left to
/// [`reconcile`](super::reconcile()), and retrying is left to whoever runs the sync.
pub trait Provider {
    fn name(&self) -> &str;

    fn zero_ttl(&self) -> ZeroTtl {
        ZeroTtl::Reject
    }

    fn fetch_zone(&mut self, zone: &str) -> super::Result<Vec<ProviderRecord>>;

    /// Nameservers the provider serves `zone` from, if it reports any.
    fn nameservers(&mut self, _zone: &str) -> super::Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn apply_correction(&mut self, zone: &str, correction: &Correction) -> super::Result<()>;
}
