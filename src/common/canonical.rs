use super::{
    names, DeclaredRecord, Error, InvalidTtlSnafu, ProviderRecord, RecordConfig, Result, Ttl, ZeroTtl,
};

/// Output of canonicalizing a fetched zone.
#[derive(Debug, Default)]
pub struct Canonicalized {
    pub records: Vec<RecordConfig>,
    /// Records which could not be related to the zone, excluded from the diff.
    pub rejected: Vec<Error>,
    /// Name and type of every rejected record.
    pub rejected_groups: Vec<(String, String)>,
}

/// Brings declared and fetched records into one comparable shape for a zone.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    origin: String,
    zero_ttl: ZeroTtl,
    default_ttl: Ttl,
}

impl Canonicalizer {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            zero_ttl: ZeroTtl::default(),
            default_ttl: Ttl::ZoneDefault,
        }
    }

    pub fn zero_ttl(mut self, zero_ttl: ZeroTtl) -> Self {
        self.zero_ttl = zero_ttl;
        self
    }

    /// TTL given to declared records which do not set one.
    pub fn default_ttl(mut self, ttl: Ttl) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn resolve_ttl(&self, secs: u32, name: &str, kind: &str) -> Result<Ttl> {
        match (Ttl::seconds(secs), self.zero_ttl) {
            (Some(ttl), _) => Ok(ttl),
            (None, ZeroTtl::ZoneDefault) => Ok(Ttl::ZoneDefault),
            (None, ZeroTtl::Reject) => InvalidTtlSnafu { name, kind }.fail(),
        }
    }

    /// Expand a provider record into one canonical record per answer.
    pub fn canonicalize(&self, record: &ProviderRecord) -> Result<Vec<RecordConfig>> {
        let ttl = self.resolve_ttl(record.ttl, &record.domain, &record.kind)?;
        record
            .answers
            .iter()
            .map(|answer| {
                RecordConfig::from_answer(&record.domain, &self.origin, &record.kind, ttl, answer)
            })
            .collect()
    }

    pub fn canonicalize_zone(&self, records: &[ProviderRecord]) -> Canonicalized {
        let mut out = Canonicalized::default();
        for record in records {
            match self.canonicalize(record) {
                Ok(expanded) => out.records.extend(expanded),
                Err(err) => {
                    tracing::warn!(
                        zone = self.origin,
                        name = record.domain,
                        kind = record.kind,
                        "Excluding provider record: {err}"
                    );
                    out.rejected.push(err);
                    out.rejected_groups.push((
                        names::normalize(&record.domain),
                        record.kind.trim().to_ascii_uppercase(),
                    ));
                }
            }
        }
        out
    }

    /// Build the desired-side record for a declaration, inlining its
    /// structured fields.
    pub fn declared(&self, record: &DeclaredRecord) -> Result<RecordConfig> {
        let ttl = match record.ttl {
            Some(secs) => self.resolve_ttl(secs, &record.name, &record.kind)?,
            None => self.default_ttl,
        };

        let mut rec = RecordConfig::new(&record.name, &self.origin, &record.kind, ttl, &record.target)?;
        if let Some(priority) = record.priority {
            rec = rec.with_priority(priority);
        }
        if let Some(weight) = record.weight {
            rec = rec.with_weight(weight);
        }
        if let Some(port) = record.port {
            rec = rec.with_port(port);
        }
        rec.inline_priority()
    }
}
