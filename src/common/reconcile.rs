use std::collections::BTreeSet;

use super::{
    build_corrections, names, Canonicalizer, Correction, DeclaredRecord, Differ, Error, ProviderRecord,
    RecordConfig, Result, Ttl, ZeroTtl,
};

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// TTL for declared records which do not set one.
    pub default_ttl: Ttl,
    pub zero_ttl: ZeroTtl,
    pub pair_changed_targets: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            default_ttl: Ttl::seconds(crate::DEFAULT_TTL).unwrap_or(Ttl::ZoneDefault),
            zero_ttl: ZeroTtl::default(),
            pair_changed_targets: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Reconciliation {
    pub corrections: Vec<Correction>,
    pub unchanged: Vec<RecordConfig>,
    /// Declared or fetched records excluded from the diff.
    pub rejected: Vec<Error>,
}

/// Work out the corrections that converge `fetched` to `declared` for the
/// zone `origin`.
///
/// Records which cannot be related to the zone are excluded and returned in
/// [`Reconciliation::rejected`]; every other error fails the whole zone before
/// any correction is produced.
///
/// A rejected record leaves its whole name and type untouched: neither the
/// declared nor the live records of that group are compared, so a bad
/// declaration never turns into a delete of what is live.
pub fn reconcile(
    origin: &str,
    declared: &[DeclaredRecord],
    fetched: &[ProviderRecord],
    options: &ReconcileOptions,
) -> Result<Reconciliation> {
    let canon = Canonicalizer::new(origin)
        .zero_ttl(options.zero_ttl)
        .default_ttl(options.default_ttl);

    let mut rejected = Vec::new();
    let mut held: BTreeSet<(String, String)> = BTreeSet::new();
    let mut desired = Vec::with_capacity(declared.len());
    for record in declared {
        match canon.declared(record) {
            Ok(rec) => desired.push(rec),
            Err(err) if err.is_record_error() => {
                tracing::warn!(
                    zone = origin,
                    name = record.name,
                    kind = record.kind,
                    "Excluding declared record: {err}"
                );
                rejected.push(err);
                held.insert((
                    names::absolute(&record.name, origin),
                    record.kind.trim().to_ascii_uppercase(),
                ));
            }
            Err(err) => return Err(err),
        }
    }

    let mut actual = canon.canonicalize_zone(fetched);
    rejected.extend(actual.rejected);
    held.extend(actual.rejected_groups);

    if !held.is_empty() {
        let is_held = |rec: &RecordConfig| {
            let (name, kind) = rec.group();
            held.contains(&(name.to_string(), kind.to_string()))
        };
        desired.retain(|rec| !is_held(rec));
        actual.records.retain(|rec| !is_held(rec));
        for (name, kind) in &held {
            tracing::warn!(
                zone = origin,
                name = name,
                kind = kind,
                "Leaving record group untouched"
            );
        }
    }

    let diff = Differ::new()
        .pair_changed_targets(options.pair_changed_targets)
        .diff(&desired, &actual.records)?;

    tracing::debug!(
        zone = origin,
        unchanged = diff.unchanged.len(),
        create = diff.create.len(),
        delete = diff.delete.len(),
        modify = diff.modify.len(),
        "Computed diff",
    );

    Ok(Reconciliation {
        corrections: build_corrections(&diff),
        unchanged: diff.unchanged,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Action;

    fn declared(name: &str, kind: &str, ttl: u32, target: &str) -> DeclaredRecord {
        DeclaredRecord {
            name: name.into(),
            kind: kind.into(),
            ttl: Some(ttl),
            target: target.into(),
            priority: None,
            weight: None,
            port: None,
        }
    }

    fn fetched(domain: &str, kind: &str, ttl: u32, answers: &[&str]) -> ProviderRecord {
        ProviderRecord {
            domain: domain.into(),
            kind: kind.into(),
            ttl,
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn converged_zone_needs_no_corrections() {
        let mut mx = declared("", "MX", 3600, "mx1.example.com.");
        mx.priority = Some(10);
        let declared = vec![declared("", "A", 300, "1.2.3.4"), mx];
        let fetched = vec![
            fetched("example.com", "A", 300, &["1.2.3.4"]),
            fetched("example.com", "MX", 3600, &["10 mx1.example.com"]),
        ];

        let out = reconcile("example.com", &declared, &fetched, &Default::default()).unwrap();
        assert!(out.corrections.is_empty());
        assert_eq!(out.unchanged.len(), 2);
        assert_eq!(out.unchanged[0].name_fqdn(), "example.com");
    }

    #[test]
    fn ttl_only_change() {
        let out = reconcile(
            "example.com",
            &[declared("www", "A", 300, "1.2.3.4")],
            &[fetched("www.example.com", "A", 600, &["1.2.3.4"])],
            &Default::default(),
        )
        .unwrap();

        assert_eq!(out.corrections.len(), 1);
        assert_eq!(out.corrections[0].action(), Action::Modify);
    }

    #[test]
    fn foreign_records_are_reported() {
        let out = reconcile(
            "example.com",
            &[declared("www.other.com.", "A", 300, "1.2.3.4")],
            &[fetched("www.other.com", "A", 300, &["1.2.3.4"])],
            &Default::default(),
        )
        .unwrap();

        assert!(out.corrections.is_empty());
        assert_eq!(out.rejected.len(), 2);
    }

    #[test]
    fn rejected_declaration_keeps_live_record() {
        let out = reconcile(
            "example.com",
            &[
                declared("www", "A", 0, "1.2.3.4"),
                declared("api", "A", 300, "10.0.0.1"),
            ],
            &[
                fetched("www.example.com", "A", 300, &["1.2.3.4", "1.2.3.5"]),
                fetched("api.example.com", "A", 300, &["10.0.0.1"]),
            ],
            &Default::default(),
        )
        .unwrap();

        assert!(out.corrections.is_empty());
        assert_eq!(out.unchanged.len(), 1);
        assert_eq!(out.rejected.len(), 1);
        assert!(matches!(out.rejected[0], Error::InvalidTtlError { .. }));
    }

    #[test]
    fn rejected_live_record_is_not_recreated() {
        let out = reconcile(
            "example.com",
            &[declared("www", "A", 300, "1.2.3.4")],
            &[fetched("www.example.com", "A", 0, &["1.2.3.4"])],
            &Default::default(),
        )
        .unwrap();

        assert!(out.corrections.is_empty());
        assert_eq!(out.rejected.len(), 1);
    }

    #[test]
    fn malformed_address_keeps_live_record() {
        let out = reconcile(
            "example.com",
            &[declared("www", "A", 300, "1.2.3")],
            &[fetched("www.example.com", "A", 300, &["1.2.3.4"])],
            &Default::default(),
        )
        .unwrap();

        assert!(out.corrections.is_empty());
        assert!(matches!(out.rejected[0], Error::InvalidTargetError { .. }));
    }

    #[test]
    fn duplicates_abort_the_zone() {
        let err = reconcile(
            "example.com",
            &[
                declared("www", "A", 300, "1.2.3.4"),
                declared("www", "A", 300, "1.2.3.4"),
            ],
            &[],
            &Default::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateRecordError { .. }));
    }
}
