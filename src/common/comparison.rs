use std::collections::{HashMap, HashSet};

use super::{
    DuplicateRecordSnafu, MixedTtlSnafu, NotInlinedSnafu, RecordConfig, RecordKey, Result, Ttl,
};

/// A record whose identity is kept but whose payload changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub desired: RecordConfig,
    pub existing: RecordConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub unchanged: Vec<RecordConfig>,
    pub create: Vec<RecordConfig>,
    pub delete: Vec<RecordConfig>,
    pub modify: Vec<Modification>,
}

impl Diff {
    /// Number of changes, excluding unchanged records.
    pub fn len(&self) -> usize {
        self.create.len() + self.delete.len() + self.modify.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Differ {
    pair_changed_targets: bool,
}

impl Differ {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair leftover records sharing a name and type into modifications
    /// instead of a delete and a create.
    pub fn pair_changed_targets(mut self, enabled: bool) -> Self {
        self.pair_changed_targets = enabled;
        self
    }

    /// Partition `desired` and `actual` into unchanged, create, delete and
    /// modify.
    ///
    /// Create, modify and unchanged follow the order of `desired`; delete
    /// follows the order of `actual`.
    pub fn diff(&self, desired: &[RecordConfig], actual: &[RecordConfig]) -> Result<Diff> {
        check_duplicates(desired)?;
        check_group_ttls(desired)?;
        check_inlined(desired)?;
        check_inlined(actual)?;

        // Identity key -> unmatched actual indices, in input order
        let mut by_key: HashMap<RecordKey, Vec<usize>> = HashMap::with_capacity(actual.len());
        for (idx, record) in actual.iter().enumerate().rev() {
            by_key.entry(record.key()).or_default().push(idx);
        }

        let mut matched = vec![false; actual.len()];
        let mut unchanged = Vec::new();
        let mut modify: Vec<(usize, Modification)> = Vec::new();
        let mut leftover: Vec<usize> = Vec::new();

        for (d_idx, record) in desired.iter().enumerate() {
            match by_key.get_mut(&record.key()).and_then(Vec::pop) {
                Some(a_idx) => {
                    matched[a_idx] = true;
                    let existing = &actual[a_idx];
                    if existing.ttl() == record.ttl() {
                        unchanged.push(record.clone());
                    } else {
                        modify.push((
                            d_idx,
                            Modification {
                                desired: record.clone(),
                                existing: existing.clone(),
                            },
                        ));
                    }
                }
                None => leftover.push(d_idx),
            }
        }

        let mut create = Vec::new();
        if self.pair_changed_targets {
            for d_idx in leftover {
                let record = &desired[d_idx];
                let partner = actual
                    .iter()
                    .enumerate()
                    .position(|(a_idx, existing)| !matched[a_idx] && existing.group() == record.group());
                match partner {
                    Some(a_idx) => {
                        matched[a_idx] = true;
                        modify.push((
                            d_idx,
                            Modification {
                                desired: record.clone(),
                                existing: actual[a_idx].clone(),
                            },
                        ));
                    }
                    None => create.push(record.clone()),
                }
            }
        } else {
            create.extend(leftover.into_iter().map(|d_idx| desired[d_idx].clone()));
        }

        let delete = actual
            .iter()
            .zip(matched)
            .filter_map(|(record, matched)| (!matched).then(|| record.clone()))
            .collect();

        modify.sort_by_key(|(d_idx, _)| *d_idx);

        Ok(Diff {
            unchanged,
            create,
            delete,
            modify: modify.into_iter().map(|(_, m)| m).collect(),
        })
    }
}

/// Diff with the default [`Differ`].
pub fn diff_records(desired: &[RecordConfig], actual: &[RecordConfig]) -> Result<Diff> {
    Differ::new().diff(desired, actual)
}

fn check_duplicates(desired: &[RecordConfig]) -> Result<()> {
    let mut seen = HashSet::with_capacity(desired.len());
    for record in desired {
        if !seen.insert(record.key()) {
            return DuplicateRecordSnafu {
                name: record.name_fqdn(),
                kind: record.kind(),
                target: record.target(),
            }
            .fail();
        }
    }
    Ok(())
}

// Providers keep one TTL per name and type, so a group declared with two
// TTLs can never converge.
fn check_group_ttls(desired: &[RecordConfig]) -> Result<()> {
    let mut ttls: HashMap<(&str, &str), Ttl> = HashMap::with_capacity(desired.len());
    for record in desired {
        let first = *ttls.entry(record.group()).or_insert(record.ttl());
        if first != record.ttl() {
            return MixedTtlSnafu {
                name: record.name_fqdn(),
                kind: record.kind(),
                first: first.to_string(),
                second: record.ttl().to_string(),
            }
            .fail();
        }
    }
    Ok(())
}

fn check_inlined(records: &[RecordConfig]) -> Result<()> {
    match records.iter().find(|r| r.needs_inlining()) {
        Some(record) => NotInlinedSnafu {
            name: record.name_fqdn(),
            kind: record.kind(),
        }
        .fail(),
        None => Ok(()),
    }
}
