use std::fmt;

use super::{Diff, Modification, RecordConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Delete,
    Modify,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Create => "CREATE",
            Action::Delete => "DELETE",
            Action::Modify => "MODIFY",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Create(RecordConfig),
    Delete(RecordConfig),
    Modify {
        desired: RecordConfig,
        existing: RecordConfig,
    },
}

/// A single change required to bring a provider in line with the declared
/// zone. Corrections are descriptions only; applying them is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    change: Change,
    description: String,
}

impl Correction {
    pub fn new(change: Change) -> Self {
        let description = match &change {
            Change::Create(desired) => format!("{} {desired}", Action::Create),
            Change::Delete(existing) => format!("{} {existing}", Action::Delete),
            Change::Modify { desired, existing } => format!(
                "{} {} {}: ({} ttl={}) -> ({} ttl={})",
                Action::Modify,
                desired.name_fqdn(),
                desired.kind(),
                existing.target(),
                existing.ttl(),
                desired.target(),
                desired.ttl(),
            ),
        };
        Self {
            change,
            description,
        }
    }

    pub fn action(&self) -> Action {
        match self.change {
            Change::Create(_) => Action::Create,
            Change::Delete(_) => Action::Delete,
            Change::Modify { .. } => Action::Modify,
        }
    }

    pub fn change(&self) -> &Change {
        &self.change
    }

    pub fn desired(&self) -> Option<&RecordConfig> {
        match &self.change {
            Change::Create(desired) | Change::Modify { desired, .. } => Some(desired),
            Change::Delete(_) => None,
        }
    }

    pub fn existing(&self) -> Option<&RecordConfig> {
        match &self.change {
            Change::Delete(existing) | Change::Modify { existing, .. } => Some(existing),
            Change::Create(_) => None,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl From<Modification> for Correction {
    fn from(value: Modification) -> Self {
        Correction::new(Change::Modify {
            desired: value.desired,
            existing: value.existing,
        })
    }
}

/// One correction per diff entry. Deletes come first so that providers which
/// enforce uniqueness accept the writes that follow, then modifications, then
/// creates.
pub fn build_corrections(diff: &Diff) -> Vec<Correction> {
    let mut corrections = Vec::with_capacity(diff.len());
    corrections.extend(
        diff.delete
            .iter()
            .map(|record| Correction::new(Change::Delete(record.clone()))),
    );
    corrections.extend(diff.modify.iter().cloned().map(Correction::from));
    corrections.extend(
        diff.create
            .iter()
            .map(|record| Correction::new(Change::Create(record.clone()))),
    );
    corrections
}
