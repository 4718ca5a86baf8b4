pub use uuid::Uuid;

use crate::common::{Correction, Error};

#[derive(Debug)]
pub enum CorrectionStatus {
    /// Computed during a dry run and not applied.
    Planned,
    Applied,
    Failed(Error),
    /// Not attempted because an earlier correction in the zone failed.
    Skipped,
}

#[derive(Debug)]
pub struct CorrectionOutcome {
    pub correction: Correction,
    pub status: CorrectionStatus,
}

#[derive(Debug, Default)]
pub struct ZoneChanges {
    /// Nameservers the provider serves the zone from.
    pub nameservers: Vec<String>,
    pub unchanged: usize,
    /// Records excluded from the diff.
    pub rejected: Vec<Error>,
    pub corrections: Vec<CorrectionOutcome>,
}

impl ZoneChanges {
    pub fn failed(&self) -> bool {
        self.corrections
            .iter()
            .any(|c| matches!(c.status, CorrectionStatus::Failed(_)))
    }
}

#[derive(Debug)]
pub struct ZoneReport {
    pub zone: String,
    /// Correlates the log lines of one pass over the zone.
    pub pass_id: Uuid,
    pub outcome: Result<ZoneChanges, Error>,
}

impl ZoneReport {
    pub fn is_success(&self) -> bool {
        matches!(&self.outcome, Ok(changes) if !changes.failed())
    }
}
