use snafu::ResultExt;

use crate::common::{
    reconcile, Provider, ProviderApplySnafu, ProviderFetchSnafu, ReconcileOptions, Result, Source,
    Ttl,
};

use super::{CorrectionOutcome, CorrectionStatus, Uuid, ZoneChanges, ZoneReport};

/// Converges the zones of a source onto a provider.
pub struct ZoneSync {
    config: super::Config,
    source: Box<dyn Source>,
    provider: Box<dyn Provider>,
}

impl ZoneSync {
    pub fn new(config: super::Config, source: Box<dyn Source>, provider: Box<dyn Provider>) -> Self {
        Self {
            config,
            source,
            provider,
        }
    }

    fn options(&self) -> ReconcileOptions {
        ReconcileOptions {
            default_ttl: Ttl::seconds(self.config.default_ttl).unwrap_or(Ttl::ZoneDefault),
            zero_ttl: self.provider.zero_ttl(),
            pair_changed_targets: self.config.pair_changed_targets,
        }
    }

    /// Reconcile every declared zone. With `dry_run` the corrections are
    /// reported as planned and nothing is written.
    ///
    /// A failure reading the source fails the whole sync; failures within a
    /// zone are reported in that zone's [`ZoneReport`].
    pub fn sync(&mut self, dry_run: bool) -> Result<Vec<ZoneReport>> {
        let zones = self.source.read_zones()?;
        let options = self.options();
        tracing::debug!(
            source = self.source.name(),
            provider = self.provider.name(),
            zones = zones.len(),
            dry_run = dry_run,
            "Starting sync",
        );

        let mut reports = Vec::with_capacity(zones.len());
        for zone in zones {
            let pass_id = Uuid::new_v4();
            let outcome = self.sync_zone(&zone.name, &zone.records, &options, dry_run, pass_id);
            if let Err(err) = &outcome {
                tracing::error!(
                    provider = self.provider.name(),
                    zone = zone.name,
                    pass_id = pass_id.to_string(),
                    "Zone failed: {err}",
                );
            }
            reports.push(ZoneReport {
                zone: zone.name,
                pass_id,
                outcome,
            });
        }
        Ok(reports)
    }

    fn sync_zone(
        &mut self,
        zone: &str,
        declared: &[crate::common::DeclaredRecord],
        options: &ReconcileOptions,
        dry_run: bool,
        pass_id: Uuid,
    ) -> Result<ZoneChanges> {
        let provider_name = self.provider.name().to_string();
        let fetched = self.provider.fetch_zone(zone).context(ProviderFetchSnafu {
            provider: provider_name.as_str(),
            zone,
        })?;
        let nameservers = self.provider.nameservers(zone).context(ProviderFetchSnafu {
            provider: provider_name.as_str(),
            zone,
        })?;
        tracing::debug!(
            provider = provider_name,
            zone = zone,
            nameservers = nameservers.join(","),
            "Read nameservers",
        );

        let plan = reconcile(zone, declared, &fetched, options)?;
        let mut changes = ZoneChanges {
            nameservers,
            unchanged: plan.unchanged.len(),
            rejected: plan.rejected,
            corrections: Vec::with_capacity(plan.corrections.len()),
        };

        // Short circuit on no changes
        if plan.corrections.is_empty() {
            tracing::info!(
                provider = provider_name,
                zone = zone,
                pass_id = pass_id.to_string(),
                unchanged = changes.unchanged,
                "No changes detected",
            );
            return Ok(changes);
        }

        // Stop on dry run
        if dry_run {
            for correction in &plan.corrections {
                tracing::info!(zone = zone, pass_id = pass_id.to_string(), "Would {correction}");
            }
            tracing::info!(
                provider = provider_name,
                zone = zone,
                pass_id = pass_id.to_string(),
                corrections = plan.corrections.len(),
                "Dry run completed",
            );
            changes.corrections = plan
                .corrections
                .into_iter()
                .map(|correction| CorrectionOutcome {
                    correction,
                    status: CorrectionStatus::Planned,
                })
                .collect();
            return Ok(changes);
        }

        tracing::info!(
            provider = provider_name,
            zone = zone,
            pass_id = pass_id.to_string(),
            corrections = plan.corrections.len(),
            "Applying changes",
        );

        // Corrections are applied in order; the first failure stops the zone.
        let mut failed = false;
        for correction in plan.corrections {
            let status = if failed {
                CorrectionStatus::Skipped
            } else {
                match self
                    .provider
                    .apply_correction(zone, &correction)
                    .context(ProviderApplySnafu {
                        provider: provider_name.as_str(),
                        correction: correction.description(),
                    }) {
                    Ok(()) => CorrectionStatus::Applied,
                    Err(err) => {
                        tracing::error!(
                            provider = provider_name,
                            zone = zone,
                            pass_id = pass_id.to_string(),
                            "{err}",
                        );
                        failed = true;
                        CorrectionStatus::Failed(err)
                    }
                }
            };
            changes
                .corrections
                .push(CorrectionOutcome { correction, status });
        }

        Ok(changes)
    }
}
