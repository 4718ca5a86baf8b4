use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::PathBuf,
};

use snafu::ResultExt;

use crate::common::{
    self, canonical_target, names, Change, Correction, ProviderRecord, RecordConfig,
    ResponseSnafu, Result, StateFileSnafu, ZeroTtl,
};

use super::models::StateFile;

pub const PROVIDER_NAME: &str = "JSONFile";

/// Keeps zones in a local JSON file, in the same shape providers report them.
/// A zone absent from the file is empty.
pub struct JsonFileProvider {
    state: PathBuf,
    nameservers: Vec<String>,
}

impl JsonFileProvider {
    pub fn new(state: impl Into<PathBuf>) -> Self {
        Self {
            state: state.into(),
            nameservers: Vec::new(),
        }
    }

    pub fn with_nameservers(mut self, nameservers: Vec<String>) -> Self {
        self.nameservers = nameservers;
        self
    }

    fn load(&self) -> Result<StateFile> {
        let file = match File::open(&self.state) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(StateFile::new()),
            Err(err) => {
                return Err(err).boxed().context(StateFileSnafu {
                    path: self.state.display().to_string(),
                    message: "Failed to open",
                })
            }
        };
        serde_json::from_reader(BufReader::new(file))
            .boxed()
            .context(StateFileSnafu {
                path: self.state.display().to_string(),
                message: "Failed to parse",
            })
    }

    fn save(&self, state: &StateFile) -> Result<()> {
        let context = || StateFileSnafu {
            path: self.state.display().to_string(),
            message: "Failed to write",
        };
        let mut writer = BufWriter::new(File::create(&self.state).boxed().with_context(|_| context())?);
        serde_json::to_writer_pretty(&mut writer, state)
            .boxed()
            .with_context(|_| context())?;
        writer.flush().boxed().with_context(|_| context())
    }
}

fn position(records: &[ProviderRecord], record: &RecordConfig) -> Option<usize> {
    records.iter().position(|r| {
        names::normalize(&r.domain) == record.name_fqdn() && r.kind.eq_ignore_ascii_case(record.kind())
    })
}

fn answer_position(entry: &ProviderRecord, target: &str) -> Option<usize> {
    entry
        .answers
        .iter()
        .position(|answer| canonical_target(&entry.kind.to_ascii_uppercase(), answer) == target)
}

fn missing(record: &RecordConfig, what: &str) -> common::Error {
    ResponseSnafu {
        message: format!("{record}: {what} not found in state file"),
    }
    .build()
}

/// Edit the records of one zone. Deletes and modifications must find the
/// answer they were planned against.
fn apply_change(records: &mut Vec<ProviderRecord>, change: &Change) -> Result<()> {
    match change {
        Change::Create(desired) => match position(records, desired) {
            Some(idx) => {
                let entry = &mut records[idx];
                if answer_position(entry, desired.target()).is_none() {
                    entry.answers.push(desired.target().to_string());
                }
                entry.ttl = desired.ttl().as_secs();
            }
            None => records.push(ProviderRecord {
                domain: desired.name_fqdn().to_string(),
                kind: desired.kind().to_string(),
                ttl: desired.ttl().as_secs(),
                answers: vec![desired.target().to_string()],
            }),
        },
        Change::Delete(existing) => {
            let idx = position(records, existing).ok_or_else(|| missing(existing, "record"))?;
            let answer = answer_position(&records[idx], existing.target())
                .ok_or_else(|| missing(existing, "answer"))?;
            records[idx].answers.remove(answer);
            if records[idx].answers.is_empty() {
                records.remove(idx);
            }
        }
        Change::Modify { desired, existing } => {
            let idx = position(records, existing).ok_or_else(|| missing(existing, "record"))?;
            let entry = &mut records[idx];
            let answer = answer_position(entry, existing.target())
                .ok_or_else(|| missing(existing, "answer"))?;
            entry.answers[answer] = desired.target().to_string();
            entry.ttl = desired.ttl().as_secs();
        }
    }
    Ok(())
}

impl common::Provider for JsonFileProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn zero_ttl(&self) -> ZeroTtl {
        ZeroTtl::ZoneDefault
    }

    fn fetch_zone(&mut self, zone: &str) -> Result<Vec<ProviderRecord>> {
        let zone = names::normalize(zone);
        let records = self.load()?.remove(&zone).unwrap_or_default();
        tracing::info!(
            provider = PROVIDER_NAME,
            zone = zone,
            records = records.len(),
            "Read completed",
        );
        Ok(records)
    }

    fn nameservers(&mut self, _zone: &str) -> Result<Vec<String>> {
        Ok(self.nameservers.iter().map(|ns| names::normalize(ns)).collect())
    }

    fn apply_correction(&mut self, zone: &str, correction: &Correction) -> Result<()> {
        tracing::info!(provider = PROVIDER_NAME, zone = zone, "{correction}");
        let mut state = self.load()?;
        apply_change(
            state.entry(names::normalize(zone)).or_default(),
            correction.change(),
        )?;
        self.save(&state)
    }
}
