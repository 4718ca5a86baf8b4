use std::{fs::File, io::BufReader, path::PathBuf};

use snafu::ResultExt;

use crate::common::{DeclaredZone, Result, Source, SourceSnafu, SyncSnafu};

use super::models::SourceFile;

pub const SOURCE_NAME: &str = "JSONFile";

/// Reads declared zones from a JSON document.
pub struct JsonFileSource {
    source: PathBuf,
}

impl JsonFileSource {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Source for JsonFileSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn read_zones(&self) -> Result<Vec<DeclaredZone>> {
        let file = File::open(&self.source).boxed().context(SourceSnafu {
            source_name: SOURCE_NAME,
            message: format!("Failed to open source {}", self.source.display()),
        })?;

        let reader = BufReader::new(file);
        let mut data: SourceFile = serde_json::from_reader(reader).boxed().context(SourceSnafu {
            source_name: SOURCE_NAME,
            message: "Failed to read zones from source",
        })?;

        // Ensure all the records are correctly cased
        data.zones.iter_mut().for_each(|zone| {
            zone.records
                .iter_mut()
                .for_each(|record| record.kind.make_ascii_uppercase())
        });

        let mut names: Vec<String> = data
            .zones
            .iter()
            .map(|zone| crate::common::names::normalize(&zone.name))
            .collect();
        names.sort();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return SyncSnafu {
                message: format!("Zone {} is declared more than once", pair[0]),
            }
            .fail();
        }

        tracing::info!(
            source = SOURCE_NAME,
            zones = data.zones.len(),
            records = data.zones.iter().map(|z| z.records.len()).sum::<usize>(),
            "Read completed",
        );
        Ok(data.zones)
    }
}
