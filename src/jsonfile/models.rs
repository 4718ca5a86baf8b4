use std::collections::BTreeMap;

use crate::common::{DeclaredZone, ProviderRecord};

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub(super) struct SourceFile {
    #[serde(default)]
    pub zones: Vec<DeclaredZone>,
}

/// Zone name to the records the file provider holds for it.
pub(super) type StateFile = BTreeMap<String, Vec<ProviderRecord>>;
