//! End-to-end reconciliation against the JSON state-file provider.

use std::fs;
use std::path::Path;

use serde_json::json;

use zonesync_rs::common::{Action, Correction, Error, Provider, ProviderRecord, ProviderRegistry, Result};
use zonesync_rs::jsonfile::{JsonFileProvider, JsonFileSource};
use zonesync_rs::service::{self, CorrectionStatus, ZoneSync};

fn write_json(path: &Path, value: serde_json::Value) {
    fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn declared_zones() -> serde_json::Value {
    json!({"zones": [{
        "name": "example.com",
        "records": [
            {"name": "@", "type": "A", "ttl": 300, "target": "1.2.3.4"},
            {"name": "www", "type": "A", "ttl": 300, "target": "93.184.216.34"},
            {"name": "mail", "type": "MX", "ttl": 3600, "target": "mx1.example.com.", "priority": 10},
            {"name": "mail", "type": "MX", "ttl": 3600, "target": "mx2.example.com.", "priority": 20},
            {"name": "_sip._tcp", "type": "SRV", "target": "sip.example.com.",
             "priority": 10, "weight": 5, "port": 5060},
        ],
    }]})
}

fn live_state() -> serde_json::Value {
    json!({"example.com": [
        {"domain": "example.com", "type": "A", "ttl": 300, "answers": ["1.2.3.4"]},
        {"domain": "www.example.com", "type": "A", "ttl": 600, "answers": ["93.184.216.34"]},
        {"domain": "mail.example.com", "type": "MX", "ttl": 3600, "answers": ["10 mx1.example.com"]},
        {"domain": "old.example.com", "type": "CNAME", "ttl": 300, "answers": ["www.example.com"]},
    ]})
}

fn file_sync(dir: &Path) -> ZoneSync {
    ZoneSync::new(
        service::Config::default(),
        Box::new(JsonFileSource::new(dir.join("zones.json"))),
        Box::new(JsonFileProvider::new(dir.join("state.json"))),
    )
}

fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_json(&dir.path().join("zones.json"), declared_zones());
    write_json(&dir.path().join("state.json"), live_state());
    dir
}

#[test]
fn dry_run_plans_without_writing() {
    let dir = setup();
    let before = fs::read_to_string(dir.path().join("state.json")).unwrap();

    let reports = file_sync(dir.path()).sync(true).unwrap();
    assert_eq!(reports.len(), 1);
    let changes = reports[0].outcome.as_ref().unwrap();

    let planned: Vec<(Action, String)> = changes
        .corrections
        .iter()
        .map(|c| {
            assert!(matches!(c.status, CorrectionStatus::Planned));
            (c.correction.action(), c.correction.to_string())
        })
        .collect();
    assert_eq!(
        planned,
        vec![
            (Action::Delete, "DELETE old.example.com CNAME www.example.com".to_string()),
            (
                Action::Modify,
                "MODIFY www.example.com A: (93.184.216.34 ttl=600) -> (93.184.216.34 ttl=300)"
                    .to_string()
            ),
            (Action::Create, "CREATE mail.example.com MX 20 mx2.example.com".to_string()),
            (
                Action::Create,
                "CREATE _sip._tcp.example.com SRV 10 5 5060 sip.example.com".to_string()
            ),
        ]
    );
    assert_eq!(changes.unchanged, 2);
    assert_eq!(before, fs::read_to_string(dir.path().join("state.json")).unwrap());
}

#[test]
fn sync_converges_and_is_idempotent() {
    let dir = setup();

    let reports = file_sync(dir.path()).sync(false).unwrap();
    assert!(reports[0].is_success());
    let changes = reports[0].outcome.as_ref().unwrap();
    assert_eq!(changes.corrections.len(), 4);
    assert!(changes
        .corrections
        .iter()
        .all(|c| matches!(c.status, CorrectionStatus::Applied)));

    let reports = file_sync(dir.path()).sync(false).unwrap();
    let changes = reports[0].outcome.as_ref().unwrap();
    assert!(changes.corrections.is_empty());
    assert_eq!(changes.unchanged, 5);
}

#[test]
fn duplicate_declarations_fail_the_zone_only() {
    let dir = setup();
    write_json(
        &dir.path().join("zones.json"),
        json!({"zones": [
            {"name": "example.com", "records": [
                {"name": "www", "type": "A", "target": "1.2.3.4"},
                {"name": "www", "type": "A", "target": "1.2.3.4"},
            ]},
            {"name": "example.net", "records": [
                {"name": "www", "type": "A", "target": "1.2.3.4"},
            ]},
        ]}),
    );

    let reports = file_sync(dir.path()).sync(false).unwrap();
    assert!(matches!(
        reports[0].outcome,
        Err(Error::DuplicateRecordError { .. })
    ));
    assert!(reports[1].is_success());
    assert_eq!(reports[1].outcome.as_ref().unwrap().corrections.len(), 1);
}

/// Provider which refuses every write.
struct ReadOnlyProvider;

impl Provider for ReadOnlyProvider {
    fn name(&self) -> &str {
        "readonly"
    }

    fn fetch_zone(&mut self, _zone: &str) -> Result<Vec<ProviderRecord>> {
        Ok(Vec::new())
    }

    fn apply_correction(&mut self, _zone: &str, correction: &Correction) -> Result<()> {
        zonesync_rs::common::ResponseSnafu {
            message: format!("refusing {correction}"),
        }
        .fail()
    }
}

#[test]
fn first_failure_skips_the_rest_of_the_zone() {
    let dir = setup();
    let mut sync = ZoneSync::new(
        service::Config::default(),
        Box::new(JsonFileSource::new(dir.path().join("zones.json"))),
        Box::new(ReadOnlyProvider),
    );

    let reports = sync.sync(false).unwrap();
    assert!(!reports[0].is_success());
    let changes = reports[0].outcome.as_ref().unwrap();
    assert!(matches!(
        changes.corrections[0].status,
        CorrectionStatus::Failed(Error::ProviderApplyError { .. })
    ));
    assert!(changes.corrections[1..]
        .iter()
        .all(|c| matches!(c.status, CorrectionStatus::Skipped)));
}

#[test]
fn registry_builds_configured_service() {
    let dir = setup();
    let config = zonesync_rs::Config {
        provider: "JSONFile".into(),
        jsonfile: Some(zonesync_rs::jsonfile::Config {
            source: Some(dir.path().join("zones.json")),
            state: Some(dir.path().join("state.json")),
            nameservers: vec!["ns1.example.net.".into(), "ns2.example.net.".into()],
        }),
        ..Default::default()
    };

    let mut sync = config.get_service(&ProviderRegistry::with_builtin()).unwrap();
    let reports = sync.sync(true).unwrap();
    let changes = reports[0].outcome.as_ref().unwrap();
    assert_eq!(changes.corrections.len(), 4);
    assert_eq!(changes.nameservers, vec!["ns1.example.net", "ns2.example.net"]);
}

#[test]
fn mixed_group_ttls_fail_the_zone() {
    let dir = setup();
    write_json(
        &dir.path().join("zones.json"),
        json!({"zones": [{"name": "example.com", "records": [
            {"name": "mail", "type": "MX", "ttl": 3600, "target": "mx1.example.com.", "priority": 10},
            {"name": "mail", "type": "MX", "ttl": 300, "target": "mx2.example.com.", "priority": 20},
        ]}]}),
    );
    let before = fs::read_to_string(dir.path().join("state.json")).unwrap();

    let reports = file_sync(dir.path()).sync(false).unwrap();
    assert!(matches!(reports[0].outcome, Err(Error::MixedTtlError { .. })));
    assert_eq!(before, fs::read_to_string(dir.path().join("state.json")).unwrap());
}

#[test]
fn rejected_declaration_leaves_live_records_alone() {
    let dir = setup();
    let mut zones = declared_zones();
    zones["zones"][0]["records"][1]["target"] = json!("93.184.216");

    write_json(&dir.path().join("zones.json"), zones);
    let reports = file_sync(dir.path()).sync(true).unwrap();
    let changes = reports[0].outcome.as_ref().unwrap();

    assert!(matches!(changes.rejected.as_slice(), [Error::InvalidTargetError { .. }]));
    assert!(changes
        .corrections
        .iter()
        .all(|c| !c.correction.to_string().contains("www.example.com")));
    assert_eq!(changes.corrections.len(), 3);
}
