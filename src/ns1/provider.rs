use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use snafu::IntoError;

use crate::common::{
    self, names, secret_or_file, Change, ConfigSnafu, Correction, ProviderRecord, RecordConfig,
    RequestSnafu, ResponseSnafu, Result,
};

use super::models::{APIError, Answer, Record, Zone};
use super::PROVIDER_NAME;

const API_BASE_URL: &str = "https://api.nsone.net/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMethod {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteMethod::Create => "PUT",
            WriteMethod::Update => "POST",
            WriteMethod::Delete => "DELETE",
        })
    }
}

/// Turn a failed call into an error, preferring the message NS1 returns.
fn process_error(method: &str, url: &str, err: ureq::Error) -> common::Error {
    match err {
        ureq::Error::Status(code, response) => {
            let message = match response.into_json::<APIError>() {
                Ok(body) => body.message,
                Err(_) => "no error message".to_string(),
            };
            ResponseSnafu {
                message: format!("{method} {url} returned {code}: {message}"),
            }
            .build()
        }
        err => RequestSnafu { url, method }.into_error(err),
    }
}

/// A single request which moves an NS1 record to its next state.
#[derive(Debug)]
struct RecordWrite {
    method: WriteMethod,
    body: Option<Record>,
}

fn stale(record: &RecordConfig, what: &str) -> common::Error {
    ResponseSnafu {
        message: format!("{record}: {what} no longer exists"),
    }
    .build()
}

/// Add `desired` as an answer, creating the record if there is none.
fn add_answer(zone: &str, current: Option<Record>, desired: &RecordConfig) -> RecordWrite {
    let (method, mut record) = match current {
        Some(record) => (WriteMethod::Update, record),
        None => (
            WriteMethod::Create,
            Record {
                zone: zone.to_string(),
                domain: desired.name_fqdn().to_string(),
                kind: desired.kind().to_string(),
                ttl: None,
                answers: Vec::new(),
            },
        ),
    };
    if record.find_answer(desired.target()).is_none() {
        record
            .answers
            .push(Answer::from_target(desired.kind(), desired.target()));
    }
    record.set_ttl(desired.ttl());
    RecordWrite {
        method,
        body: Some(record),
    }
}

/// Drop the answer of `existing`; removing the last answer deletes the record.
fn remove_answer(current: Option<Record>, existing: &RecordConfig) -> Result<RecordWrite> {
    let mut record = current.ok_or_else(|| stale(existing, "record"))?;
    let idx = record
        .find_answer(existing.target())
        .ok_or_else(|| stale(existing, "answer"))?;
    record.answers.remove(idx);

    Ok(if record.answers.is_empty() {
        RecordWrite {
            method: WriteMethod::Delete,
            body: None,
        }
    } else {
        RecordWrite {
            method: WriteMethod::Update,
            body: Some(record),
        }
    })
}

fn replace_answer(
    current: Option<Record>,
    existing: &RecordConfig,
    desired: &RecordConfig,
) -> Result<RecordWrite> {
    let mut record = current.ok_or_else(|| stale(existing, "record"))?;
    let idx = record
        .find_answer(existing.target())
        .ok_or_else(|| stale(existing, "answer"))?;
    record.answers[idx] = Answer::from_target(desired.kind(), desired.target());
    record.set_ttl(desired.ttl());
    Ok(RecordWrite {
        method: WriteMethod::Update,
        body: Some(record),
    })
}

pub struct Ns1Provider {
    api_key: String,
    base_url: String,
    /// Nameservers seen in the last fetch of each zone.
    dns_servers: HashMap<String, Vec<String>>,
}

impl Ns1Provider {
    pub fn new(config: &super::Config) -> Result<Self> {
        let api_key = secret_or_file(&config.api_key, "ns1.api_key")?;
        let base_url = match &config.base_url {
            Some(url) if url.cannot_be_a_base() => {
                return ConfigSnafu {
                    message: format!("{url} cannot be used as a base URL"),
                    prefix: "ns1.base_url",
                }
                .fail()
            }
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None => API_BASE_URL.to_string(),
        };
        Ok(Self {
            api_key,
            base_url,
            dns_servers: HashMap::new(),
        })
    }

    fn with_headers(&self, req: ureq::Request) -> ureq::Request {
        req.set("X-NSONE-Key", &self.api_key)
            .set("Content-Type", "application/json; charset=utf8")
    }

    fn record_url(&self, zone: &str, record: &RecordConfig) -> String {
        format!(
            "{}/zones/{zone}/{}/{}",
            self.base_url,
            record.name_fqdn(),
            record.kind()
        )
    }

    /// GET a resource, mapping 404 to `None`.
    fn api_get<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        tracing::debug!(url = url, method = "GET", provider = PROVIDER_NAME, "Sending request");
        let resp = match self.with_headers(ureq::get(url)).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(err) => return Err(process_error("GET", url, err)),
        };
        resp.into_json().map(Some).map_err(|err| {
            ResponseSnafu {
                message: format!("Failed to deserialize response from {url}: {err}"),
            }
            .build()
        })
    }

    fn api_write(&self, url: &str, method: WriteMethod, body: Option<&Record>) -> Result<()> {
        tracing::debug!(
            url = url,
            method = method.to_string(),
            provider = PROVIDER_NAME,
            "Sending request"
        );
        let req = self.with_headers(match method {
            WriteMethod::Create => ureq::put(url),
            WriteMethod::Update => ureq::post(url),
            WriteMethod::Delete => ureq::delete(url),
        });
        let result = match body {
            Some(record) => req.send_json(record),
            None => req.call(),
        };
        result.map_err(|err| process_error(&method.to_string(), url, err))?;
        Ok(())
    }

    fn get_zone(&self, zone: &str) -> Result<Zone> {
        let url = format!("{}/zones/{zone}", self.base_url);
        match self.api_get::<Zone>(&url)? {
            Some(response) => Ok(response),
            None => ResponseSnafu {
                message: format!("Zone {zone} does not exist"),
            }
            .fail(),
        }
    }

    /// Read the record behind `record`, edit it and write it back.
    fn edit_record<F>(&self, zone: &str, record: &RecordConfig, edit: F) -> Result<()>
    where
        F: FnOnce(Option<Record>) -> Result<RecordWrite>,
    {
        let url = self.record_url(zone, record);
        let write = edit(self.api_get::<Record>(&url)?)?;
        self.api_write(&url, write.method, write.body.as_ref())
    }
}

impl common::Provider for Ns1Provider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_zone(&mut self, zone: &str) -> Result<Vec<ProviderRecord>> {
        let response = self.get_zone(zone)?;
        self.dns_servers.insert(zone.to_string(), response.dns_servers);

        let records: Vec<ProviderRecord> = response.records.into_iter().map(Into::into).collect();
        tracing::info!(
            provider = PROVIDER_NAME,
            zone = zone,
            records = records.len(),
            "Read completed",
        );
        Ok(records)
    }

    fn nameservers(&mut self, zone: &str) -> Result<Vec<String>> {
        let servers = match self.dns_servers.get(zone) {
            Some(servers) => servers.clone(),
            None => self.get_zone(zone)?.dns_servers,
        };
        Ok(servers.iter().map(|ns| names::normalize(ns)).collect())
    }

    fn apply_correction(&mut self, zone: &str, correction: &Correction) -> Result<()> {
        tracing::info!(provider = PROVIDER_NAME, zone = zone, "{correction}");
        match correction.change() {
            Change::Create(desired) => {
                self.edit_record(zone, desired, |current| Ok(add_answer(zone, current, desired)))
            }
            Change::Delete(existing) => {
                self.edit_record(zone, existing, |current| remove_answer(current, existing))
            }
            Change::Modify { desired, existing } => self.edit_record(zone, existing, |current| {
                replace_answer(current, existing, desired)
            }),
        }
    }
}
