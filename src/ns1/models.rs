use serde_json::Value;

use crate::common::{canonical_target, ProviderRecord, Ttl, RECORD_KIND_MX, RECORD_KIND_SRV};

/// Types whose NS1 answers are split into separate rdata fields.
const MULTI_FIELD_KINDS: &[&str] = &[RECORD_KIND_MX, RECORD_KIND_SRV, "CAA"];

#[derive(serde::Deserialize)]
pub(super) struct APIError {
    pub message: String,
}

#[derive(serde::Deserialize)]
pub(super) struct Zone {
    #[serde(default)]
    pub dns_servers: Vec<String>,
    #[serde(default)]
    pub records: Vec<ZoneRecord>,
}

/// Summary record listed in a zone.
#[derive(serde::Deserialize)]
pub(super) struct ZoneRecord {
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ttl: u32,
    #[serde(default)]
    pub short_answers: Vec<String>,
}

impl From<ZoneRecord> for ProviderRecord {
    fn from(value: ZoneRecord) -> Self {
        ProviderRecord {
            domain: value.domain,
            kind: value.kind,
            ttl: value.ttl,
            answers: value.short_answers,
        }
    }
}

/// Full record, as read and written through the record endpoint.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub(super) struct Record {
    pub zone: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Record {
    pub fn set_ttl(&mut self, ttl: Ttl) {
        self.ttl = match ttl {
            Ttl::ZoneDefault => None,
            Ttl::Seconds(secs) => Some(secs.get()),
        };
    }

    /// Index of the answer equal to a canonical target.
    pub fn find_answer(&self, target: &str) -> Option<usize> {
        self.answers
            .iter()
            .position(|answer| canonical_target(&self.kind, &answer.to_target(&self.kind)) == target)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub(super) struct Answer {
    pub answer: Vec<Value>,
}

impl Answer {
    pub fn from_target(kind: &str, target: &str) -> Self {
        let answer = if MULTI_FIELD_KINDS.contains(&kind) {
            target
                .split_whitespace()
                .map(|field| match field.parse::<u64>() {
                    Ok(number) => Value::from(number),
                    Err(_) => Value::from(field),
                })
                .collect()
        } else {
            vec![Value::from(target)]
        };
        Self { answer }
    }

    pub fn to_target(&self, kind: &str) -> String {
        let fields: Vec<String> = self
            .answer
            .iter()
            .map(|field| match field {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        if MULTI_FIELD_KINDS.contains(&kind) {
            fields.join(" ")
        } else {
            fields.concat()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mx_answer_fields() {
        let answer = Answer::from_target("MX", "10 mx1.example.com");
        assert_eq!(
            serde_json::to_value(&answer).unwrap(),
            serde_json::json!({"answer": [10, "mx1.example.com"]})
        );
        assert_eq!(answer.to_target("MX"), "10 mx1.example.com");
    }

    #[test]
    fn txt_answer_is_one_field() {
        let answer = Answer::from_target("TXT", "v=spf1 include:example.net -all");
        assert_eq!(answer.answer.len(), 1);
        assert_eq!(answer.to_target("TXT"), "v=spf1 include:example.net -all");
    }

    #[test]
    fn find_answer_uses_canonical_form() {
        let record: Record = serde_json::from_value(serde_json::json!({
            "zone": "example.com",
            "domain": "example.com",
            "type": "MX",
            "ttl": 3600,
            "answers": [
                {"answer": [10, "MX1.example.com."]},
                {"answer": ["20", "mx2.example.com"]},
            ],
        }))
        .unwrap();

        assert_eq!(record.find_answer("10 mx1.example.com"), Some(0));
        assert_eq!(record.find_answer("20 mx2.example.com"), Some(1));
        assert_eq!(record.find_answer("30 mx3.example.com"), None);
    }

    #[test]
    fn zone_listing() {
        let zone: Zone = serde_json::from_value(serde_json::json!({
            "zone": "example.com",
            "records": [{
                "domain": "mail.example.com",
                "type": "MX",
                "ttl": 3600,
                "short_answers": ["10 mx1.example.com", "20 mx2.example.com"],
                "tier": 1,
            }],
        }))
        .unwrap();

        assert!(zone.dns_servers.is_empty());
        let records: Vec<ProviderRecord> = zone.records.into_iter().map(Into::into).collect();
        assert_eq!(records[0].answers.len(), 2);
        assert_eq!(records[0].kind, "MX");
    }

    #[test]
    fn zone_nameservers() {
        let zone: Zone = serde_json::from_value(serde_json::json!({
            "zone": "example.com",
            "dns_servers": ["dns1.p01.nsone.net", "dns2.p01.nsone.net"],
            "records": [],
        }))
        .unwrap();

        assert_eq!(zone.dns_servers, vec!["dns1.p01.nsone.net", "dns2.p01.nsone.net"]);
    }
}
