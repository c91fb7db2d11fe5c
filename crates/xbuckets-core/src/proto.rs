//! Request and response envelopes of the composition function protocol (v1),
//! in their canonical JSON mapping.
//!
//! Field names are camelCase, enums use their protobuf value names and
//! durations are rendered as `"<seconds>s"`. Every map is a `BTreeMap`, so the
//! same envelope always serializes to the same bytes.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request to derive desired state from observed state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFunctionRequest {
    #[serde(default)]
    pub meta: RequestMeta,
    /// State of the composite and composed resources as last observed.
    #[serde(default)]
    pub observed: State,
    /// Desired state accumulated by earlier steps of the pipeline.
    #[serde(default)]
    pub desired: State,
    /// Optional function input from the composition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Pipeline context shared between functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    /// Opaque identifier of this request; echoed on the response.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
}

/// The composite resource and its composed resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, Resource>,
}

/// A single resource: its JSON object plus protocol-level attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub resource: Map<String, Value>,
    /// Base64-encoded connection secret values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connection_details: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Ready::is_unspecified")]
    pub ready: Ready,
}

impl Resource {
    pub fn from_object(resource: Map<String, Value>) -> Self {
        Self {
            resource,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ready {
    #[default]
    #[serde(rename = "READY_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "READY_TRUE")]
    True,
    #[serde(rename = "READY_FALSE")]
    False,
}

impl Ready {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }
}

/// The desired state and status a function hands back to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFunctionResponse {
    #[serde(default)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub desired: State,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<FunctionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    /// How long the orchestrator may cache this response.
    #[serde(
        default,
        with = "proto_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub ttl: Option<Duration>,
}

/// An event reported by the function, e.g. a fatal error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "SEVERITY_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "SEVERITY_FATAL")]
    Fatal,
    #[serde(rename = "SEVERITY_WARNING")]
    Warning,
    #[serde(rename = "SEVERITY_NORMAL")]
    Normal,
}

/// A status condition to set on the composite resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    #[serde(rename = "STATUS_CONDITION_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "STATUS_CONDITION_UNKNOWN")]
    Unknown,
    #[serde(rename = "STATUS_CONDITION_TRUE")]
    True,
    #[serde(rename = "STATUS_CONDITION_FALSE")]
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    #[serde(rename = "TARGET_COMPOSITE")]
    Composite,
    #[serde(rename = "TARGET_COMPOSITE_AND_CLAIM")]
    CompositeAndClaim,
}

/// `google.protobuf.Duration` JSON form: `"60s"`, `"1.500s"`.
mod proto_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&format(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse(&s).map_err(D::Error::custom))
            .transpose()
    }

    pub(super) fn format(d: Duration) -> String {
        let secs = d.as_secs();
        let nanos = d.subsec_nanos();
        if nanos == 0 {
            format!("{secs}s")
        } else if nanos % 1_000_000 == 0 {
            format!("{secs}.{:03}s", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{secs}.{:06}s", nanos / 1_000)
        } else {
            format!("{secs}.{nanos:09}s")
        }
    }

    pub(super) fn parse(s: &str) -> Result<Duration, String> {
        let body = s
            .strip_suffix('s')
            .ok_or_else(|| format!("duration {s:?} must end with 's'"))?;
        let (secs, frac) = body.split_once('.').unwrap_or((body, ""));
        let secs: u64 = secs
            .parse()
            .map_err(|_| format!("invalid duration seconds in {s:?}"))?;
        if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid duration fraction in {s:?}"));
        }
        let nanos = if frac.is_empty() {
            0
        } else {
            // Right-pad to nanosecond precision: "5" -> 500_000_000.
            format!("{frac:0<9}")
                .parse::<u32>()
                .map_err(|_| format!("invalid duration fraction in {s:?}"))?
        };
        Ok(Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_uses_protobuf_json_form() {
        assert_eq!(proto_duration::format(Duration::from_secs(60)), "60s");
        assert_eq!(proto_duration::format(Duration::from_millis(1500)), "1.500s");
        assert_eq!(proto_duration::format(Duration::from_micros(2)), "0.000002s");
        assert_eq!(proto_duration::format(Duration::new(1, 7)), "1.000000007s");

        assert_eq!(proto_duration::parse("60s"), Ok(Duration::from_secs(60)));
        assert_eq!(proto_duration::parse("0.5s"), Ok(Duration::from_millis(500)));
        assert!(proto_duration::parse("60").is_err());
        assert!(proto_duration::parse("-1s").is_err());
        assert!(proto_duration::parse("1.0000000001s").is_err());
    }

    #[test]
    fn request_parses_with_missing_sections() {
        let req: RunFunctionRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req, RunFunctionRequest::default());
        assert!(req.observed.composite.is_none());
    }

    #[test]
    fn request_parses_observed_composite() {
        let req: RunFunctionRequest = serde_json::from_value(json!({
            "meta": { "tag": "abc" },
            "observed": {
                "composite": {
                    "resource": { "apiVersion": "example.crossplane.io/v1alpha1", "kind": "XBuckets" },
                    "connectionDetails": { "password": "aHVudGVyMg==" }
                }
            }
        }))
        .unwrap();

        assert_eq!(req.meta.tag, "abc");
        let composite = req.observed.composite.unwrap();
        assert_eq!(composite.resource["kind"], "XBuckets");
        assert_eq!(composite.connection_details["password"], "aHVudGVyMg==");
        assert_eq!(composite.ready, Ready::Unspecified);
    }

    #[test]
    fn response_omits_empty_fields() {
        let rsp = RunFunctionResponse {
            meta: ResponseMeta {
                tag: String::new(),
                ttl: Some(Duration::from_secs(60)),
            },
            conditions: vec![Condition {
                condition_type: "FunctionSuccess".into(),
                status: ConditionStatus::True,
                reason: "Success".into(),
                message: None,
                target: Some(Target::Composite),
            }],
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&rsp).unwrap(),
            json!({
                "meta": { "ttl": "60s" },
                "desired": {},
                "conditions": [{
                    "type": "FunctionSuccess",
                    "status": "STATUS_CONDITION_TRUE",
                    "reason": "Success",
                    "target": "TARGET_COMPOSITE"
                }]
            })
        );
    }

    #[test]
    fn response_ttl_reads_back() {
        let rsp: RunFunctionResponse =
            serde_json::from_value(json!({ "meta": { "tag": "t", "ttl": "1.5s" } })).unwrap();
        assert_eq!(rsp.meta.ttl, Some(Duration::from_millis(1500)));
        assert_eq!(rsp.meta.tag, "t");
    }
}
