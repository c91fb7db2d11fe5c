use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{FunctionError, Result};

/// API version of the provider's S3 bucket type.
pub const BUCKET_API_VERSION: &str = "s3.aws.upbound.io/v1beta1";
/// Kind of the provider's S3 bucket type.
pub const BUCKET_KIND: &str = "Bucket";
/// Annotation naming the bucket in the provider, independent of its key.
pub const EXTERNAL_NAME_ANNOTATION: &str = "crossplane.io/external-name";
/// Prefix of every composed resource key.
pub const COMPOSED_KEY_PREFIX: &str = "xbuckets";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// The observed `XBuckets` composite resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedComposite {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: XBucketsSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XBucketsSpec {
    /// Region every bucket is created in. Passed through verbatim.
    pub region: String,
    /// Logical bucket names, in order. Duplicates share one composed key.
    pub names: Vec<String>,
}

impl ObservedComposite {
    /// Parse the composite from its JSON object form.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(object.clone())).map_err(|e| {
            FunctionError::malformed_input(format!("cannot parse composite resource: {e}"))
        })
    }

    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("")
    }
}

/// A provider S3 bucket, as declared in desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: BucketSpec,
    pub status: BucketStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    pub for_provider: BucketParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketParameters {
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStatus {
    pub observed_generation: i64,
}

impl Bucket {
    /// Build the bucket for logical name `name` in `region`.
    pub fn new(name: &str, region: &str) -> Self {
        let mut annotations = BTreeMap::new();
        annotations.insert(EXTERNAL_NAME_ANNOTATION.to_string(), name.to_string());

        Self {
            api_version: BUCKET_API_VERSION.to_string(),
            kind: BUCKET_KIND.to_string(),
            metadata: ObjectMeta {
                name: None,
                annotations,
            },
            spec: BucketSpec {
                for_provider: BucketParameters {
                    region: region.to_string(),
                },
            },
            status: BucketStatus::default(),
        }
    }

    /// Key of this bucket in the desired resources map.
    pub fn composed_key(name: &str) -> String {
        format!("{COMPOSED_KEY_PREFIX}-{name}")
    }

    pub fn external_name(&self) -> Option<&str> {
        self.metadata
            .annotations
            .get(EXTERNAL_NAME_ANNOTATION)
            .map(String::as_str)
    }

    /// Render as the JSON object carried on the wire.
    pub fn to_object(&self) -> Result<Map<String, Value>> {
        let name = self.external_name().unwrap_or_default();
        match serde_json::to_value(self) {
            Ok(Value::Object(object)) => Ok(object),
            Ok(_) => Err(FunctionError::serialization(
                name,
                serde::ser::Error::custom("bucket did not serialize to a JSON object"),
            )),
            Err(e) => Err(FunctionError::serialization(name, e)),
        }
    }
}
