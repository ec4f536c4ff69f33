//! Request payloads accepted by the gateway (also the HTTP JSON bodies)

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateObjectRequest {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub branch_id: Option<String>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateObjectRequest {
    #[serde(default)]
    pub status: Option<String>,
    /// Merged into the current properties; `null` values remove keys
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    /// Replaces the label set
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    /// Optimistic concurrency: the head the caller last saw
    #[serde(default)]
    pub expected_head_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRelationshipRequest {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub src_id: String,
    pub dst_id: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Materialize a `dst -> src` relationship of this type as well
    #[serde(default)]
    pub inverse_type: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRelationshipRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub expected_head_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub expected_head_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
}

pub type RestoreRequest = DeleteRequest;

#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateObjectItem {
    pub id: String,
    #[serde(flatten)]
    pub patch: UpdateObjectRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateRelationshipItem {
    pub id: String,
    #[serde(flatten)]
    pub patch: UpdateRelationshipRequest,
}
