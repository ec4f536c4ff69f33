use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::properties::Properties;

/// Concretization of a version: node or directed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Object,
    Relationship,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Object => "object",
            EntityKind::Relationship => "relationship",
        }
    }

    /// Parse the persisted string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "object" => Some(EntityKind::Object),
            "relationship" => Some(EntityKind::Relationship),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-visible content of a version
///
/// Two versions with equal content (and equal tombstone state) are
/// semantically equal, whatever their ids or lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityContent {
    pub kind: EntityKind,

    #[serde(rename = "type")]
    pub entity_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default)]
    pub properties: Properties,

    #[serde(default)]
    pub labels: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Canonical id of the relationship this one mirrors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_of: Option<String>,
}

impl EntityContent {
    pub fn object(entity_type: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Object,
            entity_type: entity_type.into(),
            key: None,
            status: None,
            properties: Properties::new(),
            labels: BTreeSet::new(),
            src_id: None,
            dst_id: None,
            weight: None,
            inverse_of: None,
        }
    }

    pub fn relationship(
        entity_type: impl Into<String>,
        src_id: impl Into<String>,
        dst_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: EntityKind::Relationship,
            src_id: Some(src_id.into()),
            dst_id: Some(dst_id.into()),
            ..Self::object(entity_type)
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Field paths whose values differ, e.g. `properties.name`, `status`
    pub fn differing_fields(&self, other: &EntityContent) -> Vec<String> {
        let mut fields = Vec::new();
        if self.entity_type != other.entity_type {
            fields.push("type".to_string());
        }
        if self.key != other.key {
            fields.push("key".to_string());
        }
        if self.status != other.status {
            fields.push("status".to_string());
        }
        fields.extend(
            self.properties
                .differing_keys(&other.properties)
                .into_iter()
                .map(|k| format!("properties.{}", k)),
        );
        if self.labels != other.labels {
            fields.push("labels".to_string());
        }
        if self.src_id != other.src_id {
            fields.push("src_id".to_string());
        }
        if self.dst_id != other.dst_id {
            fields.push("dst_id".to_string());
        }
        if self.weight != other.weight {
            fields.push("weight".to_string());
        }
        fields
    }
}

/// One immutable snapshot of an entity
///
/// `id` is the version id; `canonical_id` is the identity stable across
/// versions. Records are never mutated once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityVersion {
    pub id: String,
    pub canonical_id: String,

    #[serde(default)]
    pub supersedes_id: Option<String>,

    /// Branch the version was written on (`None` = main)
    #[serde(default)]
    pub branch_id: Option<String>,

    pub version: u64,

    #[serde(flatten)]
    pub content: EntityContent,

    /// Source-branch version a merge copied this version from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_from: Option<String>,

    pub seq: u64,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl EntityVersion {
    pub fn kind(&self) -> EntityKind {
        self.content.kind
    }

    pub fn entity_type(&self) -> &str {
        &self.content.entity_type
    }

    pub fn key(&self) -> Option<&str> {
        self.content.key.as_deref()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn is_relationship(&self) -> bool {
        self.content.kind == EntityKind::Relationship
    }

    /// Endpoints of a relationship version
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match (&self.content.src_id, &self.content.dst_id) {
            (Some(src), Some(dst)) => Some((src.as_str(), dst.as_str())),
            _ => None,
        }
    }

    /// Same content and same tombstone state
    pub fn semantically_equal(&self, other: &EntityVersion) -> bool {
        self.content == other.content && self.is_deleted() == other.is_deleted()
    }

    /// Ids of the versions this one directly descends from
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.supersedes_id
            .as_deref()
            .into_iter()
            .chain(self.merged_from.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> EntityVersion {
        let mut content = EntityContent::object("Person").with_key("alice");
        content.properties.set("name", json!("Alice"));
        content.labels.insert("vip".to_string());
        EntityVersion {
            id: "v-1".into(),
            canonical_id: "c-1".into(),
            supersedes_id: None,
            branch_id: None,
            version: 1,
            content,
            merged_from: None,
            seq: 1,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_serialized_shape_uses_type_field() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["id"], json!("v-1"));
        assert_eq!(value["canonical_id"], json!("c-1"));
        assert_eq!(value["type"], json!("Person"));
        assert_eq!(value["kind"], json!("object"));
        assert_eq!(value["properties"]["name"], json!("Alice"));
        assert_eq!(value["labels"], json!(["vip"]));
        assert!(value.get("src_id").is_none());
    }

    #[test]
    fn test_deserialize_round_trip_keeps_content() {
        let v = sample();
        let json = serde_json::to_string(&v).unwrap();
        let back: EntityVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_semantic_equality_ignores_identity() {
        let a = sample();
        let mut b = sample();
        b.id = "v-2".into();
        b.seq = 7;
        b.branch_id = Some("b1".into());
        assert!(a.semantically_equal(&b));

        b.deleted_at = Some(Utc::now());
        assert!(!a.semantically_equal(&b));
    }

    #[test]
    fn test_differing_fields_names_paths() {
        let a = sample().content;
        let mut b = a.clone();
        b.status = Some("archived".into());
        b.properties.set("name", json!("Alicia"));
        b.labels.clear();
        assert_eq!(
            a.differing_fields(&b),
            vec!["status", "properties.name", "labels"]
        );
    }

    #[test]
    fn test_parents_include_merge_link() {
        let mut v = sample();
        v.supersedes_id = Some("v-0".into());
        v.merged_from = Some("v-src".into());
        assert_eq!(v.parents().collect::<Vec<_>>(), vec!["v-0", "v-src"]);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(EntityKind::parse("object"), Some(EntityKind::Object));
        assert_eq!(
            EntityKind::parse("relationship"),
            Some(EntityKind::Relationship)
        );
        assert_eq!(EntityKind::parse("edge"), None);
    }
}
