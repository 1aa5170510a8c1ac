//! Schema document types and their store-facing conversions.
//!
//! Field names follow the store's own JSON vocabulary (`waitForSync`,
//! `keyOptions`, `edgeDefinitions`, ...) so a document written by the
//! extractor can be read back by the creator without translation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Collection type tag. The store encodes these as type codes 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Document,
    Edge,
}

impl CollectionKind {
    pub fn type_code(self) -> u8 {
        match self {
            Self::Document => 2,
            Self::Edge => 3,
        }
    }

    /// Anything other than the edge code is treated as a document collection.
    pub fn from_type_code(code: u64) -> Self {
        if code == 3 {
            Self::Edge
        } else {
            Self::Document
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Edge => "edge",
        }
    }
}

/// Full schema of one database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub database: String,
    #[serde(default)]
    pub collections: Vec<CollectionSchema>,
    #[serde(default)]
    pub graphs: Vec<GraphSchema>,
    #[serde(default)]
    pub views: Vec<ViewSchema>,
    #[serde(default)]
    pub analyzers: Vec<AnalyzerSchema>,
    #[serde(default)]
    pub functions: Vec<FunctionSchema>,
}

impl SchemaDocument {
    pub fn empty(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collections: Vec::new(),
            graphs: Vec::new(),
            views: Vec::new(),
            analyzers: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn summary(&self) -> SchemaSummary {
        let edge_collections = self
            .collections
            .iter()
            .filter(|c| c.kind == CollectionKind::Edge)
            .count();
        SchemaSummary {
            document_collections: self.collections.len() - edge_collections,
            edge_collections,
            with_validation: self
                .collections
                .iter()
                .filter(|c| c.properties.schema.is_some())
                .count(),
            indexes: self.collections.iter().map(|c| c.indexes.len()).sum(),
            graphs: self.graphs.len(),
            views: self.views.len(),
            analyzers: self.analyzers.len(),
            functions: self.functions.len(),
        }
    }
}

/// Entity counts reported after extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaSummary {
    pub document_collections: usize,
    pub edge_collections: usize,
    pub with_validation: usize,
    pub indexes: usize,
    pub graphs: usize,
    pub views: usize,
    pub analyzers: usize,
    pub functions: usize,
}

// =============================================================================
// Collections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CollectionKind,
    pub properties: CollectionProperties,
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
}

impl CollectionSchema {
    /// Descriptor used when full processing of a collection failed.
    pub fn minimal(
        name: impl Into<String>,
        kind: CollectionKind,
        properties: Option<&Value>,
        indexes: Vec<IndexSchema>,
    ) -> Self {
        let properties = properties
            .map(|raw| {
                let mut props = CollectionProperties::from_store(raw);
                props.schema = None;
                props.computed_values = None;
                props.cluster = None;
                props
            })
            .unwrap_or_default();
        Self {
            name: name.into(),
            kind,
            properties,
            indexes,
        }
    }

    /// Body for `POST /_api/collection`.
    ///
    /// `validation` is the already-cleaned `{rule, level, message}` object, or
    /// `None` to create the collection without a schema.
    pub fn creation_options(&self, validation: Option<Value>) -> Value {
        let mut options = Map::new();
        options.insert("name".into(), json!(self.name));
        options.insert("type".into(), json!(self.kind.type_code()));
        options.insert("waitForSync".into(), json!(self.properties.wait_for_sync));
        if let Some(key_options) = &self.properties.key_options {
            options.insert("keyOptions".into(), key_options.clone());
        }
        if let Some(cluster) = &self.properties.cluster {
            if let Value::Object(fields) = json!(cluster) {
                options.extend(fields);
            }
        }
        if let Some(computed) = &self.properties.computed_values {
            if computed.as_array().is_some_and(|values| !values.is_empty()) {
                options.insert("computedValues".into(), computed.clone());
            }
        }
        if let Some(validation) = validation {
            options.insert("schema".into(), validation);
        }
        Value::Object(options)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionProperties {
    #[serde(default)]
    pub wait_for_sync: bool,
    #[serde(default)]
    pub key_options: Option<Value>,
    /// Attached validation rule as stored, `null` when the collection has none.
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_values: Option<Value>,
    #[serde(flatten)]
    pub cluster: Option<ClusterProperties>,
}

impl CollectionProperties {
    /// Build from the `properties` response. The schema slot is left empty;
    /// the extractor fills it from its recovery strategies.
    pub fn from_store(raw: &Value) -> Self {
        Self {
            wait_for_sync: raw
                .get("waitForSync")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            key_options: raw.get("keyOptions").filter(|v| !v.is_null()).cloned(),
            schema: None,
            computed_values: raw.get("computedValues").filter(|v| !v.is_null()).cloned(),
            cluster: ClusterProperties::from_store(raw),
        }
    }
}

/// Sharding settings, only present for collections living in a cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProperties {
    pub shard_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_shards: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharding_strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribute_shards_like: Option<String>,
    /// Either a number or the string `"satellite"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_replication_factor: Option<u64>,
}

impl ClusterProperties {
    /// Returns `None` unless the source carries `shardKeys`.
    pub fn from_store(raw: &Value) -> Option<Self> {
        let shard_keys = raw.get("shardKeys")?.as_array()?;
        Some(Self {
            shard_keys: shard_keys
                .iter()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            number_of_shards: raw.get("numberOfShards").and_then(Value::as_u64),
            sharding_strategy: raw
                .get("shardingStrategy")
                .and_then(Value::as_str)
                .map(str::to_string),
            distribute_shards_like: raw
                .get("distributeShardsLike")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            replication_factor: raw.get("replicationFactor").filter(|v| !v.is_null()).cloned(),
            min_replication_factor: raw
                .get("minReplicationFactor")
                .or_else(|| raw.get("writeConcern"))
                .and_then(Value::as_u64),
        })
    }
}

// =============================================================================
// Indexes
// =============================================================================

/// Index keys worth carrying between environments besides type/fields/unique/sparse/name.
const INDEX_OPTION_KEYS: [&str; 10] = [
    "deduplicate",
    "selectivityEstimate",
    "estimates",
    "minLength",
    "geoJson",
    "constraint",
    "expireAfter",
    "cacheEnabled",
    "storedValues",
    "inBackground",
];

/// Reported by the store but rejected (or ignored) on creation.
const READ_ONLY_INDEX_KEYS: [&str; 3] = ["id", "selectivityEstimate", "figures"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSchema {
    #[serde(rename = "type")]
    pub index_type: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub sparse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl IndexSchema {
    /// Convert one entry of `GET /_api/index`. Primary indexes are dropped.
    pub fn from_store(raw: &Value) -> Option<Self> {
        let index_type = raw.get("type")?.as_str()?;
        if index_type == "primary" {
            return None;
        }
        let options = INDEX_OPTION_KEYS
            .iter()
            .filter_map(|key| {
                raw.get(*key)
                    .filter(|v| !v.is_null())
                    .map(|v| ((*key).to_string(), v.clone()))
            })
            .collect();
        Some(Self {
            index_type: index_type.to_string(),
            fields: raw
                .get("fields")
                .and_then(Value::as_array)
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(|f| f.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
            unique: raw.get("unique").and_then(Value::as_bool).unwrap_or(false),
            sparse: raw.get("sparse").and_then(Value::as_bool).unwrap_or(false),
            name: raw.get("name").and_then(Value::as_str).map(str::to_string),
            options,
        })
    }

    /// Indexes the store creates on its own (primary and edge).
    pub fn is_auto_managed(&self) -> bool {
        matches!(self.index_type.as_str(), "primary" | "edge")
    }

    /// Body for `POST /_api/index?collection=...`.
    pub fn creation_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("type".into(), json!(self.index_type));
        body.insert("fields".into(), json!(self.fields));
        body.insert("unique".into(), json!(self.unique));
        body.insert("sparse".into(), json!(self.sparse));
        if let Some(name) = &self.name {
            body.insert("name".into(), json!(name));
        }
        for (key, value) in &self.options {
            if READ_ONLY_INDEX_KEYS.contains(&key.as_str()) {
                continue;
            }
            if key == "storedValues" && value.as_array().is_some_and(|v| v.is_empty()) {
                continue;
            }
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}

// =============================================================================
// Graphs, views, analyzers, functions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSchema {
    pub name: String,
    #[serde(default)]
    pub edge_definitions: Vec<Value>,
    #[serde(default)]
    pub orphan_collections: Vec<String>,
    #[serde(default)]
    pub is_smart: bool,
    #[serde(default)]
    pub options: GraphOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_graph_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_shards: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_factor: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_replication_factor: Option<u64>,
}

impl GraphSchema {
    /// Convert one entry of `GET /_api/gharial`.
    pub fn from_store(raw: &Value) -> Option<Self> {
        let name = raw
            .get("name")
            .or_else(|| raw.get("_key"))
            .and_then(Value::as_str)?;
        Some(Self {
            name: name.to_string(),
            edge_definitions: raw
                .get("edgeDefinitions")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            orphan_collections: raw
                .get("orphanCollections")
                .and_then(Value::as_array)
                .map(|names| {
                    names
                        .iter()
                        .filter_map(|n| n.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
            is_smart: raw.get("isSmart").and_then(Value::as_bool).unwrap_or(false),
            options: GraphOptions {
                smart_graph_attribute: raw
                    .get("smartGraphAttribute")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                number_of_shards: raw.get("numberOfShards").and_then(Value::as_u64),
                replication_factor: raw
                    .get("replicationFactor")
                    .filter(|v| !v.is_null())
                    .cloned(),
                min_replication_factor: raw.get("minReplicationFactor").and_then(Value::as_u64),
            },
        })
    }

    /// Body for `POST /_api/gharial`. Options are only sent for smart graphs.
    pub fn creation_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "edgeDefinitions": self.edge_definitions,
            "orphanCollections": self.orphan_collections,
        });
        if self.is_smart {
            body["isSmart"] = json!(true);
            body["options"] = json!(self.options);
        }
        body
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: String,
    #[serde(default)]
    pub properties: Value,
}

impl ViewSchema {
    /// Convert a `{name, type, properties}` view listing entry.
    pub fn from_store(raw: &Value) -> Option<Self> {
        Some(Self {
            name: raw.get("name")?.as_str()?.to_string(),
            view_type: raw
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("arangosearch")
                .to_string(),
            properties: raw.get("properties").cloned().unwrap_or_else(|| json!({})),
        })
    }

    /// Body for `POST /_api/view`: properties flattened next to name and type.
    pub fn creation_body(&self) -> Value {
        let mut body = match &self.properties {
            Value::Object(props) => props.clone(),
            _ => Map::new(),
        };
        body.remove("id");
        body.remove("globallyUniqueId");
        body.insert("name".into(), json!(self.name));
        body.insert("type".into(), json!(self.view_type));
        Value::Object(body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub analyzer_type: String,
    #[serde(default)]
    pub properties: Value,
    #[serde(default)]
    pub features: Vec<String>,
}

impl AnalyzerSchema {
    /// Convert one entry of `GET /_api/analyzer`, keeping only analyzers
    /// scoped to a user database.
    pub fn from_store(raw: &Value) -> Option<Self> {
        let full_name = raw.get("name")?.as_str()?;
        let name = normalize_analyzer_name(full_name)?;
        Some(Self {
            name: name.to_string(),
            analyzer_type: raw
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            properties: raw.get("properties").cloned().unwrap_or_else(|| json!({})),
            features: raw
                .get("features")
                .and_then(Value::as_array)
                .map(|f| {
                    f.iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn creation_body(&self) -> Value {
        json!({
            "name": self.name,
            "type": self.analyzer_type,
            "properties": self.properties,
            "features": self.features,
        })
    }
}

/// Strip the `database::` scope from an analyzer name.
///
/// Built-in analyzers have no scope and `_system::` ones belong to the system
/// database; both yield `None`.
pub fn normalize_analyzer_name(full_name: &str) -> Option<&str> {
    if full_name.starts_with("_system") {
        return None;
    }
    let (_, name) = full_name.split_once("::")?;
    Some(name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSchema {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub is_deterministic: bool,
}

impl FunctionSchema {
    pub fn from_store(raw: &Value) -> Option<Self> {
        Some(Self {
            name: raw.get("name")?.as_str()?.to_string(),
            code: raw.get("code")?.as_str()?.to_string(),
            is_deterministic: raw
                .get("isDeterministic")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    pub fn creation_body(&self) -> Value {
        json!({
            "name": self.name,
            "code": self.code,
            "isDeterministic": self.is_deterministic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzer_names_lose_database_scope() {
        assert_eq!(normalize_analyzer_name("node-services::text_fr"), Some("text_fr"));
        assert_eq!(normalize_analyzer_name("_system::custom"), None);
        assert_eq!(normalize_analyzer_name("text_en"), None);
    }

    #[test]
    fn primary_index_is_not_extracted() {
        let raw = json!({"type": "primary", "fields": ["_key"], "unique": true});
        assert!(IndexSchema::from_store(&raw).is_none());
    }

    #[test]
    fn index_keeps_type_specific_options_only_when_present() {
        let raw = json!({
            "id": "services/123",
            "type": "persistent",
            "fields": ["categoryId", "order"],
            "unique": false,
            "sparse": false,
            "name": "idx_categoryId_order",
            "deduplicate": true,
            "estimates": true,
            "storedValues": [],
            "expireAfter": null
        });
        let index = IndexSchema::from_store(&raw).unwrap();

        assert_eq!(index.fields, vec!["categoryId", "order"]);
        assert!(index.options.contains_key("deduplicate"));
        assert!(!index.options.contains_key("expireAfter"));
        assert!(!index.options.contains_key("id"));

        let body = index.creation_body();
        assert_eq!(body["name"], "idx_categoryId_order");
        assert!(body.get("storedValues").is_none());
    }

    #[test]
    fn cluster_properties_require_shard_keys() {
        let single = json!({"waitForSync": false, "numberOfShards": 1});
        assert!(ClusterProperties::from_store(&single).is_none());

        let cluster = json!({
            "shardKeys": ["_key"],
            "numberOfShards": 3,
            "replicationFactor": 2,
            "minReplicationFactor": 1
        });
        let props = ClusterProperties::from_store(&cluster).unwrap();
        assert_eq!(props.number_of_shards, Some(3));
        assert_eq!(props.replication_factor, Some(json!(2)));
    }

    #[test]
    fn creation_options_map_kind_to_type_code() {
        let collection = CollectionSchema {
            name: "categoryServices".into(),
            kind: CollectionKind::Edge,
            properties: CollectionProperties {
                wait_for_sync: true,
                key_options: Some(json!({"type": "traditional", "allowUserKeys": true})),
                computed_values: Some(json!([])),
                ..Default::default()
            },
            indexes: vec![],
        };

        let options = collection.creation_options(None);
        assert_eq!(options["type"], 3);
        assert_eq!(options["waitForSync"], true);
        assert!(options.get("computedValues").is_none());
        assert!(options.get("schema").is_none());
        assert!(options.get("shardKeys").is_none());
    }

    #[test]
    fn schema_document_survives_json_round_trip_with_null_schema() {
        let mut doc = SchemaDocument::empty("node-services");
        doc.collections.push(CollectionSchema::minimal(
            "users",
            CollectionKind::Document,
            Some(&json!({"waitForSync": false, "keyOptions": {"type": "traditional"}})),
            vec![],
        ));

        let text = serde_json::to_string(&doc).unwrap();
        assert!(text.contains("\"schema\":null"));
        assert!(text.contains("\"type\":\"document\""));

        let back: SchemaDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn view_body_drops_server_assigned_ids() {
        let view = ViewSchema {
            name: "servicesView".into(),
            view_type: "arangosearch".into(),
            properties: json!({"id": "42", "globallyUniqueId": "h1/42", "links": {}}),
        };
        let body = view.creation_body();
        assert!(body.get("id").is_none());
        assert_eq!(body["name"], "servicesView");
        assert_eq!(body["type"], "arangosearch");
        assert!(body.get("links").is_some());
    }
}
