use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Raw model response as handed over by the model/search collaborator.
/// Every list is untyped on purpose; entries are validated one by one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    pub text: String,
    #[serde(default)]
    pub grounding_chunks: Vec<Value>,
    #[serde(default)]
    pub grounding_supports: Vec<Value>,
    #[serde(default)]
    pub search_queries: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub title: String,
    pub uri: String,
    pub citation_count: u32,
}

/// Span of the summary a support refers to.
///
/// Fields of an unexpected type read as absent instead of rejecting the
/// support; unknown fields are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end_index: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingSupport {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    #[serde(default, deserialize_with = "lenient_indices")]
    pub grounding_chunk_indices: Vec<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<Vec<f64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A field that does not fit its type (including `null`) reads as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keep every integer index, skip anything else in the list.
fn lenient_indices<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|indices| indices.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Person,
    Organization,
    Place,
    Event,
    CreativeWork,
    Product,
    Concept,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Person,
        NodeType::Organization,
        NodeType::Place,
        NodeType::Event,
        NodeType::CreativeWork,
        NodeType::Product,
        NodeType::Concept,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Person => "person",
            NodeType::Organization => "organization",
            NodeType::Place => "place",
            NodeType::Event => "event",
            NodeType::CreativeWork => "creativeWork",
            NodeType::Product => "product",
            NodeType::Concept => "concept",
        }
    }

    /// Lenient lookup: ignores case, spaces, dashes and underscores.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|&c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str().to_lowercase() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub relation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphLink>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// The immutable output of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphResult {
    pub graph_data: GraphData,
    pub sources: Vec<Source>,
    pub search_queries: Vec<String>,
    pub summary: String,
    pub grounding_supports: Vec<GroundingSupport>,
}
