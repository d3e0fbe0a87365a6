use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{NormalizeError, Result};
use crate::schema::{GraphData, GraphLink, GraphNode, NodeType};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Turns a payload candidate into a referentially consistent graph.
#[derive(Debug, Clone, Default)]
pub struct GraphSanitizer {
    strict_shape: bool,
}

impl GraphSanitizer {
    pub fn new(strict_shape: bool) -> Self {
        Self { strict_shape }
    }

    /// Parse and clean the candidate.
    ///
    /// `has_sources` decides whether an unparseable payload degrades to an
    /// empty graph (citations are still worth returning) or fails the run.
    pub fn sanitize(
        &self,
        candidate: &str,
        has_sources: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<GraphData> {
        let narrowed = narrow_to_object(candidate);

        let parsed: Value = match serde_json::from_str(narrowed) {
            Ok(value) => value,
            Err(e) if has_sources => {
                diagnostics.record(Diagnostic::GraphParseRecovered {
                    message: e.to_string(),
                });
                return Ok(GraphData::default());
            }
            Err(e) => {
                return Err(NormalizeError::GraphParse {
                    message: e.to_string(),
                });
            }
        };

        let nodes = parsed.get("nodes").and_then(Value::as_array);
        let edges = parsed.get("edges").and_then(Value::as_array);

        match (nodes, edges) {
            (Some(nodes), Some(edges)) => Ok(sanitize_elements(nodes, edges, diagnostics)),
            _ if self.strict_shape && !has_sources => Err(NormalizeError::InvalidGraphShape),
            _ => {
                diagnostics.record(Diagnostic::InvalidGraphShape);
                Ok(GraphData::default())
            }
        }
    }
}

/// Narrow to the outermost `{ ... }` span, if there is one.
pub fn narrow_to_object(candidate: &str) -> &str {
    match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if start < end => &candidate[start..=end],
        _ => candidate,
    }
}

/// Deduplicate nodes by id and drop edges whose endpoints did not survive.
pub fn sanitize_elements(
    raw_nodes: &[Value],
    raw_edges: &[Value],
    diagnostics: &mut Diagnostics,
) -> GraphData {
    let mut ids: HashSet<String> = HashSet::with_capacity(raw_nodes.len());
    let mut nodes = Vec::with_capacity(raw_nodes.len());

    for (node_index, raw) in raw_nodes.iter().enumerate() {
        let Some(node) = parse_node(node_index, raw, diagnostics) else {
            continue;
        };
        if !ids.insert(node.id.clone()) {
            diagnostics.record(Diagnostic::DuplicateNode { id: node.id });
            continue;
        }
        nodes.push(node);
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for (edge_index, raw) in raw_edges.iter().enumerate() {
        let endpoints = raw.as_object().and_then(|edge| {
            let source = edge.get("source").and_then(coerce_endpoint)?;
            let target = edge.get("target").and_then(coerce_endpoint)?;
            Some((edge, source, target))
        });

        let Some((edge, source, target)) = endpoints else {
            diagnostics.record(Diagnostic::MalformedEdge { edge_index });
            continue;
        };

        if !ids.contains(&source) || !ids.contains(&target) {
            diagnostics.record(Diagnostic::DanglingEdge { source, target });
            continue;
        }

        edges.push(GraphLink {
            source,
            target,
            relation: string_field(edge, "relation").unwrap_or_default(),
        });
    }

    GraphData { nodes, edges }
}

fn parse_node(node_index: usize, raw: &Value, diagnostics: &mut Diagnostics) -> Option<GraphNode> {
    let object = raw.as_object();
    let id = object
        .and_then(|node| node.get("id"))
        .and_then(coerce_id)
        .filter(|id| !id.is_empty());

    let (Some(node), Some(id)) = (object, id) else {
        diagnostics.record(Diagnostic::NodeMissingId { node_index });
        return None;
    };

    let node_type = match node.get("type").and_then(Value::as_str) {
        Some(raw_type) => NodeType::parse(raw_type).unwrap_or_else(|| {
            diagnostics.record(Diagnostic::UnknownNodeType {
                id: id.clone(),
                raw_type: raw_type.to_string(),
            });
            NodeType::Concept
        }),
        None => NodeType::Concept,
    };

    Some(GraphNode {
        label: string_field(node, "label").unwrap_or_else(|| id.clone()),
        description: string_field(node, "description").unwrap_or_default(),
        val: node.get("val").and_then(Value::as_f64),
        node_type,
        id,
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Ids may arrive as strings, numbers or booleans; all compare as strings.
fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// An endpoint is an id, or a node object carrying one (force layouts
/// replace endpoint ids with node references when a graph is persisted).
fn coerce_endpoint(value: &Value) -> Option<String> {
    match value {
        Value::Object(node) => node.get("id").and_then(coerce_id),
        other => coerce_id(other),
    }
}
