use serde::Serialize;
use tracing::{debug, warn};

/// Something the pipeline skipped, dropped or recovered from.
/// None of these fail a run; they are reported next to the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    #[serde(rename_all = "camelCase")]
    SkippedChunk { chunk_index: usize },
    #[serde(rename_all = "camelCase")]
    SkippedSupport { support_index: usize, reason: String },
    #[serde(rename_all = "camelCase")]
    UnresolvedChunkIndex { support_index: usize, chunk_index: i64 },
    #[serde(rename_all = "camelCase")]
    SkippedQuery { query_index: usize },
    #[serde(rename_all = "camelCase")]
    GraphParseRecovered { message: String },
    InvalidGraphShape,
    #[serde(rename_all = "camelCase")]
    NodeMissingId { node_index: usize },
    DuplicateNode { id: String },
    #[serde(rename_all = "camelCase")]
    UnknownNodeType { id: String, raw_type: String },
    DanglingEdge { source: String, target: String },
    #[serde(rename_all = "camelCase")]
    MalformedEdge { edge_index: usize },
}

/// Collects diagnostics for a single run and mirrors each one to `tracing`.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::DanglingEdge { source, target } => {
                warn!(source = %source, target = %target, "Dropping edge with missing endpoint");
            }
            Diagnostic::GraphParseRecovered { message } => {
                warn!(error = %message, "Graph payload unparseable, keeping citations only");
            }
            Diagnostic::InvalidGraphShape => {
                warn!("Graph payload lacks nodes/edges arrays");
            }
            Diagnostic::DuplicateNode { id } => {
                warn!(id = %id, "Duplicate node id, keeping first occurrence");
            }
            other => {
                debug!(diagnostic = ?other, "Skipped malformed input entry");
            }
        }
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record(Diagnostic::SkippedChunk { chunk_index: 3 });
        diagnostics.record(Diagnostic::InvalidGraphShape);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.into_vec(),
            vec![
                Diagnostic::SkippedChunk { chunk_index: 3 },
                Diagnostic::InvalidGraphShape,
            ]
        );
    }

    #[test]
    fn test_serialized_with_kind_tag() {
        let json = serde_json::to_value(Diagnostic::DanglingEdge {
            source: "1".to_string(),
            target: "999".to_string(),
        })
        .unwrap();

        assert_eq!(json["kind"], "danglingEdge");
        assert_eq!(json["target"], "999");
    }
}
