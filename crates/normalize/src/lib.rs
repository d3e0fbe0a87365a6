pub mod annotate;
pub mod citations;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod payload;
pub mod prompt;
pub mod sanitizer;
pub mod schema;

pub use annotate::{annotate_summary, renderable_supports};
pub use citations::{CitationExtractor, Citations, PLACEHOLDER_TITLE};
pub use config::NormalizerConfig;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{NormalizeError, Result};
pub use payload::{IsolatedPayload, isolate_payload};
pub use prompt::build_graph_prompt;
pub use sanitizer::GraphSanitizer;
pub use schema::{
    GraphData, GraphLink, GraphNode, GraphResult, GroundingSupport, NodeType, RawResponse,
    Segment, Source,
};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Pipeline output: the result record plus everything that was skipped on the way.
#[derive(Debug, Clone, Serialize)]
pub struct Normalized {
    pub result: GraphResult,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer {
    citations: CitationExtractor,
    sanitizer: GraphSanitizer,
}

impl ResponseNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            citations: CitationExtractor::new(config.placeholder_title),
            sanitizer: GraphSanitizer::new(config.strict_shape),
        }
    }

    /// Turn one raw model response into a consistent graph and citation list.
    pub fn normalize(&self, raw: &RawResponse) -> Result<Normalized> {
        let mut diagnostics = Diagnostics::new();

        let mut citations = self.citations.extract(&raw.grounding_chunks, &mut diagnostics);
        let grounding_supports = citations.link_supports(&raw.grounding_supports, &mut diagnostics);
        let search_queries = collect_queries(&raw.search_queries, &mut diagnostics);

        let IsolatedPayload {
            summary,
            payload_candidate,
        } = isolate_payload(&raw.text);

        let graph_data =
            self.sanitizer
                .sanitize(&payload_candidate, citations.has_sources(), &mut diagnostics)?;

        let result = GraphResult {
            graph_data,
            sources: citations.into_sources(),
            search_queries,
            summary,
            grounding_supports,
        };

        debug!(
            nodes = result.graph_data.nodes.len(),
            edges = result.graph_data.edges.len(),
            sources = result.sources.len(),
            diagnostics = diagnostics.len(),
            "Normalized model response"
        );

        Ok(Normalized {
            result,
            diagnostics: diagnostics.into_vec(),
        })
    }
}

/// Normalize with default settings.
pub fn normalize_response(raw: &RawResponse) -> Result<Normalized> {
    ResponseNormalizer::default().normalize(raw)
}

fn collect_queries(raw: &[Value], diagnostics: &mut Diagnostics) -> Vec<String> {
    raw.iter()
        .enumerate()
        .filter_map(|(query_index, query)| match query.as_str() {
            Some(query) => Some(query.to_string()),
            None => {
                diagnostics.record(Diagnostic::SkippedQuery { query_index });
                None
            }
        })
        .collect()
}
