use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::{GroundingSupport, Source};
use serde_json::Value;
use std::collections::HashMap;

pub const PLACEHOLDER_TITLE: &str = "Unknown Source";

/// Strip exactly one trailing slash so `http://a.com/` and `http://a.com` collide.
pub fn normalize_uri(uri: &str) -> &str {
    uri.strip_suffix('/').unwrap_or(uri)
}

#[derive(Debug, Clone)]
pub struct CitationExtractor {
    placeholder_title: String,
}

impl CitationExtractor {
    pub fn new(placeholder_title: impl Into<String>) -> Self {
        Self {
            placeholder_title: placeholder_title.into(),
        }
    }

    /// Turn raw grounding chunks into a deduplicated source list.
    pub fn extract(&self, chunks: &[Value], diagnostics: &mut Diagnostics) -> Citations {
        let mut citations = Citations {
            sources: Vec::new(),
            by_uri: HashMap::new(),
            chunk_sources: Vec::with_capacity(chunks.len()),
        };

        for (chunk_index, raw) in chunks.iter().enumerate() {
            // Only `web.uri` decides whether a chunk counts; a bad title
            // just means the placeholder.
            let web = raw.get("web");
            let uri = web
                .and_then(|web| web.get("uri"))
                .and_then(Value::as_str)
                .map(normalize_uri)
                .unwrap_or_default();
            if uri.is_empty() {
                diagnostics.record(Diagnostic::SkippedChunk { chunk_index });
                citations.chunk_sources.push(None);
                continue;
            }

            let title = web
                .and_then(|web| web.get("title"))
                .and_then(Value::as_str)
                .filter(|title| !title.is_empty())
                .map(str::to_string);
            let position = citations.upsert(uri, title, &self.placeholder_title);
            citations.chunk_sources.push(Some(position));
        }

        citations
    }
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new(PLACEHOLDER_TITLE)
    }
}

/// Sources in first-seen order plus the positional chunk -> source map.
#[derive(Debug, Clone)]
pub struct Citations {
    sources: Vec<Source>,
    /// Normalized uri -> position in `sources`
    by_uri: HashMap<String, usize>,
    /// Chunk position -> position in `sources`
    chunk_sources: Vec<Option<usize>>,
}

impl Citations {
    fn upsert(&mut self, uri: &str, title: Option<String>, placeholder: &str) -> usize {
        if let Some(&position) = self.by_uri.get(uri) {
            let existing = &mut self.sources[position];
            // Titles only move away from the placeholder, never back or sideways.
            if existing.title == placeholder {
                if let Some(title) = title {
                    existing.title = title;
                }
            }
            return position;
        }

        let position = self.sources.len();
        self.sources.push(Source {
            title: title.unwrap_or_else(|| placeholder.to_string()),
            uri: uri.to_string(),
            citation_count: 0,
        });
        self.by_uri.insert(uri.to_string(), position);
        position
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    fn source_position(&self, chunk_index: i64) -> Option<usize> {
        let index = usize::try_from(chunk_index).ok()?;
        self.chunk_sources.get(index).copied().flatten()
    }

    /// Pass supports through and bump citation counts.
    ///
    /// Only entries that are not JSON objects are dropped; they carry no
    /// chunk indices to count.
    pub fn link_supports(
        &mut self,
        supports: &[Value],
        diagnostics: &mut Diagnostics,
    ) -> Vec<GroundingSupport> {
        let mut linked = Vec::with_capacity(supports.len());

        for (support_index, raw) in supports.iter().enumerate() {
            let support = match serde_json::from_value::<GroundingSupport>(raw.clone()) {
                Ok(support) => support,
                Err(e) => {
                    diagnostics.record(Diagnostic::SkippedSupport {
                        support_index,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for &chunk_index in &support.grounding_chunk_indices {
                match self.source_position(chunk_index) {
                    Some(position) => self.sources[position].citation_count += 1,
                    None => diagnostics.record(Diagnostic::UnresolvedChunkIndex {
                        support_index,
                        chunk_index,
                    }),
                }
            }

            linked.push(support);
        }

        linked
    }

    pub fn into_sources(self) -> Vec<Source> {
        self.sources
    }
}
