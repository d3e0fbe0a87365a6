use crate::schema::GroundingSupport;
use std::collections::{BTreeMap, BTreeSet};

/// Supports whose segment actually lies inside `summary`.
///
/// Segment offsets are UTF-8 byte offsets. Spans past the end of the summary
/// point at text that was stripped out (usually the JSON block) and spans
/// that split a character cannot be rendered, so both are left out.
pub fn renderable_supports<'a>(
    summary: &str,
    supports: &'a [GroundingSupport],
) -> Vec<&'a GroundingSupport> {
    supports
        .iter()
        .filter(|support| byte_range(summary, support).is_some())
        .collect()
}

fn byte_range(summary: &str, support: &GroundingSupport) -> Option<(usize, usize)> {
    let segment = support.segment.as_ref()?;
    // A missing start means the span opens the summary.
    let start = usize::try_from(segment.start_index.unwrap_or(0)).ok()?;
    let end = usize::try_from(segment.end_index?).ok()?;

    if start >= end || end > summary.len() {
        return None;
    }
    if !summary.is_char_boundary(start) || !summary.is_char_boundary(end) {
        return None;
    }
    Some((start, end))
}

/// Insert `[n]` markers (1-based chunk numbers) after every cited segment.
pub fn annotate_summary(summary: &str, supports: &[GroundingSupport]) -> String {
    let mut markers: BTreeMap<usize, BTreeSet<i64>> = BTreeMap::new();

    for support in supports {
        let Some((_, end)) = byte_range(summary, support) else {
            continue;
        };
        let cited = support
            .grounding_chunk_indices
            .iter()
            .copied()
            .filter(|&index| index >= 0);
        markers.entry(end).or_default().extend(cited);
    }

    let mut annotated = String::with_capacity(summary.len() + markers.len() * 4);
    let mut cursor = 0;
    for (end, indices) in markers {
        annotated.push_str(&summary[cursor..end]);
        for index in indices {
            annotated.push_str(&format!("[{}]", index + 1));
        }
        cursor = end;
    }
    annotated.push_str(&summary[cursor..]);
    annotated
}
