use regex::Regex;
use std::sync::LazyLock;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[ \t]*(?i:json)[ \t]*\r?\n?(.*?)```").unwrap());

// The info string only exists when the fence line ends in a newline;
// a single-line fence is all interior.
static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:[^\n`{]*\n)?(.*?)```").unwrap());

/// Raw response text split into prose and the part that should hold the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedPayload {
    pub summary: String,
    pub payload_candidate: String,
}

/// Split a model response into summary and payload candidate.
///
/// Precedence: a ```json fence, then any fence, then everything from the first
/// `{`, then the whole text. Whatever precedes the payload is the summary.
pub fn isolate_payload(text: &str) -> IsolatedPayload {
    for fence in [&*JSON_FENCE, &*ANY_FENCE] {
        if let Some(captures) = fence.captures(text) {
            let (Some(whole), Some(interior)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            return IsolatedPayload {
                summary: text[..whole.start()].trim().to_string(),
                payload_candidate: interior.as_str().to_string(),
            };
        }
    }

    match text.find('{') {
        Some(brace) => IsolatedPayload {
            summary: text[..brace].trim().to_string(),
            payload_candidate: text[brace..].to_string(),
        },
        None => IsolatedPayload {
            summary: String::new(),
            payload_candidate: text.to_string(),
        },
    }
}
