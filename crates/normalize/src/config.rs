use crate::citations::PLACEHOLDER_TITLE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Title given to a source whose chunk carried none.
    pub placeholder_title: String,
    /// Treat a payload without `nodes`/`edges` arrays as fatal when no
    /// sources were extracted, like an unparseable payload.
    pub strict_shape: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            placeholder_title: PLACEHOLDER_TITLE.to_string(),
            strict_shape: false,
        }
    }
}
