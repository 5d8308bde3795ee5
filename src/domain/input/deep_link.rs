//! Deep-link parameter parsing
//!
//! Invite links carry a single `<type>_<code>` parameter (e.g. `school_abc123`).
//! It is parsed once when a workflow starts and stored in the state data.

use serde::{Deserialize, Serialize};

/// Separator between deep-link segments
pub const DEEP_LINK_SEPARATOR: char = '_';

/// Parsed invite parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLinkData {
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    /// Set by channel adapters that carry a payload beside the parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl DeepLinkData {
    /// Parse an invite parameter; an empty parameter means no deep link.
    ///
    /// Only the first separator splits, so codes may contain `_`.
    pub fn parse(param: &str) -> Option<Self> {
        let param = param.trim();
        if param.is_empty() {
            return None;
        }

        let (kind, code) = param
            .split_once(DEEP_LINK_SEPARATOR)
            .unwrap_or((param, ""));

        Some(Self {
            kind: kind.to_string(),
            code: code.to_string(),
            extra: None,
        })
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }
}
