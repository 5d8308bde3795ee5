//! Callback token codec
//!
//! Interactive choices travel as opaque tokens of the form
//! `<prefix>:<action>[:<value>]`, e.g. `wf:select:42`. Text-only channels
//! resolve typed numerals back to the same tokens, so steps only ever see
//! decoded [`CallbackData`].

use std::fmt;

/// Prefix of every token produced by the dialog engine
pub const CALLBACK_PREFIX: &str = "wf";

/// Separator between token segments
pub const CALLBACK_DELIMITER: char = ':';

pub const ACTION_SELECT: &str = "select";
pub const ACTION_PAGE: &str = "page";
pub const ACTION_CONFIRM: &str = "confirm";
pub const ACTION_CANCEL: &str = "cancel";
pub const ACTION_BACK: &str = "back";
pub const ACTION_NOOP: &str = "noop";

/// Decoded callback token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    pub action: String,
    pub value: String,
}

impl CallbackData {
    pub fn new(action: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            value: value.into(),
        }
    }

    pub fn select(id: impl Into<String>) -> Self {
        Self::new(ACTION_SELECT, id)
    }

    pub fn page(page: u32) -> Self {
        Self::new(ACTION_PAGE, page.to_string())
    }

    pub fn confirm() -> Self {
        Self::new(ACTION_CONFIRM, "")
    }

    pub fn cancel() -> Self {
        Self::new(ACTION_CANCEL, "")
    }

    pub fn back() -> Self {
        Self::new(ACTION_BACK, "")
    }

    pub fn noop() -> Self {
        Self::new(ACTION_NOOP, "")
    }

    /// Decode a wire token; returns `None` for tokens not produced by the engine
    pub fn decode(token: &str) -> Option<Self> {
        let rest = token
            .strip_prefix(CALLBACK_PREFIX)?
            .strip_prefix(CALLBACK_DELIMITER)?;

        let (action, value) = match rest.split_once(CALLBACK_DELIMITER) {
            Some((action, value)) => (action, value),
            None => (rest, ""),
        };

        if action.is_empty() {
            return None;
        }

        Some(Self::new(action, value))
    }

    /// Encode to the wire format
    pub fn encode(&self) -> String {
        if self.value.is_empty() {
            format!("{}{}{}", CALLBACK_PREFIX, CALLBACK_DELIMITER, self.action)
        } else {
            format!(
                "{}{}{}{}{}",
                CALLBACK_PREFIX, CALLBACK_DELIMITER, self.action, CALLBACK_DELIMITER, self.value
            )
        }
    }

    pub fn is_select(&self) -> bool {
        self.action == ACTION_SELECT
    }

    pub fn is_page(&self) -> bool {
        self.action == ACTION_PAGE
    }

    pub fn is_confirm(&self) -> bool {
        self.action == ACTION_CONFIRM
    }

    pub fn is_cancel(&self) -> bool {
        self.action == ACTION_CANCEL
    }

    pub fn is_back(&self) -> bool {
        self.action == ACTION_BACK
    }

    pub fn is_noop(&self) -> bool {
        self.action == ACTION_NOOP
    }

    /// Requested page for `page` tokens
    pub fn page_number(&self) -> Option<u32> {
        if !self.is_page() {
            return None;
        }
        self.value.parse().ok().filter(|page| *page > 0)
    }

    /// Selected item identifier for `select` tokens
    pub fn selected_id(&self) -> Option<&str> {
        if self.is_select() && !self.value.is_empty() {
            Some(&self.value)
        } else {
            None
        }
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Whether a raw token carries the engine prefix
pub fn is_workflow_token(token: &str) -> bool {
    token
        .strip_prefix(CALLBACK_PREFIX)
        .is_some_and(|rest| rest.starts_with(CALLBACK_DELIMITER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_select() {
        let data = CallbackData::decode("wf:select:42").unwrap();
        assert_eq!(data, CallbackData::new("select", "42"));
        assert!(data.is_select());
        assert_eq!(data.selected_id(), Some("42"));
        assert_eq!(data.page_number(), None);
    }

    #[test]
    fn test_decode_without_value() {
        let data = CallbackData::decode("wf:confirm").unwrap();
        assert!(data.is_confirm());
        assert_eq!(data.value, "");
        assert_eq!(data.selected_id(), None);
    }

    #[test]
    fn test_decode_value_keeps_delimiters() {
        let data = CallbackData::decode("wf:select:order:17").unwrap();
        assert_eq!(data.action, "select");
        assert_eq!(data.value, "order:17");
    }

    #[test]
    fn test_decode_rejects_foreign_tokens() {
        assert!(CallbackData::decode("x").is_none());
        assert!(CallbackData::decode("wf").is_none());
        assert!(CallbackData::decode("wf:").is_none());
        assert!(CallbackData::decode("wfx:select:1").is_none());
    }

    #[test]
    fn test_is_workflow_token() {
        assert!(is_workflow_token("wf:x"));
        assert!(!is_workflow_token("x"));
        assert!(!is_workflow_token("wfselect"));
    }

    #[test]
    fn test_page_number() {
        assert_eq!(CallbackData::page(3).page_number(), Some(3));
        assert_eq!(CallbackData::new("page", "0").page_number(), None);
        assert_eq!(CallbackData::new("page", "abc").page_number(), None);
    }

    #[test]
    fn test_encode() {
        assert_eq!(CallbackData::select("42").encode(), "wf:select:42");
        assert_eq!(CallbackData::noop().encode(), "wf:noop");
        assert_eq!(CallbackData::page(2).to_string(), "wf:page:2");
    }
}
