//! Numbered plain-text menus for channels without native buttons
//!
//! The same option set a button channel renders natively is flattened into
//! a `1. …` list. A typed numeral (or the exact label) maps back to the
//! option by position, so the step receives the same token either way.

use serde::{Deserialize, Serialize};

use super::callback::CallbackData;
use crate::domain::messenger::Button;

/// One selectable entry of a numbered menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown to the user (and sent back as text for plain menus)
    pub label: String,
    /// Callback token for inline buttons, `None` for reply-keyboard labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Choice {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: None,
        }
    }

    pub fn button(button: &Button) -> Self {
        Self {
            label: button.text.clone(),
            token: Some(button.callback_data.clone()),
        }
    }
}

/// Ordered list of choices offered in one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedMenu {
    choices: Vec<Choice>,
}

impl NumberedMenu {
    pub fn new(choices: Vec<Choice>) -> Self {
        Self { choices }
    }

    /// Flatten reply-keyboard rows of labels
    pub fn from_labels(rows: &[Vec<String>]) -> Self {
        Self::new(rows.iter().flatten().map(Choice::label).collect())
    }

    /// Flatten inline button rows, dropping inert placeholders
    pub fn from_buttons(rows: &[Vec<Button>]) -> Self {
        Self::new(
            rows.iter()
                .flatten()
                .filter(|button| !button.is_noop())
                .map(Choice::button)
                .collect(),
        )
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Render as `1. label` lines
    pub fn render(&self) -> String {
        self.choices
            .iter()
            .enumerate()
            .map(|(index, choice)| format!("{}. {}", index + 1, choice.label))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Resolve user text to a choice: 1-based numeral first, then exact label
    pub fn match_input(&self, text: &str) -> Option<&Choice> {
        let text = text.trim().trim_end_matches('.');
        if text.is_empty() {
            return None;
        }

        if let Ok(position) = text.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|index| self.choices.get(index));
        }

        self.choices
            .iter()
            .find(|choice| choice.label.eq_ignore_ascii_case(text))
    }

    /// Decoded callback for a matched choice, if it carries an engine token
    pub fn match_callback(&self, text: &str) -> Option<CallbackData> {
        self.match_input(text)
            .and_then(|choice| choice.token.as_deref())
            .and_then(CallbackData::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Vec<Button>> {
        vec![
            vec![
                Button::new("Order 11", CallbackData::select("11")),
                Button::new("Order 12", CallbackData::select("12")),
            ],
            vec![
                Button::new("«", CallbackData::page(1)),
                Button::placeholder("2/3"),
                Button::new("»", CallbackData::page(3)),
            ],
        ]
    }

    #[test]
    fn test_from_buttons_skips_placeholders() {
        let menu = NumberedMenu::from_buttons(&grid());
        assert_eq!(menu.len(), 4);
        assert_eq!(menu.render(), "1. Order 11\n2. Order 12\n3. «\n4. »");
    }

    #[test]
    fn test_numeral_resolves_same_token_as_button() {
        let menu = NumberedMenu::from_buttons(&grid());
        let callback = menu.match_callback("2").unwrap();
        assert_eq!(callback, CallbackData::select("12"));

        let page = menu.match_callback(" 4. ").unwrap();
        assert_eq!(page.page_number(), Some(3));
    }

    #[test]
    fn test_out_of_range_numerals() {
        let menu = NumberedMenu::from_buttons(&grid());
        assert!(menu.match_input("0").is_none());
        assert!(menu.match_input("5").is_none());
        assert!(menu.match_input("").is_none());
    }

    #[test]
    fn test_label_menu_matches_text() {
        let menu = NumberedMenu::from_labels(&[
            vec!["Profile".to_string(), "Rate an order".to_string()],
            vec!["Log out".to_string()],
        ]);
        assert_eq!(menu.match_input("3").unwrap().label, "Log out");
        assert_eq!(menu.match_input("rate an order").unwrap().label, "Rate an order");
        assert!(menu.match_input("3").unwrap().token.is_none());
        assert!(menu.match_callback("1").is_none());
    }
}
