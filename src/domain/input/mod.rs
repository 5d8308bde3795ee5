//! Input normalization
//!
//! Converts channel-specific events (text, button presses, shared contacts)
//! into a single [`UserInput`] shape, including the callback token codec,
//! deep-link parsing, phone validation and numbered-menu matching.

pub mod callback;
mod deep_link;
mod numbered_menu;
mod phone;
mod user_input;

pub use callback::{is_workflow_token, CallbackData, CALLBACK_DELIMITER, CALLBACK_PREFIX};
pub use deep_link::{DeepLinkData, DEEP_LINK_SEPARATOR};
pub use numbered_menu::{Choice, NumberedMenu};
pub use phone::{is_valid_phone, normalize_phone, MAX_PHONE_DIGITS, MIN_PHONE_DIGITS};
pub use user_input::{InboundEvent, UserInput};
