//! Workflow and step identifiers

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::WorkflowError;

/// Maximum length for workflow and step identifiers
pub const MAX_ID_LENGTH: usize = 50;

/// Lowercase alphanumeric with underscores and hyphens, starting with alphanumeric
static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("identifier pattern is valid"));

/// Validate an identifier string
pub fn validate_identifier(kind: &str, id: &str) -> Result<(), WorkflowError> {
    if id.is_empty() {
        return Err(WorkflowError::invalid_id(format!("{} ID cannot be empty", kind)));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(WorkflowError::invalid_id(format!(
            "{} ID exceeds maximum length of {} characters",
            kind, MAX_ID_LENGTH
        )));
    }

    if !ID_PATTERN.is_match(id) {
        return Err(WorkflowError::invalid_id(format!(
            "Invalid {} ID '{}': must be lowercase alphanumeric with '_' or '-'",
            kind.to_lowercase(),
            id
        )));
    }

    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Cow<'static, str>);

        impl $name {
            /// Create a new validated identifier
            pub fn new(id: impl Into<String>) -> Result<Self, WorkflowError> {
                let id = id.into();
                validate_identifier($kind, &id)?;
                Ok(Self(Cow::Owned(id)))
            }

            /// Build an identifier from a static string without validation.
            ///
            /// Static identifiers are validated when the owning workflow is registered.
            pub const fn from_static(id: &'static str) -> Self {
                Self(Cow::Borrowed(id))
            }

            /// Get the ID as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Re-run validation, used at registration time
            pub fn validate(&self) -> Result<(), WorkflowError> {
                validate_identifier($kind, &self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = WorkflowError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.into_owned()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Identifier of a registered workflow
    WorkflowId,
    "Workflow"
);

identifier!(
    /// Identifier of a step, unique within its workflow
    StepId,
    "Step"
);
