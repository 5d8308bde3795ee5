//! Account entities used by the dialog workflows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Registered end user, linked to the channel identity that created it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub platform: String,
    pub user_id: String,
    pub phone: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        platform: impl Into<String>,
        user_id: impl Into<String>,
        phone: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            user_id: user_id.into(),
            phone: phone.into(),
            name: name.into(),
            group_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_group(mut self, group_id: Option<String>) -> Self {
        self.group_id = group_id;
        self
    }
}

/// Selectable group offered to users arriving through a school invite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Order that can be rated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub number: String,
    pub title: String,
}

impl Order {
    pub fn new(number: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
        }
    }
}

/// Rating submitted for an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub order_number: String,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Rating {
    pub fn new(order_number: impl Into<String>, score: u8) -> Result<Self, DomainError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(DomainError::validation(format!(
                "Score must be between {} and {}",
                MIN_SCORE, MAX_SCORE
            )));
        }

        Ok(Self {
            order_number: order_number.into(),
            score,
            comment: None,
        })
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|c| !c.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_score_bounds() {
        assert!(Rating::new("A-1", 0).is_err());
        assert!(Rating::new("A-1", 6).is_err());
        assert_eq!(Rating::new("A-1", 5).unwrap().score, 5);
    }

    #[test]
    fn test_blank_comment_dropped() {
        let rating = Rating::new("A-1", 4)
            .unwrap()
            .with_comment(Some("  ".to_string()));
        assert_eq!(rating.comment, None);
    }
}
