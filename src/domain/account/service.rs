//! Account service trait (auth / CRM collaborator)

use async_trait::async_trait;

use super::entity::{Account, Group, Order, Rating};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Back-office operations the dialog workflows call into
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Account linked to a channel identity
    async fn find_account(
        &self,
        platform: &str,
        user_id: &str,
    ) -> Result<Option<Account>, DomainError>;

    /// Register or relink an account
    async fn register(&self, account: Account) -> Result<Account, DomainError>;

    /// Groups offered for a school invite code
    async fn list_groups(&self, school_code: &str) -> Result<Vec<Group>, DomainError>;

    /// Orders placed by the account with this phone
    async fn list_orders(&self, phone: &str) -> Result<Vec<Order>, DomainError>;

    /// Store a rating for an order
    async fn submit_rating(&self, phone: &str, rating: Rating) -> Result<(), DomainError>;
}
