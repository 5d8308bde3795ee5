//! In-memory account service with seeded catalog data

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::domain::account::{Account, AccountService, Group, Order, Rating};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Store {
    /// keyed by `platform:user_id`
    accounts: HashMap<String, Account>,
    /// keyed by school code
    groups: HashMap<String, Vec<Group>>,
    /// keyed by phone
    orders: HashMap<String, Vec<Order>>,
    ratings: Vec<(String, Rating)>,
}

/// Account service kept in process memory.
///
/// Backs the console channel and tests; a CRM integration implements the
/// same trait.
#[derive(Debug, Default)]
pub struct InMemoryAccountService {
    store: RwLock<Store>,
}

impl InMemoryAccountService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with a demo school and a few orders for every registered phone
    pub fn with_demo_data() -> Self {
        let groups = (1..=7)
            .map(|n| Group::new(format!("g{}", n), format!("Group {}", n)))
            .collect();

        Self::new().with_groups("abc123", groups)
    }

    pub fn with_groups(self, school_code: impl Into<String>, groups: Vec<Group>) -> Self {
        if let Ok(mut store) = self.store.write() {
            store.groups.insert(school_code.into(), groups);
        }
        self
    }

    pub fn with_orders(self, phone: impl Into<String>, orders: Vec<Order>) -> Self {
        if let Ok(mut store) = self.store.write() {
            store.orders.insert(phone.into(), orders);
        }
        self
    }

    /// Ratings submitted so far, with the rater's phone
    pub fn ratings(&self) -> Result<Vec<(String, Rating)>, DomainError> {
        let store = self.store.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(store.ratings.clone())
    }

    fn account_key(platform: &str, user_id: &str) -> String {
        format!("{}:{}", platform, user_id)
    }

    fn demo_orders() -> Vec<Order> {
        (1..=12)
            .map(|n| Order::new(format!("A-{:03}", n), format!("Order #{}", n)))
            .collect()
    }
}

#[async_trait]
impl AccountService for InMemoryAccountService {
    async fn find_account(
        &self,
        platform: &str,
        user_id: &str,
    ) -> Result<Option<Account>, DomainError> {
        let store = self.store.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(store
            .accounts
            .get(&Self::account_key(platform, user_id))
            .cloned())
    }

    async fn register(&self, account: Account) -> Result<Account, DomainError> {
        let mut store = self.store.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        if !store.orders.contains_key(&account.phone) {
            store
                .orders
                .insert(account.phone.clone(), Self::demo_orders());
        }

        info!(platform = %account.platform, user_id = %account.user_id, "Account registered");
        store.accounts.insert(
            Self::account_key(&account.platform, &account.user_id),
            account.clone(),
        );

        Ok(account)
    }

    async fn list_groups(&self, school_code: &str) -> Result<Vec<Group>, DomainError> {
        let store = self.store.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        store
            .groups
            .get(school_code)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("School '{}' not found", school_code)))
    }

    async fn list_orders(&self, phone: &str) -> Result<Vec<Order>, DomainError> {
        let store = self.store.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(store.orders.get(phone).cloned().unwrap_or_default())
    }

    async fn submit_rating(&self, phone: &str, rating: Rating) -> Result<(), DomainError> {
        let mut store = self.store.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        let known = store
            .orders
            .get(phone)
            .is_some_and(|orders| orders.iter().any(|o| o.number == rating.order_number));
        if !known {
            return Err(DomainError::not_found(format!(
                "Order '{}' not found",
                rating.order_number
            )));
        }

        store.ratings.push((phone.to_string(), rating));
        Ok(())
    }
}
