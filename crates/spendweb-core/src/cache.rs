//! Request cache in front of the data provider
//!
//! Every provider call is described by a request type implementing
//! [`CachedRequest`]. Responses are memoized per `(key, params)` as JSON and
//! can be dropped per key or all at once.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use spendweb_provider::{
    DataProvider, Employee, PaginatedEmployeeRequestParams, PaginatedRequestParams,
    ProviderRef, ProviderResult, SetTransactionApprovalParams, TransactionPage,
};

pub const EMPLOYEES_KEY: &str = "employees";
pub const PAGINATED_TRANSACTIONS_KEY: &str = "paginatedTransactions";
pub const TRANSACTIONS_BY_EMPLOYEE_KEY: &str = "transactionsByEmployee";
pub const SET_APPROVAL_KEY: &str = "setTransactionApproval";

/// A provider call that can be memoized
#[async_trait]
pub trait CachedRequest: Serialize + Send + Sync {
    type Response: Serialize + DeserializeOwned + Send;

    /// Cache key shared by every request of this kind
    const KEY: &'static str;

    async fn send(&self, provider: &dyn DataProvider) -> ProviderResult<Self::Response>;
}

/// Request for the whole employee directory
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EmployeesRequest;

#[async_trait]
impl CachedRequest for EmployeesRequest {
    type Response = Vec<Employee>;
    const KEY: &'static str = EMPLOYEES_KEY;

    async fn send(&self, provider: &dyn DataProvider) -> ProviderResult<Self::Response> {
        provider.list_employees().await
    }
}

#[async_trait]
impl CachedRequest for PaginatedRequestParams {
    type Response = TransactionPage;
    const KEY: &'static str = PAGINATED_TRANSACTIONS_KEY;

    async fn send(&self, provider: &dyn DataProvider) -> ProviderResult<Self::Response> {
        provider.list_transactions(self).await
    }
}

#[async_trait]
impl CachedRequest for PaginatedEmployeeRequestParams {
    type Response = TransactionPage;
    const KEY: &'static str = TRANSACTIONS_BY_EMPLOYEE_KEY;

    async fn send(&self, provider: &dyn DataProvider) -> ProviderResult<Self::Response> {
        provider.list_transactions_by_employee(self).await
    }
}

#[async_trait]
impl CachedRequest for SetTransactionApprovalParams {
    type Response = ();
    const KEY: &'static str = SET_APPROVAL_KEY;

    async fn send(&self, provider: &dyn DataProvider) -> ProviderResult<Self::Response> {
        provider.set_approval(self).await
    }
}

/// Memoizing client used by the stores
pub struct RequestCache {
    provider: ProviderRef,
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl RequestCache {
    pub fn new(provider: ProviderRef) -> Self {
        Self {
            provider,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn entry_key<R: CachedRequest>(request: &R) -> Option<String> {
        match serde_json::to_string(request) {
            Ok(params) => Some(format!("{}@{}", R::KEY, params)),
            Err(e) => {
                log::warn!("Cannot build cache key for {}: {}", R::KEY, e);
                None
            }
        }
    }

    /// Cached response for `request`, fetching it on a miss
    ///
    /// Returns `None` when the provider fails; the failure is logged here.
    pub async fn fetch_with_cache<R: CachedRequest>(&self, request: &R) -> Option<R::Response> {
        let key = Self::entry_key(request)?;

        let cached = self.entries.read().unwrap().get(&key).cloned();
        if let Some(value) = cached {
            match serde_json::from_value(value) {
                Ok(response) => {
                    log::debug!("Cache hit: {}", key);
                    return Some(response);
                }
                Err(e) => log::warn!("Dropping unreadable cache entry {}: {}", key, e),
            }
        }

        log::debug!("Cache miss: {}", key);
        let response = match request.send(self.provider.as_ref()).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Request {} failed: {}", key, e);
                return None;
            }
        };

        match serde_json::to_value(&response) {
            Ok(value) => {
                self.entries.write().unwrap().insert(key, value);
            }
            Err(e) => log::warn!("Response for {} not cached: {}", key, e),
        }

        Some(response)
    }

    /// Call the provider directly, bypassing and not filling the cache
    pub async fn fetch_without_cache<R: CachedRequest>(
        &self,
        request: &R,
    ) -> ProviderResult<R::Response> {
        request.send(self.provider.as_ref()).await
    }

    /// Drop every entry stored under `key`, returning how many were removed
    pub fn clear_by_key(&self, key: &str) -> usize {
        let prefix = format!("{}@", key);
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(&prefix));
        let removed = before - entries.len();
        log::debug!("Cleared {} cache entries for {}", removed, key);
        removed
    }

    /// Drop the whole cache
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
