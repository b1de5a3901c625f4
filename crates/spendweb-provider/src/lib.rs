//! Transaction and employee data provider
//!
//! The view layer talks to its data through the [`DataProvider`] trait.
//! [`InMemoryProvider`] is an explicitly owned stand-in for a backend,
//! loaded from a JSON mock file or built from vectors in tests.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod memory;
pub mod types;

pub use error::{ProviderError, ProviderResult};
pub use memory::InMemoryProvider;
pub use types::{
    Employee, MockData, PaginatedEmployeeRequestParams, PaginatedRequestParams, PaginatedResponse,
    SetTransactionApprovalParams, Transaction, TransactionPage,
};

/// Provider reference type
pub type ProviderRef = Arc<dyn DataProvider>;

/// Source of employees and paginated transactions
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Full employee list, in provider order
    async fn list_employees(&self) -> ProviderResult<Vec<Employee>>;

    /// One page of all transactions
    async fn list_transactions(
        &self,
        params: &PaginatedRequestParams,
    ) -> ProviderResult<TransactionPage>;

    /// One page of the transactions of a single employee
    async fn list_transactions_by_employee(
        &self,
        params: &PaginatedEmployeeRequestParams,
    ) -> ProviderResult<TransactionPage>;

    /// Set the approval flag of one transaction
    async fn set_approval(&self, params: &SetTransactionApprovalParams) -> ProviderResult<()>;
}
