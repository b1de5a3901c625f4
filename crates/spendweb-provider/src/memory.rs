//! In-memory data provider backed by a JSON mock file

use async_trait::async_trait;
use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};
use crate::types::{
    Employee, MockData, PaginatedEmployeeRequestParams, PaginatedRequestParams,
    SetTransactionApprovalParams, Transaction, TransactionPage,
};
use crate::DataProvider;

/// Provider holding its whole dataset in memory
///
/// Each instance owns its data, so approvals made through one provider are
/// visible to every later read of that provider and to nothing else.
pub struct InMemoryProvider {
    data: RwLock<MockData>,
    latency: Duration,
}

impl InMemoryProvider {
    pub fn new(data: MockData) -> Self {
        Self {
            data: RwLock::new(data),
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency` to mimic a remote backend
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Parse a mock dataset from JSON text
    pub fn from_json(content: &str) -> ProviderResult<Self> {
        let data: MockData =
            serde_json::from_str(content).map_err(|e| ProviderError::InvalidData {
                message: e.to_string(),
            })?;
        Ok(Self::new(data))
    }

    /// Load a mock dataset from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let provider = Self::from_json(&content)?;
        {
            let data = provider.data.read().unwrap();
            log::info!(
                "Loaded {} employees and {} transactions from {}",
                data.employees.len(),
                data.transactions.len(),
                path.as_ref().display()
            );
        }
        Ok(provider)
    }

    /// Number of transactions, optionally restricted to one employee
    pub fn total_transactions(&self, employee_id: Option<&str>) -> usize {
        let data = self.data.read().unwrap();
        match employee_id {
            None => data.transactions.len(),
            Some(id) => data
                .transactions
                .iter()
                .filter(|t| t.employee.id == id)
                .count(),
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn paginate(
        transactions: Vec<Transaction>,
        page: usize,
        page_size: usize,
        total_transactions: usize,
    ) -> ProviderResult<TransactionPage> {
        if page_size == 0 {
            return Err(ProviderError::InvalidPageSize { page_size });
        }

        let start = page
            .checked_mul(page_size)
            .ok_or(ProviderError::InvalidPage { page })?;
        if start > transactions.len() {
            return Err(ProviderError::InvalidPage { page });
        }

        let end = start.saturating_add(page_size).min(transactions.len());
        let next_page = if end < transactions.len() {
            Some(page + 1)
        } else {
            None
        };

        Ok(TransactionPage {
            data: transactions[start..end].to_vec(),
            next_page,
            total_transactions,
        })
    }
}

#[async_trait]
impl DataProvider for InMemoryProvider {
    async fn list_employees(&self) -> ProviderResult<Vec<Employee>> {
        self.simulate_latency().await;
        Ok(self.data.read().unwrap().employees.clone())
    }

    async fn list_transactions(
        &self,
        params: &PaginatedRequestParams,
    ) -> ProviderResult<TransactionPage> {
        self.simulate_latency().await;
        let transactions = self.data.read().unwrap().transactions.clone();
        let total = transactions.len();
        Self::paginate(transactions, params.page, params.page_size, total)
    }

    async fn list_transactions_by_employee(
        &self,
        params: &PaginatedEmployeeRequestParams,
    ) -> ProviderResult<TransactionPage> {
        if params.employee_id.is_empty() {
            return Err(ProviderError::EmptyEmployeeId);
        }

        self.simulate_latency().await;
        let transactions: Vec<Transaction> = {
            let data = self.data.read().unwrap();
            if !data.employees.iter().any(|e| e.id == params.employee_id) {
                return Err(ProviderError::EmployeeNotFound {
                    id: params.employee_id.clone(),
                });
            }
            data.transactions
                .iter()
                .filter(|t| t.employee.id == params.employee_id)
                .cloned()
                .collect()
        };
        let total = transactions.len();
        Self::paginate(transactions, params.page, params.page_size, total)
    }

    async fn set_approval(&self, params: &SetTransactionApprovalParams) -> ProviderResult<()> {
        self.simulate_latency().await;
        let mut data = self.data.write().unwrap();
        let transaction = data
            .transactions
            .iter_mut()
            .find(|t| t.id == params.transaction_id)
            .ok_or_else(|| ProviderError::TransactionNotFound {
                id: params.transaction_id.clone(),
            })?;
        transaction.approved = params.value;
        log::debug!(
            "Transaction {} approval set to {}",
            params.transaction_id,
            params.value
        );
        Ok(())
    }
}

// ==================== Tests ====================
