//! Test fixtures and provider doubles

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use spendweb_provider::{
    DataProvider, Employee, InMemoryProvider, MockData, PaginatedEmployeeRequestParams,
    PaginatedRequestParams, ProviderResult, SetTransactionApprovalParams, Transaction,
    TransactionPage,
};

pub fn fixture_employees() -> Vec<Employee> {
    vec![
        Employee::new("emp-a", "Ada", "Lovelace"),
        Employee::new("emp-b", "Brian", "Kernighan"),
        Employee::new("emp-x", "Xena", "Xavier"),
    ]
}

/// Three employees and eight transactions; "emp-x" owns exactly two
pub fn fixture_data() -> MockData {
    let employees = fixture_employees();
    let owners = [0, 1, 0, 2, 1, 0, 2, 1];
    let transactions = owners
        .iter()
        .enumerate()
        .map(|(i, owner)| Transaction {
            id: format!("txn-{}", i + 1),
            amount: Decimal::new(1050 + i as i64 * 100, 2),
            employee: employees[*owner].clone(),
            merchant: format!("Merchant {}", i + 1),
            date: NaiveDate::from_ymd_opt(2022, 3, 1 + i as u32).unwrap(),
            approved: false,
        })
        .collect();
    MockData {
        employees,
        transactions,
    }
}

pub fn fixture_provider() -> InMemoryProvider {
    InMemoryProvider::new(fixture_data())
}

/// Provider call as seen by a [`RecordingProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Employees,
    Transactions { page: usize, page_size: usize },
    ByEmployee { page: usize, page_size: usize, employee_id: String },
    Approval { transaction_id: String, value: bool },
}

/// Records every call before delegating to the inner provider
pub struct RecordingProvider {
    inner: InMemoryProvider,
    calls: Mutex<Vec<Call>>,
}

impl RecordingProvider {
    pub fn new(inner: InMemoryProvider) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DataProvider for RecordingProvider {
    async fn list_employees(&self) -> ProviderResult<Vec<Employee>> {
        self.record(Call::Employees);
        self.inner.list_employees().await
    }

    async fn list_transactions(
        &self,
        params: &PaginatedRequestParams,
    ) -> ProviderResult<TransactionPage> {
        self.record(Call::Transactions {
            page: params.page,
            page_size: params.page_size,
        });
        self.inner.list_transactions(params).await
    }

    async fn list_transactions_by_employee(
        &self,
        params: &PaginatedEmployeeRequestParams,
    ) -> ProviderResult<TransactionPage> {
        self.record(Call::ByEmployee {
            page: params.page,
            page_size: params.page_size,
            employee_id: params.employee_id.clone(),
        });
        self.inner.list_transactions_by_employee(params).await
    }

    async fn set_approval(&self, params: &SetTransactionApprovalParams) -> ProviderResult<()> {
        self.record(Call::Approval {
            transaction_id: params.transaction_id.clone(),
            value: params.value,
        });
        self.inner.set_approval(params).await
    }
}

/// Holds calls until their gate is released
///
/// Each call takes the oldest gate queued with [`GatedProvider::hold_next`]
/// and waits on it; calls made with no gate queued pass straight through.
pub struct GatedProvider {
    inner: InMemoryProvider,
    gates: Mutex<VecDeque<Arc<Notify>>>,
}

impl GatedProvider {
    pub fn new(inner: InMemoryProvider) -> Self {
        Self {
            inner,
            gates: Mutex::new(VecDeque::new()),
        }
    }

    pub fn hold_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    async fn pass_gate(&self) {
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl DataProvider for GatedProvider {
    async fn list_employees(&self) -> ProviderResult<Vec<Employee>> {
        self.pass_gate().await;
        self.inner.list_employees().await
    }

    async fn list_transactions(
        &self,
        params: &PaginatedRequestParams,
    ) -> ProviderResult<TransactionPage> {
        self.pass_gate().await;
        self.inner.list_transactions(params).await
    }

    async fn list_transactions_by_employee(
        &self,
        params: &PaginatedEmployeeRequestParams,
    ) -> ProviderResult<TransactionPage> {
        self.pass_gate().await;
        self.inner.list_transactions_by_employee(params).await
    }

    async fn set_approval(&self, params: &SetTransactionApprovalParams) -> ProviderResult<()> {
        self.pass_gate().await;
        self.inner.set_approval(params).await
    }
}
