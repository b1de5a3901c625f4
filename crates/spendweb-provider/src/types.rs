//! Data model shared by the provider and the view layer

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee as listed by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn new(id: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    /// Display name used in the filter and transaction rows
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A card transaction awaiting (or holding) approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    /// Denormalized copy of the owning employee
    pub employee: Employee,
    pub merchant: String,
    pub date: NaiveDate,
    /// The only field that changes after load
    pub approved: bool,
}

/// One page of results plus the cursor of the following page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: T,
    /// Zero-based index of the page after this one, `None` on the last page
    pub next_page: Option<usize>,
    /// Total items matching the request filter, across all pages
    pub total_transactions: usize,
}

pub type TransactionPage = PaginatedResponse<Vec<Transaction>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRequestParams {
    /// Zero-based page index
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedEmployeeRequestParams {
    pub page: usize,
    pub page_size: usize,
    pub employee_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
    pub transaction_id: String,
    pub value: bool,
}

/// Backing dataset of the in-memory provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockData {
    pub employees: Vec<Employee>,
    pub transactions: Vec<Transaction>,
}
