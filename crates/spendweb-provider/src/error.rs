//! Error types for spendweb-provider

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid page {page}")]
    InvalidPage { page: usize },

    #[error("Invalid page size {page_size}")]
    InvalidPageSize { page_size: usize },

    #[error("Employee id cannot be empty")]
    EmptyEmployeeId,

    #[error("Employee not found: {id}")]
    EmployeeNotFound { id: String },

    #[error("Invalid transaction to approve: {id}")]
    TransactionNotFound { id: String },

    #[error("IO error")]
    Io(#[from] io::Error),

    #[error("Invalid data: {message}")]
    InvalidData { message: String },
}

pub type ProviderResult<T> = Result<T, ProviderError>;
