//! Request cache, paginated stores and view coordination

pub mod cache;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod pager;
pub mod store;

#[cfg(test)]
mod testing;

pub use cache::{CachedRequest, EmployeesRequest, RequestCache};
pub use coordinator::{PaginationState, ViewCoordinator, ViewMode, ViewModel, ViewState};
pub use directory::EmployeeDirectory;
pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use pager::{PagerButton, PagerLayout, PagerControl};
pub use store::{EmployeeTransactionStore, PaginatedStore, TransactionPageStore};

pub use spendweb_provider::{Employee, Transaction, TransactionPage};
