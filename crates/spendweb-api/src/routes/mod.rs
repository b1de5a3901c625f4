//! Route modules for the API server
//!
//! - transactions: Transaction list, page size, pager, approval
//! - employees: Employee directory and the employee filter
//!
//! Each module follows the same structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering (transactions only)

pub mod employees;
pub mod transactions;
