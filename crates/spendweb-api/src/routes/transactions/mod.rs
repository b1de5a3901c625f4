//! Transaction routes - Transaction list, page size, pager, approval
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering and the list partial

pub mod api;
pub mod page;

pub use api::{
    api_change_page,
    api_change_page_size,
    api_set_approval,
    api_view,
    htmx_change_page,
    htmx_change_page_size,
    htmx_set_approval,
    htmx_transactions_list,
};

pub use page::{page_transactions, render_transactions_partial};
