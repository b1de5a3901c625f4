//! Employee routes - Directory listing and the employee filter

pub mod api;

pub use api::{api_employees, api_select_employee, htmx_employee_filter};
