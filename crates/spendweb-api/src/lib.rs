//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: Transaction list, page size, pager, approval
//! - routes::employees: Employee directory and the employee filter

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Json, Router,
};
use spendweb_config::Config;
use spendweb_core::{PagerControl, ViewCoordinator};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub view: Arc<ViewCoordinator>,
    pub pager: Arc<PagerControl>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, view: Arc<ViewCoordinator>) -> Self {
        let current_page = view.pagination().map(|p| p.current_page).unwrap_or(0);
        Self {
            view,
            pager: Arc::new(PagerControl::new(current_page)),
            config,
        }
    }

    /// Point the pager at the page the coordinator is showing
    pub fn sync_pager(&self) {
        if let Some(pagination) = self.view.pagination() {
            self.pager.sync(pagination.current_page);
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::employees::{api_employees, api_select_employee, htmx_employee_filter};
    use routes::transactions::{
        api_change_page, api_change_page_size, api_set_approval, api_view,
        htmx_change_page, htmx_change_page_size, htmx_set_approval, htmx_transactions_list,
        page_transactions,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/view", get(api_view))
        .route("/api/employees", get(api_employees))
        .route("/api/employee", post(api_select_employee))
        .route("/api/page-size", post(api_change_page_size))
        .route("/api/page/:page", post(api_change_page))
        .route("/api/transactions/:id/approval", post(api_set_approval))
        .route("/api/reload", post(api_reload))
        // HTMX page routes
        .route("/", get(page_transactions))
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/filter", post(htmx_employee_filter))
        .route("/transactions/page-size", post(htmx_change_page_size))
        .route("/transactions/page/:page", post(htmx_change_page))
        .route("/transactions/:id/approval", post(htmx_set_approval))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Drop every cached response and reload the current view
async fn api_reload(state: axum::extract::State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    state.view.reload().await?;
    state.sync_pager();
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Transactions reloaded",
    })))
}

pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Spendweb</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for a full page, or return it bare for HTMX
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(
            title,
            &format!(
                r#"<main class='max-w-5xl mx-auto p-6'>
    <h1 class='text-2xl font-bold text-indigo-600 mb-6'>Spendweb</h1>
    {}
</main>"#,
                inner_content
            ),
        )
    }
}

/// Start the web server
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `view` - The mounted view coordinator
pub async fn start_server(config: Config, view: Arc<ViewCoordinator>) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config, view);

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Spendweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Transactions)");
    log::info!("  - /api/* (JSON API endpoints)");

    match axum::serve(listener, router).await {
        Ok(_) => {
            log::info!("Server stopped gracefully");
            Ok(())
        }
        Err(e) => {
            log::error!("Server error: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use spendweb_provider::InMemoryProvider;

    pub const FIXTURE: &str = r#"{
        "employees": [
            { "id": "emp-a", "firstName": "Ada", "lastName": "Lovelace" },
            { "id": "emp-b", "firstName": "Brian", "lastName": "Kernighan" }
        ],
        "transactions": [
            { "id": "txn-1", "amount": "12.50", "employee": { "id": "emp-a", "firstName": "Ada", "lastName": "Lovelace" }, "merchant": "Cafe", "date": "2022-03-01", "approved": false },
            { "id": "txn-2", "amount": "830.00", "employee": { "id": "emp-b", "firstName": "Brian", "lastName": "Kernighan" }, "merchant": "Airline", "date": "2022-03-02", "approved": true },
            { "id": "txn-3", "amount": "41.99", "employee": { "id": "emp-a", "firstName": "Ada", "lastName": "Lovelace" }, "merchant": "Books & Co", "date": "2022-03-03", "approved": false },
            { "id": "txn-4", "amount": "7.25", "employee": { "id": "emp-b", "firstName": "Brian", "lastName": "Kernighan" }, "merchant": "Parking", "date": "2022-03-04", "approved": false },
            { "id": "txn-5", "amount": "1200.00", "employee": { "id": "emp-a", "firstName": "Ada", "lastName": "Lovelace" }, "merchant": "Hotel", "date": "2022-03-05", "approved": false },
            { "id": "txn-6", "amount": "19.00", "employee": { "id": "emp-b", "firstName": "Brian", "lastName": "Kernighan" }, "merchant": "Taxi", "date": "2022-03-06", "approved": false },
            { "id": "txn-7", "amount": "64.10", "employee": { "id": "emp-a", "firstName": "Ada", "lastName": "Lovelace" }, "merchant": "Office Supply", "date": "2022-03-07", "approved": false }
        ]
    }"#;

    /// Router over a mounted coordinator with page size 5
    pub async fn mounted_state() -> AppState {
        let provider = InMemoryProvider::from_json(FIXTURE).unwrap();
        let view = Arc::new(ViewCoordinator::new(Arc::new(provider), 5));
        view.mount().await.unwrap();
        AppState::new(Config::default(), view)
    }
}
