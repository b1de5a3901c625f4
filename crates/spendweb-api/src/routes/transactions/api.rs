//! Transactions API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_view: Current view model (JSON)
//! - api_change_page_size: Apply a page size (JSON)
//! - api_change_page: Go to a page through the pager (JSON)
//! - api_set_approval: Approve or un-approve a transaction (JSON)
//! - htmx_transactions_list: List partial (HTML fragment)
//! - htmx_change_page_size: Page-size form submit (HTML fragment)
//! - htmx_change_page: Pager button (HTML fragment)
//! - htmx_set_approval: Approval checkbox (HTML fragment)

use crate::routes::transactions::page::render_transactions_partial;
use crate::{ApiResult, AppState};
use axum::extract::{Form, Path, State};
use axum::response::Html;
use axum::Json;
use serde::Deserialize;
use spendweb_core::{CoreResult, ViewModel};

#[derive(Debug, Deserialize)]
pub struct PageSizeBody {
    pub page_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct PageSizeForm {
    pub page_size: String,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalBody {
    pub value: bool,
}

/// Get the current view model (JSON API)
pub async fn api_view(state: State<AppState>) -> Json<ViewModel> {
    Json(state.view.view_model())
}

/// Apply a page size and reload page 1 (JSON API)
pub async fn api_change_page_size(
    state: State<AppState>,
    Json(body): Json<PageSizeBody>,
) -> ApiResult<Json<ViewModel>> {
    state.view.change_page_size(body.page_size).await?;
    state.sync_pager();
    Ok(Json(state.view.view_model()))
}

/// Go to a 1-based page (JSON API)
///
/// Answers 409 while another page change is running.
pub async fn api_change_page(
    state: State<AppState>,
    Path(page): Path<usize>,
) -> ApiResult<Json<ViewModel>> {
    state
        .pager
        .request_page(page, |page| state.view.go_to_page(page))
        .await?;
    state.sync_pager();
    Ok(Json(state.view.view_model()))
}

/// Approve or un-approve one transaction (JSON API)
pub async fn api_set_approval(
    state: State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ApprovalBody>,
) -> ApiResult<Json<ViewModel>> {
    state.view.set_transaction_approval(&id, body.value).await?;
    Ok(Json(state.view.view_model()))
}

/// HTMX: Transactions list - Partial page update
pub async fn htmx_transactions_list(state: State<AppState>) -> Html<String> {
    Html(render_transactions_partial(&state, None))
}

/// HTMX: Page-size form submit
pub async fn htmx_change_page_size(
    state: State<AppState>,
    Form(form): Form<PageSizeForm>,
) -> Html<String> {
    let result = match form.page_size.trim().parse::<i64>() {
        Ok(page_size) => state.view.change_page_size(page_size).await,
        Err(_) => {
            log::warn!("Ignoring non-numeric page size {:?}", form.page_size);
            Err(spendweb_core::CoreError::validation("Page size must be a number"))
        }
    };
    state.sync_pager();
    respond(&state, result)
}

/// HTMX: Pager button
pub async fn htmx_change_page(state: State<AppState>, Path(page): Path<usize>) -> Html<String> {
    let result = state
        .pager
        .request_page(page, |page| state.view.go_to_page(page))
        .await;
    state.sync_pager();
    respond(&state, result)
}

/// HTMX: Approval checkbox
pub async fn htmx_set_approval(
    state: State<AppState>,
    Path(id): Path<String>,
    Form(body): Form<ApprovalBody>,
) -> Html<String> {
    let result = state.view.set_transaction_approval(&id, body.value).await;
    respond(&state, result)
}

/// Re-render the partial, with the error as a notice if there was one
pub(crate) fn respond(state: &AppState, result: CoreResult<()>) -> Html<String> {
    match result {
        Ok(()) => Html(render_transactions_partial(state, None)),
        Err(e) => Html(render_transactions_partial(state, Some(&e.to_string()))),
    }
}
