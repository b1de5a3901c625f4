//! Transactions page rendering - Full page and the shared list partial
//!
//! Endpoints:
//! - page_transactions: Main transactions page
//!
//! Helper functions:
//! - render_transactions_partial: Filter, page-size form, rows and pager
//! - render_pager: Previous / page / Next buttons

use crate::AppState;
use spendweb_core::{PagerButton, PagerLayout, ViewMode, ViewModel};
use spendweb_provider::Transaction;
use spendweb_utils::{escape_html, format_amount, format_number};

/// Transactions page - filter, page size, list and pager
pub async fn page_transactions(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let inner_content = format!(
        r##"<div class='flex items-center justify-between mb-4'>
            <h2 class='text-2xl font-bold'>Transactions</h2>
            <button hx-post='/api/reload' hx-swap='none' hx-on::after-request='htmx.trigger("#transactions-content", "reload")'
                class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200'>Reload</button>
        </div>
        <div id='transactions-content' hx-get='/transactions/list' hx-trigger='reload' class='bg-white rounded-xl shadow-sm p-6'>
            {}
        </div>"##,
        render_transactions_partial(&state, None)
    );

    axum::response::Html(crate::page_response(&headers, "Transactions", &inner_content))
}

/// Everything inside `#transactions-content`
///
/// `notice` is shown above the list, e.g. a refused page size.
pub fn render_transactions_partial(state: &AppState, notice: Option<&str>) -> String {
    let model = state.view.view_model();

    let notice_html = notice
        .map(|message| {
            format!(
                "<div class='mb-4 p-3 rounded-lg bg-yellow-50 border border-yellow-200 text-yellow-800 text-sm'>{}</div>",
                escape_html(message)
            )
        })
        .unwrap_or_default();

    let pager_html = match &model.pagination {
        Some(pagination) => render_pager(&state.pager.layout(
            pagination.total_items,
            pagination.page_size,
            model.loading,
        )),
        None => String::new(),
    };

    format!(
        r#"{}
        <div class='flex flex-wrap items-end gap-4 mb-4'>
            {}
            {}
        </div>
        {}
        {}"#,
        notice_html,
        render_employee_filter(&model),
        render_page_size_form(&model),
        render_rows(&model),
        pager_html
    )
}

fn render_employee_filter(model: &ViewModel) -> String {
    let selected = match model.mode {
        ViewMode::Employee => model.employee_id.as_deref().unwrap_or(""),
        ViewMode::All => "",
    };

    let mut options = format!(
        "<option value='' {}>All Employees</option>",
        if selected.is_empty() { "selected" } else { "" }
    );
    for employee in model.employees.iter().flatten() {
        options.push_str(&format!(
            "<option value='{}' {}>{}</option>",
            escape_html(&employee.id),
            if employee.id == selected { "selected" } else { "" },
            escape_html(&employee.full_name())
        ));
    }

    let disabled = if model.employees.is_none() { "disabled" } else { "" };

    format!(
        r#"<label class='flex flex-col text-sm text-gray-600'>Filter by employee
            <select name='employee_id' hx-post='/transactions/filter' hx-target='#transactions-content' hx-trigger='change'
                class='mt-1 px-3 py-2 border rounded-lg bg-white min-w-[200px]' {}>{}</select>
        </label>"#,
        disabled, options
    )
}

fn render_page_size_form(model: &ViewModel) -> String {
    format!(
        r#"<form hx-post='/transactions/page-size' hx-target='#transactions-content' class='flex items-end gap-2'>
            <label class='flex flex-col text-sm text-gray-600'>Page size
                <input type='number' name='page_size' value='{}' class='mt-1 px-3 py-2 border rounded-lg w-24'>
            </label>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700' {}>Apply</button>
        </form>"#,
        model.draft_page_size,
        if model.loading { "disabled" } else { "" }
    )
}

fn render_rows(model: &ViewModel) -> String {
    let window = match &model.transactions {
        Some(window) => window,
        None if model.loading => {
            return "<p class='text-gray-500 text-center py-8'>Loading...</p>".to_string()
        }
        None => {
            return "<p class='text-gray-500 text-center py-8'>No transactions to show</p>".to_string()
        }
    };

    if window.data.is_empty() {
        return "<p class='text-gray-500 text-center py-8'>No transactions to show</p>".to_string();
    }

    let rows: String = window.data.iter().map(render_row).collect();

    format!(
        r#"<p class='text-xs text-gray-500 mb-2'>{} transactions</p>
        <table class='w-full text-sm'>
            <thead><tr class='text-left text-gray-500 border-b'>
                <th class='py-2'>Approved</th><th>Employee</th><th>Merchant</th><th>Date</th><th class='text-right'>Amount</th>
            </tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        format_number(window.total_transactions),
        rows
    )
}

fn render_row(transaction: &Transaction) -> String {
    let id = escape_html(&transaction.id);
    format!(
        r#"<tr class='border-b hover:bg-gray-50'>
            <td class='py-2'><input type='checkbox' {} hx-post='/transactions/{}/approval' hx-vals='{{"value": "{}"}}' hx-target='#transactions-content'></td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td class='text-right font-mono'>{}</td>
        </tr>"#,
        if transaction.approved { "checked" } else { "" },
        id,
        !transaction.approved,
        escape_html(&transaction.employee.full_name()),
        escape_html(&transaction.merchant),
        transaction.date.format("%Y-%m-%d"),
        format_amount(transaction.amount)
    )
}

fn render_button(button: &PagerButton) -> String {
    let class = if button.active {
        "bg-indigo-600 text-white"
    } else {
        "bg-white text-gray-700 hover:bg-gray-50"
    };
    format!(
        "<button hx-post='/transactions/page/{}' hx-target='#transactions-content' class='px-3 py-1.5 border rounded {}' {}>{}</button>",
        button.page,
        class,
        if button.disabled { "disabled" } else { "" },
        button.label
    )
}

pub fn render_pager(layout: &PagerLayout) -> String {
    if layout.total_pages == 0 {
        return String::new();
    }
    let pages: String = layout.pages.iter().map(render_button).collect();
    format!(
        "<nav class='flex items-center justify-center gap-1 mt-4'>{}{}{}</nav>",
        render_button(&layout.previous),
        pages,
        render_button(&layout.next)
    )
}
