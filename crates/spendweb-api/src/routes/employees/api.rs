//! Employee API endpoints
//!
//! Endpoints:
//! - api_employees: Employee directory (JSON)
//! - api_select_employee: Set or clear the employee filter (JSON)
//! - htmx_employee_filter: Filter select change (HTML fragment)

use crate::routes::transactions::api::respond;
use crate::{ApiError, ApiResult, AppState};
use axum::extract::{Form, State};
use axum::response::Html;
use axum::Json;
use serde::Deserialize;
use spendweb_core::ViewModel;
use spendweb_provider::Employee;

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeSelection {
    /// `None` or an empty id clears the filter
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// Get the loaded employee directory (JSON API)
pub async fn api_employees(state: State<AppState>) -> Json<Vec<Employee>> {
    Json(state.view.directory().data().unwrap_or_default())
}

/// Set or clear the employee filter (JSON API)
///
/// Ids missing from the loaded directory are refused with 404.
pub async fn api_select_employee(
    state: State<AppState>,
    Json(body): Json<EmployeeSelection>,
) -> ApiResult<Json<ViewModel>> {
    let employee_id = body.employee_id.as_deref().filter(|id| !id.is_empty());

    if let Some(id) = employee_id {
        if state.view.directory().employee(id).is_none() {
            return Err(ApiError::NotFound {
                resource: format!("employee {}", id),
            });
        }
    }

    state.view.select_employee(employee_id).await?;
    state.sync_pager();
    Ok(Json(state.view.view_model()))
}

/// HTMX: Employee filter select
pub async fn htmx_employee_filter(
    state: State<AppState>,
    Form(form): Form<EmployeeSelection>,
) -> Html<String> {
    let result = state.view.select_employee(form.employee_id.as_deref()).await;
    state.sync_pager();
    respond(&state, result)
}

#[cfg(test)]
mod tests {
    use crate::create_router;
    use crate::test_support::mounted_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use spendweb_core::{ViewMode, ViewModel};
    use spendweb_provider::Employee;
    use tower::ServiceExt;

    fn post(uri: &str, content_type: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_employees_lists_directory() {
        let router = create_router(mounted_state().await);
        let response = router
            .oneshot(Request::builder().uri("/api/employees").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let employees: Vec<Employee> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].id, "emp-a");
    }

    #[tokio::test]
    async fn test_select_and_clear_employee() {
        let state = mounted_state().await;
        let router = create_router(state.clone());

        let response = router
            .clone()
            .oneshot(post(
                "/api/employee",
                "application/json",
                serde_json::json!({ "employee_id": "emp-b" }).to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let model: ViewModel = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(model.mode, ViewMode::Employee);
        let window = model.transactions.unwrap();
        assert_eq!(window.total_transactions, 3);
        assert!(window.data.iter().all(|t| t.employee.id == "emp-b"));
        assert!(state.view.all_transactions().data().is_none());

        let response = router
            .oneshot(post(
                "/api/employee",
                "application/json",
                serde_json::json!({ "employee_id": null }).to_string(),
            ))
            .await
            .unwrap();
        let model: ViewModel = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(model.mode, ViewMode::All);
        assert_eq!(model.transactions.unwrap().total_transactions, 7);
        assert!(state.view.employee_transactions().data().is_none());
    }

    #[tokio::test]
    async fn test_unknown_employee_is_not_found() {
        let state = mounted_state().await;
        let router = create_router(state.clone());
        let response = router
            .oneshot(post(
                "/api/employee",
                "application/json",
                serde_json::json!({ "employee_id": "emp-zz" }).to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.view.mode(), ViewMode::All);
    }

    #[tokio::test]
    async fn test_htmx_filter_renders_selected_employee() {
        let router = create_router(mounted_state().await);
        let response = router
            .oneshot(post(
                "/transactions/filter",
                "application/x-www-form-urlencoded",
                "employee_id=emp-a".to_string(),
            ))
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains("<option value='emp-a' selected>Ada Lovelace</option>"));
        assert!(html.contains("4 transactions"));
        assert!(!html.contains("Kernighan</td>"));
    }
}
