//! View coordinator
//!
//! Decides which transaction store is authoritative, runs the compound
//! "activate all" and "activate employee" sequences, owns the draft and
//! confirmed page sizes and derives the pagination handed to the pager.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use spendweb_provider::{Employee, ProviderRef, SetTransactionApprovalParams, TransactionPage};

use crate::cache::{RequestCache, PAGINATED_TRANSACTIONS_KEY, TRANSACTIONS_BY_EMPLOYEE_KEY};
use crate::directory::EmployeeDirectory;
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::pager;
use crate::store::{
    AllTransactions, EmployeeTransactionStore, PaginatedStore, TransactionPageStore,
    TransactionsByEmployee,
};

const PAGE_SIZE_WARNING: &str = "Page size must be greater than or equal to 1";

/// Which transaction view is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    #[default]
    All,
    Employee,
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::All => write!(f, "ALL"),
            ViewMode::Employee => write!(f, "EMPLOYEE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub mode: ViewMode,
    /// Only meaningful in [`ViewMode::Employee`]
    pub employee_id: Option<String>,
    /// Value of the page-size input, not yet submitted
    pub draft_page_size: i64,
    /// Page size applied to fetches and pagination math
    pub page_size: usize,
}

/// Pagination derived from the live window, as handed to the pager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// The window's cursor, or the last page number when it has none
    pub next_page: usize,
    /// 1-based page on screen; equal to `next_page`
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewModel {
    pub mode: ViewMode,
    pub employee_id: Option<String>,
    pub page_size: usize,
    pub draft_page_size: i64,
    pub transactions: Option<TransactionPage>,
    pub employees: Option<Vec<Employee>>,
    pub pagination: Option<PaginationState>,
    pub loading: bool,
}

struct BusyGuard<'a>(&'a AtomicUsize);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ViewCoordinator {
    cache: Arc<RequestCache>,
    directory: EmployeeDirectory,
    all_transactions: TransactionPageStore,
    employee_transactions: EmployeeTransactionStore,
    state: RwLock<ViewState>,
    busy: AtomicUsize,
    /// Bumped by every load sequence; a sequence stops once it is outrun
    activation: AtomicU64,
    logger: Arc<dyn ErrorLogger>,
}

impl ViewCoordinator {
    pub fn new(provider: ProviderRef, default_page_size: usize) -> Self {
        let cache = Arc::new(RequestCache::new(provider));
        let page_size = default_page_size.max(1);
        Self {
            directory: EmployeeDirectory::new(cache.clone()),
            all_transactions: PaginatedStore::new(AllTransactions, cache.clone()),
            employee_transactions: PaginatedStore::new(TransactionsByEmployee, cache.clone()),
            cache,
            state: RwLock::new(ViewState {
                mode: ViewMode::All,
                employee_id: None,
                draft_page_size: page_size as i64,
                page_size,
            }),
            busy: AtomicUsize::new(0),
            activation: AtomicU64::new(0),
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    // ==================== Accessors ====================

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    pub fn directory(&self) -> &EmployeeDirectory {
        &self.directory
    }

    pub fn all_transactions(&self) -> &TransactionPageStore {
        &self.all_transactions
    }

    pub fn employee_transactions(&self) -> &EmployeeTransactionStore {
        &self.employee_transactions
    }

    pub fn state(&self) -> ViewState {
        self.state.read().unwrap().clone()
    }

    pub fn mode(&self) -> ViewMode {
        self.state.read().unwrap().mode
    }

    /// Confirmed page size
    pub fn page_size(&self) -> usize {
        self.state.read().unwrap().page_size
    }

    /// Window of whichever store holds data
    pub fn transactions(&self) -> Option<TransactionPage> {
        self.all_transactions
            .data()
            .or_else(|| self.employee_transactions.data())
    }

    /// True while any store or compound operation is running
    pub fn loading(&self) -> bool {
        self.all_transactions.loading()
            || self.directory.loading()
            || self.employee_transactions.loading()
            || self.busy.load(Ordering::SeqCst) > 0
    }

    pub fn pagination(&self) -> Option<PaginationState> {
        let window = self.transactions()?;
        let page_size = self.page_size();
        let total_items = window.total_transactions;

        let next_page = window
            .next_page
            .unwrap_or_else(|| total_items.div_ceil(page_size));
        let total_pages = pager::total_pages(total_items, page_size);

        Some(PaginationState {
            next_page,
            current_page: next_page,
            total_pages,
            total_items,
            page_size,
            has_previous: next_page > 1,
            has_next: next_page >= 1 && next_page < total_pages,
        })
    }

    pub fn view_model(&self) -> ViewModel {
        let state = self.state();
        ViewModel {
            mode: state.mode,
            employee_id: state.employee_id,
            page_size: state.page_size,
            draft_page_size: state.draft_page_size,
            transactions: self.transactions(),
            employees: self.directory.data(),
            pagination: self.pagination(),
            loading: self.loading(),
        }
    }

    // ==================== User actions ====================

    /// Initial load; does nothing once the directory is loaded or loading
    pub async fn mount(&self) -> CoreResult<()> {
        if self.directory.data().is_some() || self.directory.loading() {
            return Ok(());
        }
        let result = self.load_all(Some(1)).await;
        self.report(ErrorContext::new("mount"), result)
    }

    /// Filter by employee, or clear the filter with `None` / an empty id
    pub async fn select_employee(&self, employee_id: Option<&str>) -> CoreResult<()> {
        let context = ErrorContext::new("select_employee")
            .with_data("employee_id", serde_json::json!(employee_id));

        let result = match employee_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                {
                    let mut state = self.state.write().unwrap();
                    state.mode = ViewMode::Employee;
                    state.employee_id = Some(id.to_string());
                }
                // a new activation sources its own total
                self.employee_transactions.invalidate();
                self.load_employee(Some(1), id).await
            }
            None => {
                {
                    let mut state = self.state.write().unwrap();
                    state.mode = ViewMode::All;
                    state.employee_id = None;
                }
                self.load_all(Some(1)).await
            }
        };

        self.report(context, result)
    }

    /// Edit the page-size input without applying it
    pub fn set_draft_page_size(&self, page_size: i64) {
        self.state.write().unwrap().draft_page_size = page_size;
    }

    /// Apply the draft page size and reload the active view at page 1
    ///
    /// A draft below 1 is refused: the draft is reset to the confirmed size
    /// and nothing is fetched.
    pub async fn submit_page_size(&self) -> CoreResult<()> {
        let context = ErrorContext::new("submit_page_size");

        let accepted = {
            let mut state = self.state.write().unwrap();
            match usize::try_from(state.draft_page_size) {
                Ok(page_size) if page_size >= 1 => {
                    state.page_size = page_size;
                    true
                }
                _ => {
                    state.draft_page_size = state.page_size as i64;
                    false
                }
            }
        };

        if !accepted {
            self.logger.log_warning(PAGE_SIZE_WARNING, &context);
            return Err(CoreError::validation(PAGE_SIZE_WARNING));
        }

        let result = self.reload_active(Some(1)).await;
        self.report(context, result)
    }

    pub async fn change_page_size(&self, page_size: i64) -> CoreResult<()> {
        self.set_draft_page_size(page_size);
        self.submit_page_size().await
    }

    /// Load page `page` (1-based) of the active view with the confirmed size
    pub async fn go_to_page(&self, page: usize) -> CoreResult<()> {
        let context =
            ErrorContext::new("go_to_page").with_data("page", serde_json::json!(page));
        let result = if page < 1 {
            Err(CoreError::validation("Page must be greater than or equal to 1"))
        } else {
            self.reload_active(Some(page)).await
        };
        self.report(context, result)
    }

    /// Approve or un-approve one transaction
    ///
    /// The provider is called directly, cached transaction pages are dropped
    /// and the row on screen is updated in place.
    pub async fn set_transaction_approval(&self, transaction_id: &str, value: bool) -> CoreResult<()> {
        let context = ErrorContext::new("set_transaction_approval")
            .with_data("transaction_id", serde_json::json!(transaction_id))
            .with_data("value", serde_json::json!(value));

        let request = SetTransactionApprovalParams {
            transaction_id: transaction_id.to_string(),
            value,
        };
        let result = self
            .cache
            .fetch_without_cache(&request)
            .await
            .map_err(CoreError::from);

        if result.is_ok() {
            self.cache.clear_by_key(PAGINATED_TRANSACTIONS_KEY);
            self.cache.clear_by_key(TRANSACTIONS_BY_EMPLOYEE_KEY);
            let shown = self.all_transactions.set_approval_in_window(transaction_id, value)
                || self
                    .employee_transactions
                    .set_approval_in_window(transaction_id, value);
            if !shown {
                log::debug!("Approved transaction {} is not on screen", transaction_id);
            }
        }

        self.report(context, result)
    }

    /// Drop the whole cache and reload the active view on its current page
    pub async fn reload(&self) -> CoreResult<()> {
        let page = self
            .pagination()
            .map(|p| p.current_page)
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        self.cache.clear();
        let result = self.reload_active(Some(page)).await;
        self.report(ErrorContext::new("reload"), result)
    }

    // ==================== Sequences ====================

    fn busy_guard(&self) -> BusyGuard<'_> {
        self.busy.fetch_add(1, Ordering::SeqCst);
        BusyGuard(&self.busy)
    }

    fn begin_activation(&self) -> u64 {
        self.activation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current_activation(&self, activation: u64) -> bool {
        self.activation.load(Ordering::SeqCst) == activation
    }

    async fn reload_active(&self, page: Option<usize>) -> CoreResult<()> {
        let (mode, employee_id) = {
            let state = self.state.read().unwrap();
            (state.mode, state.employee_id.clone())
        };
        match (mode, employee_id) {
            (ViewMode::All, _) => self.load_all(page).await,
            (ViewMode::Employee, Some(id)) => self.load_employee(page, &id).await,
            (ViewMode::Employee, None) => Err(CoreError::validation("No employee selected")),
        }
    }

    /// Employee store out, directory in, then the "all" store
    ///
    /// The directory is loaded first because rows show employee names.
    /// A newer sequence started during the directory fetch wins; this one
    /// then stops without touching either store.
    async fn load_all(&self, page: Option<usize>) -> CoreResult<()> {
        let _busy = self.busy_guard();
        let activation = self.begin_activation();

        self.employee_transactions.invalidate();
        self.directory.fetch_all().await?;

        if !self.is_current_activation(activation) {
            log::debug!("Activation {} was superseded, skipping the all store", activation);
            return Ok(());
        }

        // no await between here and the fetch taking its ticket
        self.employee_transactions.invalidate();
        self.all_transactions.invalidate();
        let page_size = self.page_size();
        self.all_transactions.fetch_page(&(), page_size, page).await
    }

    async fn load_employee(&self, page: Option<usize>, employee_id: &str) -> CoreResult<()> {
        let _busy = self.busy_guard();
        self.begin_activation();

        self.all_transactions.invalidate();
        let page_size = self.page_size();
        self.employee_transactions
            .fetch_page(employee_id, page_size, page)
            .await
    }

    fn report(&self, context: ErrorContext, result: CoreResult<()>) -> CoreResult<()> {
        if let Err(ref error) = result {
            match error {
                CoreError::ValidationError { message } => {
                    self.logger.log_warning(message, &context)
                }
                _ => self.logger.log_error(error, &context),
            }
        }
        result
    }
}

// ==================== Tests ====================
