//! Paginated transaction stores
//!
//! Both transaction views share one store type. A [`PageQuery`] turns the
//! view's filter and the resolved page index into a cacheable request; the
//! store owns the live page window, the page-selection rule and the merge.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use spendweb_provider::{PaginatedEmployeeRequestParams, PaginatedRequestParams, TransactionPage};

use crate::cache::{CachedRequest, RequestCache};
use crate::error::{CoreError, CoreResult};

// ==================== Fetch tracking ====================

/// Generation counter and in-flight count of one store
///
/// Every fetch and every invalidation starts a new generation; a response is
/// applied only while its generation is still the latest.
#[derive(Default)]
pub(crate) struct FetchTracker {
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl FetchTracker {
    pub(crate) fn begin(&self) -> FetchTicket<'_> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        FetchTicket {
            tracker: self,
            generation,
        }
    }

    pub(crate) fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// One outstanding fetch; decrements the in-flight count when dropped
pub(crate) struct FetchTicket<'a> {
    tracker: &'a FetchTracker,
    generation: u64,
}

impl FetchTicket<'_> {
    pub(crate) fn is_current(&self) -> bool {
        self.tracker.generation.load(Ordering::SeqCst) == self.generation
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for FetchTicket<'_> {
    fn drop(&mut self) {
        self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

// ==================== Queries ====================

/// Builds the provider request of one paginated view
pub trait PageQuery: Send + Sync + 'static {
    /// What the view is filtered by
    type Filter: ?Sized + Sync;
    type Request: CachedRequest<Response = TransactionPage>;

    /// Short name used in log lines
    fn name(&self) -> &'static str;

    fn build_request(
        &self,
        filter: &Self::Filter,
        page: usize,
        page_size: usize,
    ) -> CoreResult<Self::Request>;
}

/// Unfiltered transaction listing
#[derive(Debug, Clone, Copy, Default)]
pub struct AllTransactions;

impl PageQuery for AllTransactions {
    type Filter = ();
    type Request = PaginatedRequestParams;

    fn name(&self) -> &'static str {
        "all-transactions"
    }

    fn build_request(&self, _filter: &(), page: usize, page_size: usize) -> CoreResult<Self::Request> {
        Ok(PaginatedRequestParams { page, page_size })
    }
}

/// Transactions of one employee; the filter is the employee id
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionsByEmployee;

impl PageQuery for TransactionsByEmployee {
    type Filter = str;
    type Request = PaginatedEmployeeRequestParams;

    fn name(&self) -> &'static str {
        "employee-transactions"
    }

    fn build_request(
        &self,
        employee_id: &str,
        page: usize,
        page_size: usize,
    ) -> CoreResult<Self::Request> {
        if employee_id.is_empty() {
            return Err(CoreError::validation("Employee id cannot be empty"));
        }
        Ok(PaginatedEmployeeRequestParams {
            page,
            page_size,
            employee_id: employee_id.to_string(),
        })
    }
}

// ==================== Store ====================

/// Holds at most one page window and replaces it on every fetch
pub struct PaginatedStore<Q: PageQuery> {
    query: Q,
    cache: Arc<RequestCache>,
    window: RwLock<Option<TransactionPage>>,
    tracker: FetchTracker,
}

/// Store of the "all transactions" view
pub type TransactionPageStore = PaginatedStore<AllTransactions>;

/// Store of the "transactions by employee" view
pub type EmployeeTransactionStore = PaginatedStore<TransactionsByEmployee>;

impl<Q: PageQuery> PaginatedStore<Q> {
    pub fn new(query: Q, cache: Arc<RequestCache>) -> Self {
        Self {
            query,
            cache,
            window: RwLock::new(None),
            tracker: FetchTracker::default(),
        }
    }

    /// Current page window, if any
    pub fn data(&self) -> Option<TransactionPage> {
        self.window.read().unwrap().clone()
    }

    /// True while a fetch of this store is outstanding
    pub fn loading(&self) -> bool {
        self.tracker.loading()
    }

    /// Drop the window; responses of fetches already in flight are discarded
    pub fn invalidate(&self) {
        let mut window = self.window.write().unwrap();
        self.tracker.invalidate();
        *window = None;
    }

    /// Zero-based page index a fetch will request
    ///
    /// An explicit 1-based `page` wins, then the cursor of the live window,
    /// then the first page.
    pub fn page_index(&self, page: Option<usize>) -> usize {
        match page.filter(|p| *p > 0) {
            Some(page) => page - 1,
            None => self
                .window
                .read()
                .unwrap()
                .as_ref()
                .and_then(|w| w.next_page)
                .unwrap_or(0),
        }
    }

    /// Fetch one page and merge it into the window
    ///
    /// On failure the previous window is left as it was.
    pub async fn fetch_page(
        &self,
        filter: &Q::Filter,
        page_size: usize,
        page: Option<usize>,
    ) -> CoreResult<()> {
        if page_size < 1 {
            return Err(CoreError::validation(
                "Page size must be greater than or equal to 1",
            ));
        }

        let index = self.page_index(page);
        let request = self.query.build_request(filter, index, page_size)?;

        let ticket = self.tracker.begin();
        let response = self.cache.fetch_with_cache(&request).await;

        let mut window = self.window.write().unwrap();
        if !ticket.is_current() {
            log::debug!(
                "{}: discarding stale response for page {} (generation {})",
                self.query.name(),
                index,
                ticket.generation()
            );
            return Ok(());
        }

        match response {
            Some(response) => {
                *window = Some(merge_window(window.as_ref(), response));
                Ok(())
            }
            None => Err(CoreError::FetchFailed {
                key: <Q::Request as CachedRequest>::KEY.to_string(),
            }),
        }
    }

    /// Flip the approval flag of a row in the live window
    ///
    /// Returns false when the transaction is not on the current page.
    pub fn set_approval_in_window(&self, transaction_id: &str, value: bool) -> bool {
        let mut window = self.window.write().unwrap();
        let row = window
            .as_mut()
            .and_then(|w| w.data.iter_mut().find(|t| t.id == transaction_id));
        match row {
            Some(transaction) => {
                transaction.approved = value;
                true
            }
            None => false,
        }
    }
}

/// Merge a fresh response into the previous window
///
/// Without a previous window the response is taken verbatim. Otherwise rows
/// and cursor come from the response while the total established by the
/// first fetch of this filter is kept.
pub fn merge_window(previous: Option<&TransactionPage>, response: TransactionPage) -> TransactionPage {
    match previous {
        None => response,
        Some(previous) => TransactionPage {
            data: response.data,
            next_page: response.next_page,
            total_transactions: previous.total_transactions,
        },
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_provider, Call, GatedProvider, RecordingProvider};

    fn all_store() -> (TransactionPageStore, Arc<RecordingProvider>) {
        let recorder = Arc::new(RecordingProvider::new(fixture_provider()));
        let cache = Arc::new(RequestCache::new(recorder.clone()));
        (PaginatedStore::new(AllTransactions, cache), recorder)
    }

    fn employee_store() -> (EmployeeTransactionStore, Arc<RecordingProvider>) {
        let recorder = Arc::new(RecordingProvider::new(fixture_provider()));
        let cache = Arc::new(RequestCache::new(recorder.clone()));
        (PaginatedStore::new(TransactionsByEmployee, cache), recorder)
    }

    #[tokio::test]
    async fn test_explicit_page_requests_zero_based_index() {
        let (store, recorder) = all_store();
        for page in 1..=2 {
            store.fetch_page(&(), 3, Some(page)).await.unwrap();
        }
        assert_eq!(
            recorder.calls(),
            vec![
                Call::Transactions { page: 0, page_size: 3 },
                Call::Transactions { page: 1, page_size: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_page_follows_cursor_then_defaults_to_zero() {
        let (store, recorder) = all_store();
        store.fetch_page(&(), 3, None).await.unwrap();
        store.fetch_page(&(), 3, None).await.unwrap();
        store.fetch_page(&(), 3, None).await.unwrap();

        // the third page is the last one, so its cursor is gone
        assert_eq!(store.data().unwrap().next_page, None);
        assert_eq!(store.page_index(None), 0);

        let pages: Vec<usize> = recorder
            .calls()
            .into_iter()
            .map(|c| match c {
                Call::Transactions { page, .. } => page,
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        assert_eq!(pages, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_page_zero_counts_as_no_page() {
        let (store, _) = all_store();
        store.fetch_page(&(), 5, Some(1)).await.unwrap();
        assert_eq!(store.page_index(Some(0)), 1);
    }

    #[tokio::test]
    async fn test_fetch_replaces_window_and_keeps_first_total() {
        let (store, _) = all_store();
        store.fetch_page(&(), 5, Some(1)).await.unwrap();
        let first = store.data().unwrap();
        assert_eq!(first.data.len(), 5);
        assert_eq!(first.total_transactions, 8);
        assert_eq!(first.next_page, Some(1));

        store.fetch_page(&(), 5, Some(2)).await.unwrap();
        let second = store.data().unwrap();
        assert_eq!(second.data.len(), 3);
        assert_eq!(second.next_page, None);
        assert_eq!(second.total_transactions, 8);
        assert!(second.data.iter().all(|t| !first.data.contains(t)));
    }

    #[test]
    fn test_merge_keeps_previous_total_over_response_total() {
        let previous = TransactionPage {
            data: vec![],
            next_page: Some(1),
            total_transactions: 8,
        };
        let response = TransactionPage {
            data: vec![],
            next_page: None,
            total_transactions: 0,
        };

        let merged = merge_window(Some(&previous), response.clone());
        assert_eq!(merged.total_transactions, 8);
        assert_eq!(merged.next_page, None);

        let bootstrap = merge_window(None, response);
        assert_eq!(bootstrap.total_transactions, 0);
    }

    #[tokio::test]
    async fn test_invalidate_then_fetch_takes_fresh_total() {
        let (store, _) = all_store();
        store.fetch_page(&(), 5, Some(1)).await.unwrap();
        store.invalidate();
        assert!(store.data().is_none());

        store.fetch_page(&(), 3, Some(1)).await.unwrap();
        assert_eq!(store.data().unwrap().total_transactions, 8);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_window_intact() {
        let (store, _) = all_store();
        store.fetch_page(&(), 5, Some(1)).await.unwrap();
        let before = store.data();

        let err = store.fetch_page(&(), 5, Some(9)).await.unwrap_err();
        assert!(matches!(err, CoreError::FetchFailed { .. }));
        assert_eq!(store.data(), before);
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_failed_first_fetch_leaves_store_empty() {
        let (store, _) = all_store();
        assert!(store.fetch_page(&(), 5, Some(9)).await.is_err());
        assert!(store.data().is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_fetch() {
        let (store, recorder) = employee_store();
        let err = store.fetch_page("", 5, Some(1)).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        let err = store.fetch_page("emp-x", 0, Some(1)).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_employee_store_scopes_window() {
        let (store, recorder) = employee_store();
        store.fetch_page("emp-x", 5, Some(1)).await.unwrap();

        let window = store.data().unwrap();
        assert_eq!(window.total_transactions, 2);
        assert!(window.data.iter().all(|t| t.employee.id == "emp-x"));
        assert_eq!(
            recorder.calls(),
            vec![Call::ByEmployee {
                page: 0,
                page_size: 5,
                employee_id: "emp-x".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_late_response_is_discarded() {
        let gated = Arc::new(GatedProvider::new(fixture_provider()));
        let cache = Arc::new(RequestCache::new(gated.clone()));
        let store = PaginatedStore::new(AllTransactions, cache);

        let slow = gated.hold_next();
        let fast = gated.hold_next();

        let slow_fetch = store.fetch_page(&(), 5, Some(1));
        let fast_fetch = async {
            tokio::task::yield_now().await;
            let result = store.fetch_page(&(), 5, Some(2)).await;
            slow.notify_one();
            result
        };
        fast.notify_one();

        let (slow_result, fast_result) = tokio::join!(slow_fetch, fast_fetch);
        slow_result.unwrap();
        fast_result.unwrap();

        // page 2 was issued last, so page 1 resolving afterwards is ignored
        let window = store.data().unwrap();
        assert_eq!(window.data.len(), 3);
        assert_eq!(window.next_page, None);
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_response_after_invalidate_is_discarded() {
        let gated = Arc::new(GatedProvider::new(fixture_provider()));
        let cache = Arc::new(RequestCache::new(gated.clone()));
        let store = PaginatedStore::new(AllTransactions, cache);

        let gate = gated.hold_next();
        let fetch = store.fetch_page(&(), 5, Some(1));
        let invalidate = async {
            tokio::task::yield_now().await;
            assert!(store.loading());
            store.invalidate();
            gate.notify_one();
        };

        let (result, _) = tokio::join!(fetch, invalidate);
        result.unwrap();
        assert!(store.data().is_none());
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_set_approval_in_window() {
        let (store, _) = all_store();
        store.fetch_page(&(), 5, Some(1)).await.unwrap();
        let id = store.data().unwrap().data[0].id.clone();

        assert!(store.set_approval_in_window(&id, true));
        assert!(store.data().unwrap().data[0].approved);
        assert!(!store.set_approval_in_window("not-on-page", true));
    }
}
