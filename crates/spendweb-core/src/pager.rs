//! Pager control
//!
//! [`PagerLayout::compute`] turns item count, page size and the current page
//! into Previous / page / Next buttons. [`PagerControl`] adds the local busy
//! flag that disables every button while a page change is running.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{CoreError, CoreResult};

/// Number of pages for `total_items`, with the page size clamped to `1..=total_items`
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if total_items == 0 {
        return 0;
    }
    let page_size = page_size.clamp(1, total_items);
    total_items.div_ceil(page_size)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerButton {
    pub label: String,
    /// 1-based page the button requests
    pub page: usize,
    pub active: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerLayout {
    pub previous: PagerButton,
    pub pages: Vec<PagerButton>,
    pub next: PagerButton,
    pub current_page: usize,
    pub total_pages: usize,
}

impl PagerLayout {
    /// Lay out the pager; `disabled` greys out every button
    ///
    /// A `current_page` of 0 means nothing is loaded: Previous and Next are
    /// both disabled.
    pub fn compute(total_items: usize, page_size: usize, current_page: usize, disabled: bool) -> Self {
        let total_pages = total_pages(total_items, page_size);

        let pages = (1..=total_pages)
            .map(|page| PagerButton {
                label: page.to_string(),
                page,
                active: page == current_page,
                disabled,
            })
            .collect();

        let previous = PagerButton {
            label: "Previous".to_string(),
            page: current_page.saturating_sub(1),
            active: false,
            disabled: disabled || current_page <= 1,
        };

        let next = PagerButton {
            label: "Next".to_string(),
            page: current_page + 1,
            active: false,
            disabled: disabled || current_page == 0 || current_page >= total_pages,
        };

        Self {
            previous,
            pages,
            next,
            current_page,
            total_pages,
        }
    }
}

/// Busy flag and last requested page of one rendered pager
#[derive(Debug, Default)]
pub struct PagerControl {
    busy: AtomicBool,
    current_page: AtomicUsize,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PagerControl {
    pub fn new(current_page: usize) -> Self {
        Self {
            busy: AtomicBool::new(false),
            current_page: AtomicUsize::new(current_page),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn current_page(&self) -> usize {
        self.current_page.load(Ordering::SeqCst)
    }

    /// Follow a page change made elsewhere, e.g. a filter reset to page 1
    pub fn sync(&self, current_page: usize) {
        self.current_page.store(current_page, Ordering::SeqCst);
    }

    /// Layout for the current page; `loading` is the caller's global flag
    pub fn layout(&self, total_items: usize, page_size: usize, loading: bool) -> PagerLayout {
        PagerLayout::compute(
            total_items,
            page_size,
            self.current_page(),
            loading || self.is_busy(),
        )
    }

    /// Select `page` and run `on_change` with the buttons disabled
    ///
    /// Fails with [`CoreError::Busy`] while a previous request is running.
    pub async fn request_page<F, Fut>(&self, page: usize, on_change: F) -> CoreResult<()>
    where
        F: FnOnce(usize) -> Fut,
        Fut: Future<Output = CoreResult<()>>,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CoreError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        self.current_page.store(page, Ordering::SeqCst);
        on_change(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_three_items_in_pages_of_five() {
        let first = PagerLayout::compute(23, 5, 1, false);
        assert_eq!(first.pages.len(), 5);
        assert!(first.previous.disabled);
        assert!(!first.next.disabled);
        assert!(first.pages[0].active);

        let last = PagerLayout::compute(23, 5, 5, false);
        assert!(last.next.disabled);
        assert!(!last.previous.disabled);
        assert_eq!(last.previous.page, 4);
    }

    #[test]
    fn test_page_size_is_clamped_for_rendering_only() {
        assert_eq!(total_pages(8, 0), 8);
        assert_eq!(total_pages(8, 50), 1);
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(8, 3), 3);
    }

    #[test]
    fn test_empty_view_disables_navigation() {
        let layout = PagerLayout::compute(0, 5, 0, false);
        assert!(layout.pages.is_empty());
        assert!(layout.previous.disabled);
        assert!(layout.next.disabled);
    }

    #[test]
    fn test_global_flag_disables_every_button() {
        let layout = PagerLayout::compute(23, 5, 3, true);
        assert!(layout.pages.iter().all(|b| b.disabled));
        assert!(layout.previous.disabled && layout.next.disabled);
    }

    #[tokio::test]
    async fn test_request_page_sets_busy_while_running() {
        let control = PagerControl::new(1);
        let result = control
            .request_page(3, |page| {
                assert!(control.is_busy());
                assert!(control.layout(23, 5, false).next.disabled);
                async move {
                    assert_eq!(page, 3);
                    Ok(())
                }
            })
            .await;

        assert!(result.is_ok());
        assert!(!control.is_busy());
        assert_eq!(control.current_page(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_request_is_refused() {
        let control = PagerControl::new(1);
        let outcome = control
            .request_page(2, |_| async {
                let nested = control.request_page(4, |_| async { Ok(()) }).await;
                assert!(matches!(nested, Err(CoreError::Busy)));
                Ok(())
            })
            .await;

        assert!(outcome.is_ok());
        assert_eq!(control.current_page(), 2);
    }

    #[tokio::test]
    async fn test_busy_clears_after_failure() {
        let control = PagerControl::new(1);
        let result = control
            .request_page(9, |page| async move { Err(CoreError::InvalidPage { page }) })
            .await;
        assert!(result.is_err());
        assert!(!control.is_busy());
    }
}
