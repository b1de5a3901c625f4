//! Employee directory store

use std::sync::{Arc, RwLock};

use spendweb_provider::Employee;

use crate::cache::{EmployeesRequest, RequestCache, EMPLOYEES_KEY};
use crate::error::{CoreError, CoreResult};
use crate::store::FetchTracker;

/// Unpaginated employee list, kept in provider order
pub struct EmployeeDirectory {
    cache: Arc<RequestCache>,
    employees: RwLock<Option<Vec<Employee>>>,
    tracker: FetchTracker,
}

impl EmployeeDirectory {
    pub fn new(cache: Arc<RequestCache>) -> Self {
        Self {
            cache,
            employees: RwLock::new(None),
            tracker: FetchTracker::default(),
        }
    }

    pub fn data(&self) -> Option<Vec<Employee>> {
        self.employees.read().unwrap().clone()
    }

    pub fn loading(&self) -> bool {
        self.tracker.loading()
    }

    /// Look up one employee of the loaded directory
    pub fn employee(&self, id: &str) -> Option<Employee> {
        self.employees
            .read()
            .unwrap()
            .as_ref()
            .and_then(|list| list.iter().find(|e| e.id == id).cloned())
    }

    /// Fetch the list and replace the held one
    pub async fn fetch_all(&self) -> CoreResult<()> {
        let ticket = self.tracker.begin();
        let response = self.cache.fetch_with_cache(&EmployeesRequest).await;

        let mut employees = self.employees.write().unwrap();
        if !ticket.is_current() {
            log::debug!("directory: discarding stale employee list");
            return Ok(());
        }

        match response {
            Some(list) => {
                *employees = Some(list);
                Ok(())
            }
            None => Err(CoreError::FetchFailed {
                key: EMPLOYEES_KEY.to_string(),
            }),
        }
    }

    /// Fetch the list from the provider, skipping any cached copy
    pub async fn refresh(&self) -> CoreResult<()> {
        self.cache.clear_by_key(EMPLOYEES_KEY);
        self.fetch_all().await
    }

    pub fn invalidate(&self) {
        let mut employees = self.employees.write().unwrap();
        self.tracker.invalidate();
        *employees = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_employees, fixture_provider, Call, RecordingProvider};

    fn directory() -> (EmployeeDirectory, Arc<RecordingProvider>) {
        let recorder = Arc::new(RecordingProvider::new(fixture_provider()));
        let cache = Arc::new(RequestCache::new(recorder.clone()));
        (EmployeeDirectory::new(cache), recorder)
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_provider_order() {
        let (directory, _) = directory();
        assert!(directory.data().is_none());

        directory.fetch_all().await.unwrap();
        assert_eq!(directory.data(), Some(fixture_employees()));
        assert_eq!(directory.employee("emp-x").unwrap().first_name, "Xena");
        assert!(!directory.loading());
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let (directory, recorder) = directory();
        directory.fetch_all().await.unwrap();
        directory.fetch_all().await.unwrap();
        assert_eq!(recorder.calls(), vec![Call::Employees]);

        directory.refresh().await.unwrap();
        assert_eq!(recorder.calls(), vec![Call::Employees, Call::Employees]);
    }

    #[tokio::test]
    async fn test_invalidate_clears_list() {
        let (directory, _) = directory();
        directory.fetch_all().await.unwrap();
        directory.invalidate();
        assert!(directory.data().is_none());
        assert!(directory.employee("emp-a").is_none());
    }
}
