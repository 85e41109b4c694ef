//! Referral list store
//!
//! The store fetches one page from the service and then filters and pages
//! that result again on the client. Both stages run on every read:
//!
//! ```text
//! service:  collection ──filter──► page 1 (≤ 10) ──► referrals
//! store:    referrals  ──search + status──► filtered_referrals ──page──► paginated_referrals
//! ```
//!
//! Records that were not in the fetched page never show up client-side, even
//! when they would match the local search.

use referly_api::{ApiError, ReferralApi};
use referly_core::{
    page_count, page_window, HistoryQuery, Referral, ReferralFormData, StateCell, StatusFilter,
    Subscription, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::loading::{Loadable, LoadingGuard};

pub const FETCH_REFERRALS_ERROR: &str = "Failed to fetch referrals";
pub const ADD_REFERRAL_ERROR: &str = "Failed to add referral";

/// Snapshot of the referral store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferralState {
    /// Last page fetched from the service
    pub referrals: Vec<Referral>,
    /// Server-side match count reported with that page
    pub total_items: usize,
    pub loading: bool,
    pub error: Option<String>,
    /// 1-based page of the client-side view
    pub current_page: usize,
    pub items_per_page: usize,
    pub search_query: String,
    pub status_filter: StatusFilter,
}

impl Default for ReferralState {
    fn default() -> Self {
        Self {
            referrals: Vec::new(),
            total_items: 0,
            loading: false,
            error: None,
            current_page: DEFAULT_PAGE,
            items_per_page: DEFAULT_PAGE_SIZE,
            search_query: String::new(),
            status_filter: StatusFilter::All,
        }
    }
}

impl ReferralState {
    /// Fetched referrals matching the search (name or email) and the status filter
    pub fn filtered_referrals(&self) -> Vec<Referral> {
        self.referrals
            .iter()
            .filter(|r| r.matches_search(&self.search_query) && self.status_filter.matches(r.status))
            .cloned()
            .collect()
    }

    /// Current page of [`filtered_referrals`](Self::filtered_referrals)
    pub fn paginated_referrals(&self) -> Vec<Referral> {
        let filtered = self.filtered_referrals();
        page_window(&filtered, self.current_page, self.items_per_page).to_vec()
    }

    /// Pages needed for `total_items` at the current page size
    pub fn total_pages(&self) -> usize {
        page_count(self.total_items, self.items_per_page)
    }
}

impl Loadable for ReferralState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

/// Holds the user's referrals and the list view's query state
pub struct ReferralStore {
    api: Arc<dyn ReferralApi>,
    state: StateCell<ReferralState>,
}

impl ReferralStore {
    pub fn new(api: Arc<dyn ReferralApi>) -> Self {
        Self {
            api,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> ReferralState {
        self.state.get()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ReferralState) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    pub fn filtered_referrals(&self) -> Vec<Referral> {
        self.state.with(ReferralState::filtered_referrals)
    }

    pub fn paginated_referrals(&self) -> Vec<Referral> {
        self.state.with(ReferralState::paginated_referrals)
    }

    /// Load the first page of history from the service.
    ///
    /// Failures are recorded in `error` and logged, never returned. Concurrent
    /// calls are not serialized; whichever resolves last wins.
    pub async fn fetch_referrals(&self) {
        let _loading = LoadingGuard::begin(&self.state);

        match self.api.get_my_history(HistoryQuery::default()).await {
            Ok(page) => {
                debug!(fetched = page.data.len(), total = page.total, "referrals fetched");
                self.state.update(|state| {
                    state.referrals = page.data;
                    state.total_items = page.total;
                });
            }
            Err(err) => {
                error!(%err, "Error fetching referrals");
                self.state
                    .update(|state| state.error = Some(FETCH_REFERRALS_ERROR.to_string()));
            }
        }
    }

    /// Create a referral, then reload the list.
    ///
    /// On failure the error message is recorded and the error is returned to
    /// the caller.
    pub async fn add_referral(&self, form: ReferralFormData) -> Result<Referral, ApiError> {
        let _loading = LoadingGuard::begin(&self.state);

        match self.api.create_referral(form).await {
            Ok(created) => {
                debug!(id = %created.id, "referral added");
                self.fetch_referrals().await;
                Ok(created)
            }
            Err(err) => {
                error!(%err, "Error adding referral");
                self.state
                    .update(|state| state.error = Some(ADD_REFERRAL_ERROR.to_string()));
                Err(err)
            }
        }
    }

    pub fn set_page(&self, page: usize) {
        self.state
            .update(|state| state.current_page = page.max(DEFAULT_PAGE));
    }

    /// Change the status filter and go back to the first page
    pub fn set_status_filter(&self, status: StatusFilter) {
        self.state.update(|state| {
            state.status_filter = status;
            state.current_page = DEFAULT_PAGE;
        });
    }

    /// Change the search text and go back to the first page
    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.update(|state| {
            state.search_query = query;
            state.current_page = DEFAULT_PAGE;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use referly_core::ReferralStatus;

    fn referral(n: usize, status: ReferralStatus) -> Referral {
        Referral {
            id: n.to_string(),
            name: format!("User {n}"),
            email: format!("user{n}@example.com"),
            phone: String::new(),
            status,
            date: Utc::now(),
        }
    }

    fn state_with(count: usize) -> ReferralState {
        ReferralState {
            referrals: (1..=count)
                .map(|n| referral(n, ReferralStatus::ALL[n % 3]))
                .collect(),
            total_items: count,
            ..ReferralState::default()
        }
    }

    #[test]
    fn defaults() {
        let state = ReferralState::default();
        assert_eq!(state.current_page, 1);
        assert_eq!(state.items_per_page, 10);
        assert_eq!(state.status_filter, StatusFilter::All);
        assert!(state.paginated_referrals().is_empty());
    }

    #[test]
    fn filter_combines_search_and_status() {
        let mut state = state_with(9);
        state.search_query = "USER".to_string();
        state.status_filter = StatusFilter::Pending;
        let filtered = state.filtered_referrals();
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.status == ReferralStatus::Pending));
    }

    #[test]
    fn pages_over_filtered_list() {
        let mut state = state_with(10);
        state.items_per_page = 4;
        state.current_page = 3;
        let page = state.paginated_referrals();
        assert_eq!(page.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), ["9", "10"]);
    }

    #[test]
    fn total_pages_follows_server_total() {
        let mut state = state_with(10);
        state.total_items = 16;
        assert_eq!(state.total_pages(), 2);
    }
}
