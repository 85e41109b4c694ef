//! Points balance store

use referly_api::ReferralApi;
use referly_core::{StateCell, Subscription};
use std::sync::Arc;
use tracing::{debug, error};

use crate::loading::{Loadable, LoadingGuard};

/// Message stored when the balance cannot be fetched
pub const FETCH_POINTS_ERROR: &str = "Failed to fetch points balance";

/// Snapshot of the points store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointsState {
    pub current_points: i64,
    pub lifetime_points: i64,
    pub loading: bool,
    pub error: Option<String>,
}

impl Loadable for PointsState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

/// Holds the user's points balance
pub struct PointsStore {
    api: Arc<dyn ReferralApi>,
    state: StateCell<PointsState>,
}

impl PointsStore {
    pub fn new(api: Arc<dyn ReferralApi>) -> Self {
        Self {
            api,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> PointsState {
        self.state.get()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PointsState) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    /// Load the balance; failures are recorded in `error` and logged
    pub async fn fetch_points(&self) {
        let _loading = LoadingGuard::begin(&self.state);

        match self.api.get_points().await {
            Ok(balance) => {
                debug!(current = balance.current, lifetime = balance.lifetime, "points fetched");
                self.state.update(|state| {
                    state.current_points = balance.current;
                    state.lifetime_points = balance.lifetime;
                });
            }
            Err(err) => {
                error!(%err, "Error fetching points");
                self.state
                    .update(|state| state.error = Some(FETCH_POINTS_ERROR.to_string()));
            }
        }
    }
}
