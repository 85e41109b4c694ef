//! Current-user profile store

use referly_api::ReferralApi;
use referly_core::{Profile, StateCell, Subscription};
use std::sync::Arc;
use tracing::error;

use crate::loading::{Loadable, LoadingGuard};

pub const FETCH_PROFILE_ERROR: &str = "Failed to fetch profile";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Loadable for ProfileState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

pub struct ProfileStore {
    api: Arc<dyn ReferralApi>,
    state: StateCell<ProfileState>,
}

impl ProfileStore {
    pub fn new(api: Arc<dyn ReferralApi>) -> Self {
        Self {
            api,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> ProfileState {
        self.state.get()
    }

    /// Referral code to share, once the profile is loaded
    pub fn referral_code(&self) -> Option<String> {
        self.state
            .with(|state| state.profile.as_ref().map(|p| p.referral_code.clone()))
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ProfileState) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    pub async fn fetch_profile(&self) {
        let _loading = LoadingGuard::begin(&self.state);

        match self.api.get_my_profile().await {
            Ok(profile) => self.state.update(|state| state.profile = Some(profile)),
            Err(err) => {
                error!(%err, "Error fetching profile");
                self.state
                    .update(|state| state.error = Some(FETCH_PROFILE_ERROR.to_string()));
            }
        }
    }
}
