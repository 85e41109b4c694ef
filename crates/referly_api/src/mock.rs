//! Delay-simulated referral service
//!
//! Every operation first sleeps for `base + random(0..=jitter)` to stand in
//! for network latency, then works against the shared [`ReferralRepository`].

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use referly_core::{HistoryPage, HistoryQuery, PointsBalance, Profile, Referral, ReferralFormData};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::ReferralApi;
use crate::config::ApiConfig;
use crate::error::Result;
use crate::repository::ReferralRepository;

/// Mock implementation of [`ReferralApi`]
pub struct MockApi {
    repository: Arc<ReferralRepository>,
    config: ApiConfig,
    rng: Mutex<StdRng>,
}

impl MockApi {
    /// Service over an existing repository
    pub fn new(repository: Arc<ReferralRepository>, config: ApiConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            repository,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Service over a freshly seeded demo repository
    pub fn seeded(config: ApiConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let repository = Arc::new(ReferralRepository::seeded(&mut rng));
        Self {
            repository,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn repository(&self) -> &Arc<ReferralRepository> {
        &self.repository
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Sleep for `base` plus a random share of the configured jitter
    pub async fn delay(&self, base: Duration) {
        let total = self.total_delay(base);
        if !total.is_zero() {
            tokio::time::sleep(total).await;
        }
    }

    /// `base` plus sampled jitter, saturating at `Duration::MAX`
    fn total_delay(&self, base: Duration) -> Duration {
        base.saturating_add(self.sample_jitter())
    }

    fn sample_jitter(&self) -> Duration {
        let jitter_ms = self.config.jitter_ms;
        if jitter_ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Duration::from_millis(rng.gen_range(0..=jitter_ms))
    }

    async fn latency(&self) {
        self.delay(self.config.base_delay()).await;
    }
}

#[async_trait]
impl ReferralApi for MockApi {
    async fn get_my_profile(&self) -> Result<Profile> {
        self.latency().await;
        Ok(Profile {
            id: "user-123".to_string(),
            name: "Current User".to_string(),
            email: "user@example.com".to_string(),
            referral_code: "REF12345".to_string(),
        })
    }

    async fn get_my_history(&self, query: HistoryQuery) -> Result<HistoryPage> {
        self.latency().await;
        let page = self.repository.query(&query);
        debug!(
            page = page.page,
            limit = page.limit,
            returned = page.data.len(),
            total = page.total,
            "history served"
        );
        Ok(page)
    }

    async fn post_manual(&self, form: ReferralFormData) -> Result<Referral> {
        self.latency().await;
        self.repository
            .insert_unique(form, Utc::now())
            .map_err(|err| {
                warn!(%err, "manual referral rejected");
                err
            })
    }

    async fn get_points(&self) -> Result<PointsBalance> {
        self.latency().await;
        Ok(PointsBalance {
            current: 1250,
            lifetime: 2500,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_profile_and_points() {
        let api = MockApi::new(Arc::new(ReferralRepository::new()), ApiConfig::instant());

        let profile = api.get_my_profile().await.unwrap();
        assert_eq!(profile.referral_code, "REF12345");

        let points = api.get_points().await.unwrap();
        assert_eq!(points.current, 1250);
        assert_eq!(points.lifetime, 2500);
    }

    #[tokio::test]
    async fn delay_waits_at_least_base() {
        let api = MockApi::new(
            Arc::new(ReferralRepository::new()),
            ApiConfig::instant().with_latency(Duration::ZERO, Duration::from_millis(5)),
        );
        let start = std::time::Instant::now();
        api.delay(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn huge_latency_saturates() {
        let api = MockApi::new(
            Arc::new(ReferralRepository::new()),
            ApiConfig::instant().with_latency(Duration::MAX, Duration::from_millis(5)),
        );
        assert_eq!(api.config().base_delay_ms, u64::MAX);
        assert_eq!(api.total_delay(Duration::MAX), Duration::MAX);
        let base = api.config().base_delay();
        assert!(api.total_delay(base) >= base);
    }

    #[tokio::test]
    async fn create_referral_goes_through_manual_submission() {
        let api = MockApi::new(Arc::new(ReferralRepository::new()), ApiConfig::instant());
        let created = api
            .create_referral(ReferralFormData::new("A", "a@x.com").with_phone("+1"))
            .await
            .unwrap();
        assert_eq!(created.phone, "+1");
        assert!(api.repository().contains_email("a@x.com"));
    }
}
