//! Service seam between stores and the referral backend

use async_trait::async_trait;
use referly_core::{HistoryPage, HistoryQuery, PointsBalance, Profile, Referral, ReferralFormData};

use crate::error::Result;

/// Operations the stores need from a referral backend
#[async_trait]
pub trait ReferralApi: Send + Sync {
    /// The signed-in user's profile
    async fn get_my_profile(&self) -> Result<Profile>;

    /// One page of the user's referral history
    async fn get_my_history(&self, query: HistoryQuery) -> Result<HistoryPage>;

    /// Submit a referral by hand; fails with a conflict on a known email
    async fn post_manual(&self, form: ReferralFormData) -> Result<Referral>;

    /// Create a referral from the referral form
    async fn create_referral(&self, form: ReferralFormData) -> Result<Referral> {
        self.post_manual(form).await
    }

    /// Current points balance
    async fn get_points(&self) -> Result<PointsBalance>;
}
