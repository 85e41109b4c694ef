//! Referly stores
//!
//! Each store owns a [`StateCell`](referly_core::StateCell) with its state and
//! exposes:
//!
//! - `state()`: an immutable snapshot
//! - `subscribe()`: change notifications, scoped to the returned subscription
//! - async actions that call a [`ReferralApi`](referly_api::ReferralApi)
//!
//! Failed actions never leave a store stuck in the loading state: the flag is
//! cleared by a drop guard, including when the action future is cancelled.
//!
//! ```rust,ignore
//! let api: Arc<dyn ReferralApi> = Arc::new(MockApi::seeded(ApiConfig::default()));
//! let referrals = ReferralStore::new(api);
//!
//! referrals.fetch_referrals().await;
//! referrals.set_status_filter(StatusFilter::Pending);
//! for referral in referrals.paginated_referrals() {
//!     println!("{} <{}>", referral.name, referral.email);
//! }
//! ```

mod loading;
pub mod points;
pub mod profile;
pub mod referral;

pub use points::{PointsState, PointsStore};
pub use profile::{ProfileState, ProfileStore};
pub use referral::{ReferralState, ReferralStore};
