//! Referly mock referral API
//!
//! An in-process stand-in for the referral backend:
//!
//! - [`ReferralApi`]: the async operations the stores depend on
//! - [`ReferralRepository`]: the owned, seeded referral collection
//! - [`MockApi`]: delay-simulated implementation over a repository
//!
//! # Example
//!
//! ```rust,ignore
//! use referly_api::{ApiConfig, MockApi, ReferralApi};
//! use referly_core::HistoryQuery;
//!
//! let api = MockApi::seeded(ApiConfig::default());
//! let page = api.get_my_history(HistoryQuery::new().page(2)).await?;
//! assert_eq!(page.total, 16);
//! ```

mod api;
mod config;
mod error;
mod mock;
mod repository;

pub use api::ReferralApi;
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use mock::MockApi;
pub use repository::ReferralRepository;
