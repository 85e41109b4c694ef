//! Referly Core
//!
//! Foundational pieces shared by the Referly crates:
//!
//! - **Domain types**: referrals, points balances, profiles and history queries
//! - **Pagination**: the page window used by both the service and the stores
//! - **State cells**: observable snapshots with drop-scoped subscriptions
//!
//! # Example
//!
//! ```rust
//! use referly_core::StateCell;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let count = StateCell::new(0i32);
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let seen_clone = Arc::clone(&seen);
//! let subscription = count.subscribe(move |_| {
//!     seen_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! count.set(5);
//! assert_eq!(count.get(), 5);
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//!
//! drop(subscription);
//! count.set(6);
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

pub mod pagination;
pub mod state;
pub mod types;

pub use pagination::{page_count, page_window, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use state::{ListenerId, StateCell, Subscription};
pub use types::{
    HistoryPage, HistoryQuery, ParseStatusError, PointsBalance, Profile, Referral,
    ReferralFormData, ReferralStatus, StatusFilter,
};
