//! In-memory referral collection
//!
//! The repository is the canonical store behind [`MockApi`](crate::MockApi).
//! It is created explicitly (empty, from records, or seeded) and shared by
//! `Arc`, so every test gets its own collection.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use referly_core::{
    page_window, HistoryPage, HistoryQuery, Referral, ReferralFormData, ReferralStatus,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::error::{ApiError, Result};

/// Generated users added after the fixed first record
const SEED_USERS: usize = 15;

/// Age range of generated referrals, in days
const SEED_MAX_AGE_DAYS: i64 = 30;

/// Owned referral collection, newest first
#[derive(Debug, Default)]
pub struct ReferralRepository {
    records: Mutex<Vec<Referral>>,
}

impl ReferralRepository {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection holding exactly `records`, in order
    pub fn from_records(records: Vec<Referral>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Demo collection: one fixed record followed by fifteen generated users
    pub fn seeded<R: Rng>(rng: &mut R) -> Self {
        Self::from_records(seed_records(rng, Utc::now()))
    }

    fn records(&self) -> MutexGuard<'_, Vec<Referral>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Copy of the whole collection
    pub fn snapshot(&self) -> Vec<Referral> {
        self.records().clone()
    }

    /// Exact, case-sensitive email lookup
    pub fn contains_email(&self, email: &str) -> bool {
        self.records().iter().any(|r| r.email == email)
    }

    /// Filter by status and search, then cut out the requested page
    pub fn query(&self, query: &HistoryQuery) -> HistoryPage {
        let page = query.resolved_page();
        let limit = query.resolved_limit();

        let records = self.records();
        let matching: Vec<&Referral> = records.iter().filter(|r| query.accepts(r)).collect();
        let data = page_window(&matching, page, limit)
            .iter()
            .map(|r| (*r).clone())
            .collect();

        HistoryPage {
            data,
            total: matching.len(),
            page,
            limit,
        }
    }

    /// Prepend a new pending referral unless the email is already taken.
    ///
    /// The duplicate check and the insert run under one lock.
    pub fn insert_unique(&self, form: ReferralFormData, now: DateTime<Utc>) -> Result<Referral> {
        let mut records = self.records();
        if records.iter().any(|r| r.email == form.email) {
            return Err(ApiError::Conflict { email: form.email });
        }

        let referral = Referral {
            id: next_id(&records),
            name: form.name,
            email: form.email,
            phone: form.phone.unwrap_or_default(),
            status: ReferralStatus::Pending,
            date: now,
        };
        records.insert(0, referral.clone());
        debug!(id = %referral.id, total = records.len(), "referral inserted");
        Ok(referral)
    }
}

/// One past the highest numeric id, so a new id never collides.
///
/// Ids that cannot be incremented are skipped.
fn next_id(records: &[Referral]) -> String {
    let highest = records
        .iter()
        .filter_map(|r| r.id.parse::<u64>().ok())
        .filter(|id| *id < u64::MAX)
        .max()
        .unwrap_or(0);
    let len = u64::try_from(records.len()).unwrap_or(u64::MAX - 1);
    highest
        .max(len)
        .checked_add(1)
        .unwrap_or(u64::MAX)
        .to_string()
}

fn seed_records<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<Referral> {
    let mut records = Vec::with_capacity(SEED_USERS + 1);
    records.push(Referral {
        id: "1".to_string(),
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        phone: "+8801712345678".to_string(),
        status: ReferralStatus::Pending,
        date: now - Duration::days(2),
    });

    for n in 2..=SEED_USERS + 1 {
        let status = ReferralStatus::ALL[rng.gen_range(0..ReferralStatus::ALL.len())];
        records.push(Referral {
            id: n.to_string(),
            name: format!("User {n}"),
            email: format!("user{n}@example.com"),
            phone: format!("+88017{}", rng.gen_range(1_000_000..10_000_000)),
            status,
            date: now - Duration::days(rng.gen_range(0..SEED_MAX_AGE_DAYS)),
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn seeded_collection_has_sixteen_unique_records() {
        let repo = ReferralRepository::seeded(&mut StdRng::seed_from_u64(1));
        let records = repo.snapshot();
        assert_eq!(records.len(), 16);
        assert_eq!(records[0].name, "John Doe");
        assert_eq!(records[15].email, "user16@example.com");

        let mut emails: Vec<&str> = records.iter().map(|r| r.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), 16);
    }

    #[test]
    fn seeding_is_deterministic_per_seed() {
        let a = ReferralRepository::seeded(&mut StdRng::seed_from_u64(9)).snapshot();
        let b = ReferralRepository::seeded(&mut StdRng::seed_from_u64(9)).snapshot();
        let statuses = |v: &[Referral]| v.iter().map(|r| r.status).collect::<Vec<_>>();
        let phones = |v: &[Referral]| v.iter().map(|r| r.phone.clone()).collect::<Vec<_>>();
        assert_eq!(statuses(&a), statuses(&b));
        assert_eq!(phones(&a), phones(&b));
    }

    #[test]
    fn generated_phones_have_local_prefix() {
        let repo = ReferralRepository::seeded(&mut StdRng::seed_from_u64(3));
        for r in repo.snapshot().iter().skip(1) {
            assert!(r.phone.starts_with("+88017"), "{}", r.phone);
            assert_eq!(r.phone.len(), "+88017".len() + 7);
        }
    }

    #[test]
    fn next_id_skips_past_gaps() {
        let repo = ReferralRepository::new();
        let now = Utc::now();
        repo.insert_unique(ReferralFormData::new("a", "a@x.com"), now)
            .unwrap();
        let records = vec![
            Referral {
                id: "7".into(),
                ..repo.snapshot()[0].clone()
            },
            Referral {
                id: "2".into(),
                email: "b@x.com".into(),
                ..repo.snapshot()[0].clone()
            },
        ];
        assert_eq!(next_id(&records), "8");
        assert_eq!(next_id(&[]), "1");
    }

    #[test]
    fn next_id_ignores_ids_at_the_numeric_limit() {
        let base = Referral {
            id: u64::MAX.to_string(),
            name: "Max".into(),
            email: "max@x.com".into(),
            phone: String::new(),
            status: ReferralStatus::Pending,
            date: Utc::now(),
        };
        let records = vec![
            base.clone(),
            Referral {
                id: "3".into(),
                email: "three@x.com".into(),
                ..base
            },
        ];
        assert_eq!(next_id(&records), "4");

        let repo = ReferralRepository::from_records(records);
        let created = repo
            .insert_unique(ReferralFormData::new("New", "new@x.com"), Utc::now())
            .unwrap();
        assert_eq!(created.id, "4");
    }

    #[test]
    fn missing_phone_is_stored_empty() {
        let repo = ReferralRepository::new();
        let created = repo
            .insert_unique(ReferralFormData::new("A", "a@x.com"), Utc::now())
            .unwrap();
        assert_eq!(created.phone, "");
        assert_eq!(created.id, "1");
    }
}
