//! Domain types
//!
//! Field names serialize the way the referral API reports them
//! (`referralCode`, lowercase statuses, ISO-8601 dates).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

/// Review state of a referral
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReferralStatus {
    /// Every status, in display order
    pub const ALL: [ReferralStatus; 3] = [
        ReferralStatus::Pending,
        ReferralStatus::Approved,
        ReferralStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Approved => "approved",
            ReferralStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status or filter name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown referral status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for ReferralStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReferralStatus::Pending),
            "approved" => Ok(ReferralStatus::Approved),
            "rejected" => Ok(ReferralStatus::Rejected),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Status filter applied to referral listings; `All` disables the filter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    /// The status this filter pins, or `None` for `All`
    pub fn status(&self) -> Option<ReferralStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(ReferralStatus::Pending),
            StatusFilter::Approved => Some(ReferralStatus::Approved),
            StatusFilter::Rejected => Some(ReferralStatus::Rejected),
        }
    }

    /// Exact status match, always true for `All`
    pub fn matches(&self, status: ReferralStatus) -> bool {
        self.status().map_or(true, |wanted| wanted == status)
    }

    pub fn as_str(&self) -> &'static str {
        self.status().map_or("all", |s| s.as_str())
    }
}

impl From<ReferralStatus> for StatusFilter {
    fn from(status: ReferralStatus) -> Self {
        match status {
            ReferralStatus::Pending => StatusFilter::Pending,
            ReferralStatus::Approved => StatusFilter::Approved,
            ReferralStatus::Rejected => StatusFilter::Rejected,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse::<ReferralStatus>().map(StatusFilter::from)
    }
}

/// A prospective customer submitted by the current user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: ReferralStatus,
    pub date: DateTime<Utc>,
}

impl Referral {
    /// Case-insensitive substring match against name or email.
    ///
    /// An empty query matches every referral.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.email.to_lowercase().contains(&needle)
    }
}

/// Manual referral submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralFormData {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ReferralFormData {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Points snapshot; replaced wholesale on every fetch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBalance {
    /// Spendable points
    pub current: i64,
    /// Points earned since the account was opened
    pub lifetime: i64,
}

/// The signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub referral_code: String,
}

/// Parameters of a referral history request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
    #[serde(default)]
    pub search: Option<String>,
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn status(mut self, status: impl Into<StatusFilter>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Requested page; missing or zero reads as the first page
    pub fn resolved_page(&self) -> usize {
        match self.page {
            Some(page) if page > 0 => page,
            _ => DEFAULT_PAGE,
        }
    }

    /// Requested page size; missing or zero reads as the default size
    pub fn resolved_limit(&self) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// True when `referral` passes both the status filter and the search
    pub fn accepts(&self, referral: &Referral) -> bool {
        let status_ok = self
            .status
            .map_or(true, |filter| filter.matches(referral.status));
        let search_ok = match self.search.as_deref() {
            Some(query) if !query.is_empty() => referral.matches_search(query),
            _ => true,
        };
        status_ok && search_ok
    }
}

/// One page of referral history
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub data: Vec<Referral>,
    /// Matching records before slicing
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}
