//! Subcommand implementations
//!
//! Every command returns its rendered output so `main` only has to print it.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use referly_api::ReferralApi;
use referly_core::{page_count, HistoryQuery, Referral, ReferralFormData, StatusFilter};
use referly_store::{PointsStore, ProfileStore, ReferralStore};
use referly_theme::{DocumentRoot, FileStorage, SystemScheme, ThemeManager, ThemePreference};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared inputs of every command
pub struct Context {
    pub api: Arc<dyn ReferralApi>,
    pub storage_dir: PathBuf,
    pub json: bool,
}

impl Context {
    fn render<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<String> {
        if self.json {
            serde_json::to_string_pretty(value).context("Failed to serialize output")
        } else {
            Ok(text())
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct HistoryArgs {
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<usize>,
    /// Items per page
    #[arg(long)]
    pub limit: Option<usize>,
    /// all, pending, approved or rejected
    #[arg(long)]
    pub status: Option<StatusFilter>,
    /// Case-insensitive name/email search
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct BrowseArgs {
    /// Client-side status filter over the fetched page
    #[arg(long)]
    pub status: Option<StatusFilter>,
    /// Client-side search over the fetched page
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub page: Option<usize>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ThemeCommand {
    /// Show the current theme
    Get,
    /// Persist a theme choice
    Set {
        /// light, dark or system
        theme: ThemePreference,
    },
}

/// Service-side query: `history`
pub async fn history(ctx: &Context, args: HistoryArgs) -> Result<String> {
    let mut query = HistoryQuery::new();
    if let Some(page) = args.page {
        query = query.page(page);
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    if let Some(status) = args.status {
        query = query.status(status);
    }
    if let Some(search) = args.search {
        query = query.search(search);
    }

    let page = ctx
        .api
        .get_my_history(query)
        .await
        .context("Failed to fetch referral history")?;

    ctx.render(&page, || {
        let mut out = format!(
            "Page {} of {} ({} referrals)\n",
            page.page,
            page_count(page.total, page.limit),
            page.total
        );
        out.push_str(&referral_table(&page.data));
        out
    })
}

/// `add`: create through the referral store, which refreshes its list
pub async fn add(ctx: &Context, args: AddArgs) -> Result<String> {
    let mut form = ReferralFormData::new(args.name, args.email);
    if let Some(phone) = args.phone {
        form = form.with_phone(phone);
    }

    let store = ReferralStore::new(Arc::clone(&ctx.api));
    let created = store
        .add_referral(form)
        .await
        .context("Failed to add referral")?;
    let total = store.state().total_items;

    ctx.render(&json!({ "referral": created, "total": total }), || {
        format!(
            "Added referral #{} for {} <{}> ({})\n{} referrals in total\n",
            created.id, created.name, created.email, created.status, total
        )
    })
}

pub async fn points(ctx: &Context) -> Result<String> {
    let store = PointsStore::new(Arc::clone(&ctx.api));
    store.fetch_points().await;
    let state = store.state();
    if let Some(error) = state.error {
        anyhow::bail!(error);
    }

    ctx.render(
        &json!({ "current": state.current_points, "lifetime": state.lifetime_points }),
        || {
            format!(
                "Current points:  {}\nLifetime points: {}\n",
                state.current_points, state.lifetime_points
            )
        },
    )
}

pub async fn profile(ctx: &Context) -> Result<String> {
    let store = ProfileStore::new(Arc::clone(&ctx.api));
    store.fetch_profile().await;
    let state = store.state();
    if let Some(error) = state.error {
        anyhow::bail!(error);
    }
    let profile = state.profile.context("No profile loaded")?;

    ctx.render(&profile, || {
        format!(
            "{} <{}>\nReferral code: {}\n",
            profile.name, profile.email, profile.referral_code
        )
    })
}

/// Store-level view: filters and pages apply to the first fetched page only
pub async fn browse(ctx: &Context, args: BrowseArgs) -> Result<String> {
    let store = ReferralStore::new(Arc::clone(&ctx.api));
    store.fetch_referrals().await;
    if let Some(error) = store.state().error {
        anyhow::bail!(error);
    }

    if let Some(status) = args.status {
        store.set_status_filter(status);
    }
    if let Some(search) = args.search {
        store.set_search_query(search);
    }
    if let Some(page) = args.page {
        store.set_page(page);
    }

    let state = store.state();
    let rows = state.paginated_referrals();
    let total_pages = state.total_pages();

    ctx.render(
        &json!({
            "referrals": rows,
            "page": state.current_page,
            "totalPages": total_pages,
            "totalItems": state.total_items,
        }),
        || {
            let mut out = format!(
                "Page {} of {} ({} loaded, {} on server)\n",
                state.current_page,
                total_pages,
                state.referrals.len(),
                state.total_items
            );
            out.push_str(&referral_table(&rows));
            out
        },
    )
}

pub fn theme(ctx: &Context, command: ThemeCommand) -> Result<String> {
    let storage = FileStorage::new(&ctx.storage_dir);
    let path = storage.path().to_path_buf();
    let manager = ThemeManager::new(Arc::new(storage), SystemScheme::detect(), DocumentRoot::new());

    if let ThemeCommand::Set { theme } = command {
        manager.set_theme(theme);
    }

    let theme = manager.theme();
    let scheme = manager.effective_scheme();
    let following = manager.is_following_system();

    ctx.render(
        &json!({
            "theme": theme,
            "scheme": scheme,
            "followingSystem": following,
            "storage": path,
        }),
        || {
            let mut out = format!("Theme: {theme}\n");
            if following {
                out.push_str("Following the system color scheme\n");
            }
            let _ = writeln!(out, "Stored in {}", path.display());
            out
        },
    )
}

fn referral_table(referrals: &[Referral]) -> String {
    if referrals.is_empty() {
        return "No referrals\n".to_string();
    }

    let mut out = format!(
        "{:<4} {:<20} {:<28} {:<9} {}\n",
        "ID", "NAME", "EMAIL", "STATUS", "DATE"
    );
    for referral in referrals {
        let _ = writeln!(
            out,
            "{:<4} {:<20} {:<28} {:<9} {}",
            referral.id,
            referral.name,
            referral.email,
            referral.status,
            referral.date.format("%Y-%m-%d")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use referly_api::{ApiConfig, MockApi};

    fn context(json: bool) -> (Context, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::seeded(ApiConfig::instant().with_seed(7));
        let ctx = Context {
            api: Arc::new(api),
            storage_dir: dir.path().to_path_buf(),
            json,
        };
        (ctx, dir)
    }

    #[tokio::test]
    async fn history_second_page_text() {
        let (ctx, _dir) = context(false);
        let out = history(
            &ctx,
            HistoryArgs {
                page: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(out.starts_with("Page 2 of 2 (16 referrals)\n"));
        // header plus six rows
        assert_eq!(out.lines().count(), 1 + 1 + 6);
    }

    #[tokio::test]
    async fn history_json_is_a_page() {
        let (ctx, _dir) = context(true);
        let out = history(
            &ctx,
            HistoryArgs {
                status: Some(StatusFilter::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["page"], 1);
        let data = value["data"].as_array().unwrap();
        assert!(data.iter().all(|r| r["status"] == "approved"));
        assert!(value["total"].as_u64().unwrap() >= data.len() as u64);
    }

    #[tokio::test]
    async fn add_duplicate_email_fails() {
        let (ctx, _dir) = context(false);
        let args = AddArgs {
            name: "Dup".to_string(),
            email: "john@example.com".to_string(),
            phone: None,
        };

        let err = add(&ctx, args).await.unwrap_err();
        assert!(format!("{err:#}").contains("already exists"));
    }

    #[tokio::test]
    async fn add_reports_new_total() {
        let (ctx, _dir) = context(false);
        let args = AddArgs {
            name: "Jane Roe".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("555-0100".to_string()),
        };

        let out = add(&ctx, args).await.unwrap();
        assert!(out.contains("Added referral #17 for Jane Roe"));
        assert!(out.contains("17 referrals in total"));
    }

    #[tokio::test]
    async fn browse_filters_fetched_page() {
        let (ctx, _dir) = context(true);
        let out = browse(
            &ctx,
            BrowseArgs {
                search: Some("user 1".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        // only User 10 is on the first fetched page
        assert_eq!(value["referrals"].as_array().unwrap().len(), 1);
        assert_eq!(value["totalPages"], 2);
    }

    #[tokio::test]
    async fn points_and_profile() {
        let (ctx, _dir) = context(false);
        let out = points(&ctx).await.unwrap();
        assert!(out.contains("Current points:"));

        let out = profile(&ctx).await.unwrap();
        assert!(out.contains("Referral code:"));
    }

    #[test]
    fn theme_set_persists_between_runs() {
        let (ctx, dir) = context(true);
        theme(
            &ctx,
            ThemeCommand::Set {
                theme: ThemePreference::Dark,
            },
        )
        .unwrap();

        let out = theme(&ctx, ThemeCommand::Get).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["followingSystem"], false);
        assert!(dir.path().join("preferences.toml").exists());

        theme(
            &ctx,
            ThemeCommand::Set {
                theme: ThemePreference::System,
            },
        )
        .unwrap();
        let out = theme(&ctx, ThemeCommand::Get).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["followingSystem"], true);
    }
}
