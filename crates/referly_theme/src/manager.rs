//! Theme preference manager
//!
//! ThemeManager owns the user's light/dark/system choice:
//! - An explicit choice is persisted under [`THEME_KEY`] and pins the scheme
//! - With nothing persisted the manager follows [`SystemScheme`] changes
//! - The effective scheme is mirrored onto the document root as [`DARK_CLASS`]
//!
//! The explicit choice lives in memory; storage is its durable copy, read once
//! at startup. A failed write therefore never hands control back to the OS
//! scheme. The system listener is held only while no explicit choice is in
//! effect, and is released when the manager is dropped.

use referly_core::{StateCell, Subscription};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::document::{DocumentRoot, DARK_CLASS};
use crate::scheme::{ColorScheme, ThemePreference};
use crate::storage::PreferenceStorage;
use crate::system::SystemScheme;

/// Storage key of the persisted theme flag
pub const THEME_KEY: &str = "theme";

struct ThemeInner {
    storage: Arc<dyn PreferenceStorage>,
    system: SystemScheme,
    root: DocumentRoot,

    /// Theme reported to the UI
    theme: StateCell<ThemePreference>,

    /// Explicit `Light`/`Dark` choice; `None` while following the system
    explicit: Mutex<Option<ThemePreference>>,

    /// Live while following the system scheme
    system_watch: Mutex<Option<Subscription>>,
}

impl ThemeInner {
    fn system_watch(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.system_watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn explicit(&self) -> MutexGuard<'_, Option<ThemePreference>> {
        self.explicit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Explicit choice from storage; `system`, garbage and read errors count as none
    fn persisted(&self) -> Option<ThemePreference> {
        let raw = match self.storage.get(THEME_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(%err, "failed to read theme preference");
                return None;
            }
        };

        match raw.parse::<ThemePreference>() {
            Ok(ThemePreference::System) => None,
            Ok(pref) => Some(pref),
            Err(err) => {
                warn!(%err, "ignoring stored theme");
                None
            }
        }
    }

    /// Durable copy of the explicit choice
    fn persist(&self, choice: Option<ThemePreference>) {
        let result = match choice {
            Some(theme) => self.storage.set(THEME_KEY, theme.as_str()),
            None => self.storage.remove(THEME_KEY),
        };
        if let Err(err) = result {
            warn!(%err, ?choice, "failed to persist theme preference");
        }
    }

    fn apply(&self, scheme: ColorScheme) {
        self.root.toggle_class(DARK_CLASS, scheme.is_dark());
    }

    /// System scheme changed while following it
    fn follow_system(&self, scheme: ColorScheme) {
        {
            let explicit = self.explicit();
            if explicit.is_some() {
                return;
            }
            // Applied under the lock so a concurrent set_theme cannot be undone
            self.apply(scheme);
        }
        debug!(?scheme, "following system scheme");
        self.theme.set(ThemePreference::from(scheme));
    }
}

/// Owner of the theme preference for one document
pub struct ThemeManager {
    inner: Arc<ThemeInner>,
}

impl ThemeManager {
    /// Resolve the initial theme and apply it to `root`.
    ///
    /// A persisted `dark`, or no persisted value while the system prefers
    /// dark, starts dark; everything else starts light.
    pub fn new(
        storage: Arc<dyn PreferenceStorage>,
        system: SystemScheme,
        root: DocumentRoot,
    ) -> Self {
        let manager = Self {
            inner: Arc::new(ThemeInner {
                storage,
                system,
                root,
                theme: StateCell::new(ThemePreference::Light),
                explicit: Mutex::new(None),
                system_watch: Mutex::new(None),
            }),
        };

        let saved = manager.inner.persisted();
        let prefers_dark = manager.inner.system.prefers_dark();
        let scheme = match saved {
            Some(ThemePreference::Dark) => ColorScheme::Dark,
            None if prefers_dark => ColorScheme::Dark,
            _ => ColorScheme::Light,
        };
        debug!(?saved, prefers_dark, ?scheme, "initial theme resolved");
        *manager.inner.explicit() = saved;
        manager.inner.apply(scheme);
        manager.inner.theme.set(ThemePreference::from(scheme));
        manager.sync_system_watch();

        manager
    }

    // ========== Theme ==========

    /// Theme as last reported; `System` only right after `set_theme(System)`
    pub fn theme(&self) -> ThemePreference {
        self.inner.theme.get()
    }

    /// Apply and persist a choice; `System` clears the persisted value.
    ///
    /// The choice takes effect even when it cannot be persisted.
    pub fn set_theme(&self, theme: ThemePreference) {
        debug!(?theme, "set_theme");
        let choice = theme.scheme().map(|_| theme);
        {
            let mut explicit = self.inner.explicit();
            *explicit = choice;
            let scheme = theme
                .scheme()
                .unwrap_or_else(|| self.inner.system.current());
            self.inner.apply(scheme);
        }
        self.inner.theme.set(theme);
        self.inner.persist(choice);

        self.sync_system_watch();
    }

    /// Explicit choice if any, otherwise the system scheme
    pub fn system_theme(&self) -> ThemePreference {
        let explicit = *self.inner.explicit();
        explicit.unwrap_or_else(|| ThemePreference::from(self.inner.system.current()))
    }

    /// Scheme currently applied to the document root
    pub fn effective_scheme(&self) -> ColorScheme {
        ColorScheme::from_dark(self.inner.root.is_dark())
    }

    pub fn is_dark(&self) -> bool {
        self.inner.root.is_dark()
    }

    /// Whether system scheme changes currently reach the document
    pub fn is_following_system(&self) -> bool {
        self.inner.system_watch().is_some()
    }

    /// Listen for reported theme changes
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ThemePreference) + Send + Sync + 'static,
    {
        self.inner.theme.subscribe(listener)
    }

    pub fn root(&self) -> &DocumentRoot {
        &self.inner.root
    }

    pub fn system(&self) -> &SystemScheme {
        &self.inner.system
    }

    // ========== System Following ==========

    /// Hold a system listener exactly while no explicit choice is in effect
    fn sync_system_watch(&self) {
        let following = self.inner.explicit().is_none();
        let mut watch = self.inner.system_watch();

        match (following, watch.is_some()) {
            (true, false) => {
                let weak = Arc::downgrade(&self.inner);
                *watch = Some(self.inner.system.subscribe(move |scheme| {
                    if let Some(inner) = weak.upgrade() {
                        inner.follow_system(scheme);
                    }
                }));
                debug!("system scheme listener attached");
            }
            (false, true) => {
                *watch = None;
                debug!("system scheme listener released");
            }
            _ => {}
        }
    }
}

impl Drop for ThemeManager {
    fn drop(&mut self) {
        if self.inner.system_watch().take().is_some() {
            debug!("system scheme listener released on drop");
        }
    }
}
