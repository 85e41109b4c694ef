//! Observable system color scheme
//!
//! [`SystemScheme`] plays the role of a `prefers-color-scheme` media query: it
//! reports the current OS preference and notifies listeners when it changes.
//! The platform layer (or the polling watcher behind the `watcher` feature)
//! pushes updates with [`SystemScheme::set`].

use referly_core::{StateCell, Subscription};

use crate::scheme::{detect_system_color_scheme, ColorScheme};

/// Current OS color scheme plus change notifications
///
/// Clones share the same underlying value.
#[derive(Clone, Debug)]
pub struct SystemScheme {
    current: StateCell<ColorScheme>,
}

impl Default for SystemScheme {
    fn default() -> Self {
        Self::new(ColorScheme::Light)
    }
}

impl SystemScheme {
    pub fn new(initial: ColorScheme) -> Self {
        Self {
            current: StateCell::new(initial),
        }
    }

    /// Start from the scheme detected in the environment
    pub fn detect() -> Self {
        Self::new(detect_system_color_scheme())
    }

    pub fn current(&self) -> ColorScheme {
        self.current.get()
    }

    pub fn prefers_dark(&self) -> bool {
        self.current().is_dark()
    }

    /// Report a new OS preference; listeners only hear about actual changes
    pub fn set(&self, scheme: ColorScheme) -> bool {
        let changed = self.current.set_if_changed(scheme);
        if changed {
            tracing::debug!(?scheme, "system color scheme changed");
        }
        changed
    }

    /// Listen for changes until the returned subscription drops
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(ColorScheme) + Send + Sync + 'static,
    {
        self.current.subscribe(move |scheme| listener(*scheme))
    }

    pub fn listener_count(&self) -> usize {
        self.current.subscriber_count()
    }
}
