//! Document root style classes
//!
//! Stand-in for the root element's class list. The theme manager toggles the
//! `dark` class here; renderers read it to pick their palette.

use rustc_hash::FxHashSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Class added while the dark scheme is in effect
pub const DARK_CLASS: &str = "dark";

/// Shared set of root style classes
#[derive(Clone, Debug, Default)]
pub struct DocumentRoot {
    classes: Arc<RwLock<FxHashSet<String>>>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&self, class: &str) {
        self.toggle_class(class, true);
    }

    pub fn remove_class(&self, class: &str) {
        self.toggle_class(class, false);
    }

    /// Add `class` when `on`, remove it otherwise
    pub fn toggle_class(&self, class: &str, on: bool) {
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        if on {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(class)
    }

    /// Classes in sorted order
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self
            .classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        classes.sort_unstable();
        classes
    }

    pub fn is_dark(&self) -> bool {
        self.has_class(DARK_CLASS)
    }
}
