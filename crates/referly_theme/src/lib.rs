//! Referly Theme Preference
//!
//! Light/dark theming driven by a persisted user choice and the system
//! color scheme.
//!
//! # Overview
//!
//! - **Preference**: `light`, `dark` or `system`, persisted under one key
//! - **System following**: with nothing persisted, OS scheme changes are
//!   applied as they happen
//! - **Document root**: the effective scheme is mirrored as the `dark` class
//!
//! # Quick Start
//!
//! ```rust
//! use referly_theme::{
//!     ColorScheme, DocumentRoot, MemoryStorage, SystemScheme, ThemeManager, ThemePreference,
//! };
//! use std::sync::Arc;
//!
//! let system = SystemScheme::new(ColorScheme::Light);
//! let manager = ThemeManager::new(
//!     Arc::new(MemoryStorage::new()),
//!     system.clone(),
//!     DocumentRoot::new(),
//! );
//!
//! // Nothing persisted: the OS preference is followed
//! system.set(ColorScheme::Dark);
//! assert!(manager.is_dark());
//!
//! // An explicit choice pins the scheme
//! manager.set_theme(ThemePreference::Light);
//! system.set(ColorScheme::Light);
//! system.set(ColorScheme::Dark);
//! assert!(!manager.is_dark());
//! ```
//!
//! # Storage
//!
//! - [`MemoryStorage`]: process lifetime
//! - [`FileStorage`]: `<dir>/preferences.toml`

pub mod document;
pub mod manager;
pub mod scheme;
pub mod storage;
pub mod system;

#[cfg(feature = "watcher")]
pub mod watcher;

// Re-export commonly used types
pub use document::{DocumentRoot, DARK_CLASS};
pub use manager::{ThemeManager, THEME_KEY};
pub use scheme::{detect_system_color_scheme, ColorScheme, ThemePreference, SCHEME_ENV_VAR};
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage, StorageError};
pub use system::SystemScheme;

#[cfg(feature = "watcher")]
pub use watcher::{SystemSchemeWatcher, WatcherConfig};
