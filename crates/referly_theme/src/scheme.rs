//! Theme preference and color scheme types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable that forces the detected system scheme
pub const SCHEME_ENV_VAR: &str = "REFERLY_COLOR_SCHEME";

/// Effective light/dark presentation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn is_dark(&self) -> bool {
        matches!(self, ColorScheme::Dark)
    }

    pub fn toggle(&self) -> Self {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Light,
        }
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }
}

/// What the user picked; `System` defers to the OS
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// The scheme an explicit choice pins, or `None` for `System`
    pub fn scheme(&self) -> Option<ColorScheme> {
        match self {
            ThemePreference::Light => Some(ColorScheme::Light),
            ThemePreference::Dark => Some(ColorScheme::Dark),
            ThemePreference::System => None,
        }
    }
}

impl From<ColorScheme> for ThemePreference {
    fn from(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => ThemePreference::Light,
            ColorScheme::Dark => ThemePreference::Dark,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(format!("unknown theme: {other:?}")),
        }
    }
}

/// Detect the OS color scheme from the environment.
///
/// `REFERLY_COLOR_SCHEME=dark|light` wins; otherwise a `GTK_THEME` ending in
/// `:dark` means dark. Anything else is light.
pub fn detect_system_color_scheme() -> ColorScheme {
    let forced = std::env::var(SCHEME_ENV_VAR).ok();
    let gtk = std::env::var("GTK_THEME").ok();
    scheme_from_env(forced.as_deref(), gtk.as_deref())
}

pub(crate) fn scheme_from_env(forced: Option<&str>, gtk_theme: Option<&str>) -> ColorScheme {
    if let Some(value) = forced {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => return ColorScheme::Dark,
            "light" => return ColorScheme::Light,
            other => tracing::warn!(var = SCHEME_ENV_VAR, value = other, "ignoring unknown color scheme override"),
        }
    }

    let gtk_dark = gtk_theme
        .map(|theme| theme.to_ascii_lowercase().ends_with(":dark"))
        .unwrap_or(false);
    ColorScheme::from_dark(gtk_dark)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_value_wins() {
        assert_eq!(scheme_from_env(Some("dark"), None), ColorScheme::Dark);
        assert_eq!(
            scheme_from_env(Some("LIGHT"), Some("Adwaita:dark")),
            ColorScheme::Light
        );
    }

    #[test]
    fn gtk_dark_variant_is_detected() {
        assert_eq!(scheme_from_env(None, Some("Adwaita:dark")), ColorScheme::Dark);
        assert_eq!(scheme_from_env(None, Some("Adwaita")), ColorScheme::Light);
        assert_eq!(scheme_from_env(Some("sepia"), Some("Yaru:dark")), ColorScheme::Dark);
        assert_eq!(scheme_from_env(None, None), ColorScheme::Light);
    }

    #[test]
    fn preference_parsing() {
        assert_eq!("Dark".parse(), Ok(ThemePreference::Dark));
        assert_eq!(" system ".parse(), Ok(ThemePreference::System));
        assert!("blue".parse::<ThemePreference>().is_err());
    }

    #[test]
    fn toggle_round_trips() {
        assert_eq!(ColorScheme::Light.toggle().toggle(), ColorScheme::Light);
        assert!(ColorScheme::Light.toggle().is_dark());
    }
}
