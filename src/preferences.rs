//! Cosmetic settings, stored under their own keys and never touched by
//! program transitions.

use crate::errors::AppError;
use crate::models::PreferencesView;
use crate::storage::LocalStore;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(AppError::bad_request(format!(
                "theme must be 'dark' or 'light', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gradient {
    #[default]
    Sunrise,
    Focus,
    Energize,
}

impl Gradient {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunrise => "sunrise",
            Self::Focus => "focus",
            Self::Energize => "energize",
        }
    }

    /// Start and end colours of the page background.
    pub fn colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Sunrise => ("#fb923c", "#60a5fa"),
            Self::Focus => ("#6366f1", "#a855f7"),
            Self::Energize => ("#f87171", "#facc15"),
        }
    }
}

impl FromStr for Gradient {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sunrise" => Ok(Self::Sunrise),
            "focus" => Ok(Self::Focus),
            "energize" => Ok(Self::Energize),
            other => Err(AppError::bad_request(format!(
                "gradient must be 'sunrise', 'focus' or 'energize', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    Theme,
    Gradient,
}

impl PreferenceKey {
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Theme => "rise-theme",
            Self::Gradient => "rise-gradient",
        }
    }
}

impl FromStr for PreferenceKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "theme" => Ok(Self::Theme),
            "gradient" => Ok(Self::Gradient),
            other => Err(AppError::bad_request(format!(
                "unknown preference '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub theme: Theme,
    pub gradient: Gradient,
}

impl Preferences {
    /// Reads both keys; anything unrecognised falls back to the default.
    pub fn load(store: &LocalStore) -> Self {
        Self {
            theme: read(store, PreferenceKey::Theme),
            gradient: read(store, PreferenceKey::Gradient),
        }
    }

    /// Signal for the page to switch its dark style class.
    pub fn dark_mode(self) -> bool {
        self.theme == Theme::Dark
    }

    pub fn view(self) -> PreferencesView {
        let (from, to) = self.gradient.colors();
        PreferencesView {
            theme: self.theme.as_str().to_string(),
            gradient: self.gradient.as_str().to_string(),
            gradient_from: from.to_string(),
            gradient_to: to.to_string(),
        }
    }
}

fn read<T: FromStr + Default>(store: &LocalStore, key: PreferenceKey) -> T {
    store
        .get(key.storage_key())
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

pub fn get_preference(store: &LocalStore, key: PreferenceKey) -> &'static str {
    let preferences = Preferences::load(store);
    match key {
        PreferenceKey::Theme => preferences.theme.as_str(),
        PreferenceKey::Gradient => preferences.gradient.as_str(),
    }
}

/// Validates `value` for `key` and writes it straight away. A failed write is
/// logged; the new value still applies for the rest of the session.
pub async fn set_preference(
    store: &mut LocalStore,
    key: PreferenceKey,
    value: &str,
) -> Result<Preferences, AppError> {
    let value = match key {
        PreferenceKey::Theme => value.parse::<Theme>()?.as_str(),
        PreferenceKey::Gradient => value.parse::<Gradient>()?.as_str(),
    };
    if let Err(err) = store.set(key.storage_key(), value.to_string()).await {
        error!("failed to save {}: {err}", key.storage_key());
    }
    Ok(Preferences::load(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_store() {
        let store = LocalStore::in_memory();
        assert_eq!(get_preference(&store, PreferenceKey::Theme), "dark");
        assert_eq!(get_preference(&store, PreferenceKey::Gradient), "sunrise");
        assert!(Preferences::load(&store).dark_mode());
    }

    #[tokio::test]
    async fn set_then_get_returns_new_value() {
        let mut store = LocalStore::in_memory();
        let preferences = set_preference(&mut store, PreferenceKey::Theme, "light")
            .await
            .unwrap();
        assert_eq!(get_preference(&store, PreferenceKey::Theme), "light");
        assert!(!preferences.dark_mode());

        set_preference(&mut store, PreferenceKey::Gradient, "energize")
            .await
            .unwrap();
        assert_eq!(get_preference(&store, PreferenceKey::Gradient), "energize");
        assert_eq!(get_preference(&store, PreferenceKey::Theme), "light");
    }

    #[tokio::test]
    async fn unrecognised_stored_values_fall_back() {
        let mut store = LocalStore::in_memory();
        store.set("rise-theme", "sepia".to_string()).await.unwrap();
        store.set("rise-gradient", "".to_string()).await.unwrap();
        assert_eq!(get_preference(&store, PreferenceKey::Theme), "dark");
        assert_eq!(get_preference(&store, PreferenceKey::Gradient), "sunrise");
    }

    #[tokio::test]
    async fn invalid_value_is_rejected_and_not_stored() {
        let mut store = LocalStore::in_memory();
        let err = set_preference(&mut store, PreferenceKey::Gradient, "neon")
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(store.get("rise-gradient"), None);
    }

    #[tokio::test]
    async fn failed_write_still_applies_the_preference() {
        let mut path = std::env::temp_dir();
        path.push(format!("rise_reset_no_such_dir_{}", std::process::id()));
        path.push("store.json");
        let mut store = LocalStore::open(&path).await;

        let preferences = set_preference(&mut store, PreferenceKey::Theme, "light")
            .await
            .unwrap();
        assert_eq!(preferences.theme, Theme::Light);
        assert_eq!(Preferences::load(&store).theme, Theme::Light);
        assert_eq!(get_preference(&store, PreferenceKey::Theme), "light");
        assert!(!path.exists());
    }

    #[test]
    fn gradient_colors_follow_choice() {
        let view = Preferences {
            theme: Theme::Light,
            gradient: Gradient::Focus,
        }
        .view();
        assert_eq!(view.gradient, "focus");
        assert_eq!(view.gradient_from, "#6366f1");
        assert_eq!(view.theme, "light");
    }
}
