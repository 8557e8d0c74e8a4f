//! Active screen selector and deep-link navigation.
//!
//! One [`ScreenSelector`] per engine holds the tab the shell is showing.
//! Every way of changing tabs (tab bar taps, deep links, programmatic
//! redirects) goes through [`ScreenSelector::set`], and deep links are then
//! collapsed to [`CANONICAL_PATH`] so the URL never names a different screen
//! than the selector does.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::CANONICAL_PATH;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Home,
    Spin,
    Pets,
    Tasks,
    Friends,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Spin,
        Screen::Pets,
        Screen::Tasks,
        Screen::Friends,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Spin => "spin",
            Screen::Pets => "pets",
            Screen::Tasks => "tasks",
            Screen::Friends => "friends",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Screen {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.tag() == s)
            .ok_or_else(|| EngineError::UnknownScreen(s.to_string()))
    }
}

/// Outcome of a deep link: which screen is now active, and where the shell
/// must point the URL before it paints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub screen: Screen,
    pub canonical_path: &'static str,
    /// True when the requested path differs from the canonical one, so the
    /// shell has to replace the current history entry.
    pub redirected: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSelector {
    active: Screen,
}

impl ScreenSelector {
    pub fn active_tab(&self) -> Screen {
        self.active
    }

    /// Overwrite the active screen. Idempotent.
    pub fn set(&mut self, screen: Screen) {
        if self.active != screen {
            debug!("active screen {} -> {}", self.active, screen);
        }
        self.active = screen;
    }

    /// Overwrite the active screen from its string tag.
    pub fn set_active_tab(&mut self, tag: &str) -> Result<Screen> {
        let screen: Screen = tag.parse()?;
        self.set(screen);
        Ok(screen)
    }

    /// Resolve a deep link, update the selector, and report the canonical
    /// route. The selector is written before the result is returned.
    pub fn navigate(&mut self, path: &str) -> Result<Navigation> {
        let screen = resolve_path(path)?;
        self.set(screen);
        let redirected = path != CANONICAL_PATH;
        if redirected {
            info!("deep link {} opened {}, redirecting to {}", path, screen, CANONICAL_PATH);
        }
        Ok(Navigation {
            screen,
            canonical_path: CANONICAL_PATH,
            redirected,
        })
    }
}

/// Map a URL path (query and trailing slash tolerated) to a screen.
fn resolve_path(path: &str) -> Result<Screen> {
    let bare = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = bare.trim_end_matches('/');
    let lookup = if trimmed.is_empty() { "/" } else { trimmed };

    let mut router = matchit::Router::new();
    router.insert("/", Screen::Home).ok();
    for screen in Screen::ALL {
        router.insert(format!("/{}", screen.tag()), screen).ok();
    }

    match router.at(lookup) {
        Ok(matched) => Ok(*matched.value),
        Err(_) => Err(EngineError::UnknownScreen(
            lookup.trim_start_matches('/').to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_home() {
        assert_eq!(ScreenSelector::default().active_tab(), Screen::Home);
    }

    #[test]
    fn set_active_tab_is_idempotent() {
        let mut sel = ScreenSelector::default();
        assert_eq!(sel.set_active_tab("spin").unwrap(), Screen::Spin);
        assert_eq!(sel.active_tab(), Screen::Spin);
        assert_eq!(sel.set_active_tab("spin").unwrap(), Screen::Spin);
        assert_eq!(sel.active_tab(), Screen::Spin);
    }

    #[test]
    fn unknown_tab_leaves_selection_alone() {
        let mut sel = ScreenSelector::default();
        sel.set(Screen::Pets);
        assert_eq!(
            sel.set_active_tab("casino"),
            Err(EngineError::UnknownScreen("casino".into()))
        );
        assert_eq!(sel.active_tab(), Screen::Pets);
    }

    #[test]
    fn deep_link_collapses_to_root() {
        let mut sel = ScreenSelector::default();
        let nav = sel.navigate("/spin").unwrap();
        assert_eq!(nav.screen, Screen::Spin);
        assert_eq!(nav.canonical_path, "/");
        assert!(nav.redirected);
        assert_eq!(sel.active_tab(), Screen::Spin);
    }

    #[test]
    fn root_does_not_redirect() {
        let mut sel = ScreenSelector::default();
        sel.set(Screen::Tasks);
        let nav = sel.navigate("/").unwrap();
        assert_eq!(nav.screen, Screen::Home);
        assert!(!nav.redirected);
    }

    #[test]
    fn repeated_navigation_keeps_canonical_route() {
        let mut sel = ScreenSelector::default();
        let first = sel.navigate("/spin").unwrap();
        let second = sel.navigate("/spin").unwrap();
        assert_eq!(first.canonical_path, second.canonical_path);
        assert_eq!(sel.active_tab(), Screen::Spin);
    }

    #[test]
    fn trailing_slash_and_query_are_tolerated() {
        let mut sel = ScreenSelector::default();
        assert_eq!(sel.navigate("/friends/").unwrap().screen, Screen::Friends);
        assert_eq!(sel.navigate("/pets?ref=abc").unwrap().screen, Screen::Pets);
        assert_eq!(sel.navigate("/home#top").unwrap().screen, Screen::Home);
    }

    #[test]
    fn unknown_deep_link_is_rejected() {
        let mut sel = ScreenSelector::default();
        sel.set(Screen::Spin);
        assert_eq!(
            sel.navigate("/admin/config"),
            Err(EngineError::UnknownScreen("admin/config".into()))
        );
        assert_eq!(sel.active_tab(), Screen::Spin);
    }

    #[test]
    fn tags_roundtrip_through_from_str() {
        for screen in Screen::ALL {
            assert_eq!(screen.tag().parse::<Screen>().unwrap(), screen);
        }
    }
}
