//! Title-bar button placement reported by the desktop environment.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::sys::process::ProcessProbe;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum WindowButton {
    Minimize,
    Maximize,
    Close,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowButtonsState {
    pub right_position: bool,
    pub buttons: Vec<WindowButton>,
}

/// Parses a `left:right` layout such as `appmenu:minimize,maximize,close`.
/// Unknown names are ignored, a duplicated button rejects the whole layout.
pub fn parse_button_layout(s: &str) -> Option<WindowButtonsState> {
    let (left, right) = s.split_once(':')?;
    if right.contains(':') {
        return None;
    }

    let buttons_of = |side: &str| -> Vec<WindowButton> {
        side.split(',').filter_map(|name| name.trim().parse().ok()).collect()
    };
    let left = buttons_of(left);
    let right = buttons_of(right);

    let buttons: Vec<WindowButton> = left.iter().chain(right.iter()).copied().collect();
    for button in &buttons {
        if buttons.iter().filter(|b| *b == button).count() != 1 {
            return None;
        }
    }

    Some(WindowButtonsState {
        right_position: left.is_empty() || !right.is_empty(),
        buttons,
    })
}

const GSETTINGS_ARGS: [&str; 3] = ["get", "org.gnome.desktop.wm.preferences", "button-layout"];

/// Asks GNOME settings for the button layout. Any failure means "unknown".
pub async fn query_os_button_layout(probe: &ProcessProbe) -> Option<String> {
    let out = probe.run("gsettings", &GSETTINGS_ARGS).await.success()?;
    let value = out.trim().trim_matches('\'').trim_matches('"').to_string();
    if value.is_empty() { None } else { Some(value) }
}

/// Holds the computed button configuration. The configured override wins
/// over the OS value; a cached state is only used until something has been
/// computed.
#[derive(Debug)]
pub struct WindowButtonsConfiguration {
    tx: watch::Sender<Option<WindowButtonsState>>,
}

impl Default for WindowButtonsConfiguration {
    fn default() -> Self { Self::new() }
}

impl WindowButtonsConfiguration {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<WindowButtonsState>> { self.tx.subscribe() }

    pub fn state(&self) -> Option<WindowButtonsState> { self.tx.borrow().clone() }

    pub fn load_cached(&self, cached: WindowButtonsState) {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(cached);
            true
        });
    }

    pub async fn refresh(&self, override_value: Option<&str>, probe: &ProcessProbe) {
        let state = match override_value.filter(|v| !v.is_empty()) {
            Some(value) => {
                let parsed = parse_button_layout(value);
                if parsed.is_none() {
                    warn!(value, "failed to parse configured window buttons layout");
                }
                parsed
            }
            None => None,
        };

        let state = match state {
            Some(state) => Some(state),
            None => match query_os_button_layout(probe).await {
                Some(value) => {
                    let parsed = parse_button_layout(&value);
                    if parsed.is_none() {
                        warn!(value, "failed to parse OS window buttons layout");
                    }
                    parsed
                }
                None => None,
            },
        };

        debug!(?state, "window buttons configuration computed");
        if state.is_some() {
            self.tx.send_replace(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gnome_default() {
        let state = parse_button_layout("appmenu:minimize,maximize,close").unwrap();
        assert!(state.right_position);
        assert_eq!(state.buttons, vec![
            WindowButton::Minimize,
            WindowButton::Maximize,
            WindowButton::Close
        ]);
    }

    #[test]
    fn left_side_buttons() {
        let state = parse_button_layout("close,minimize,maximize:").unwrap();
        assert!(!state.right_position);
        assert_eq!(state.buttons.len(), 3);
    }

    #[test]
    fn rejects_duplicates_and_malformed() {
        assert_eq!(parse_button_layout("close:close"), None);
        assert_eq!(parse_button_layout("close,minimize"), None);
        assert_eq!(parse_button_layout("a:b:c"), None);
    }

    #[tokio::test]
    async fn override_wins_and_cache_does_not_replace_it() {
        let config = WindowButtonsConfiguration::new();
        config.refresh(Some("close:"), &ProcessProbe::default()).await;
        let computed = config.state().unwrap();
        assert_eq!(computed.buttons, vec![WindowButton::Close]);

        config.load_cached(WindowButtonsState { right_position: true, buttons: vec![] });
        assert_eq!(config.state(), Some(computed));
    }

    #[test]
    fn cache_applies_before_computation() {
        let config = WindowButtonsConfiguration::new();
        let cached = WindowButtonsState { right_position: false, buttons: vec![WindowButton::Close] };
        config.load_cached(cached.clone());
        assert_eq!(config.state(), Some(cached));
    }
}
