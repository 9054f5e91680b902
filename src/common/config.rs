use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sys::hotkey::Modifiers;

pub const CONFIG_FILE_NAME: &str = "dockyard.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub engine: EngineSettings,
    pub keys: KeySettings,
    pub window_buttons: WindowButtonsSettings,
    pub layout: LayoutSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Restore windows evicted from a slot once the evicting window hides.
    pub stack_enabled: bool,
    /// Docked windows at one anchor share a single remembered weight.
    pub unified_weights: bool,
    /// Split windows at the left and right anchors sit side by side.
    pub ultrawide_layout: bool,
    pub check_invariants: bool,
    pub require_owning_thread: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            stack_enabled: true,
            unified_weights: true,
            ultrawide_layout: false,
            check_invariants: false,
            require_owning_thread: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeySettings {
    pub double_press_ms: u64,
    pub disable_double_key_overlay: bool,
    /// Modifiers of the "activate project window" shortcut, e.g. `["alt"]`.
    pub activation_modifiers: Option<Vec<String>>,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            double_press_ms: 300,
            disable_double_key_overlay: false,
            activation_modifiers: None,
        }
    }
}

impl KeySettings {
    pub fn double_press_delay(&self) -> Duration { Duration::from_millis(self.double_press_ms) }

    pub fn shortcut_modifiers(&self) -> Option<Modifiers> {
        let names = self.activation_modifiers.as_ref()?;
        let mut mods = Modifiers::empty();
        for name in names {
            match Modifiers::parse_name(name) {
                Some(m) => mods |= m,
                None => warn!(name, "unknown modifier in keys.activation_modifiers"),
            }
        }
        Some(mods)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowButtonsSettings {
    #[serde(rename = "override")]
    pub layout_override: Option<String>,
    pub probe_timeout_ms: u64,
}

impl Default for WindowButtonsSettings {
    fn default() -> Self { Self { layout_override: None, probe_timeout_ms: 5000 } }
}

impl WindowButtonsSettings {
    pub fn probe_timeout(&self) -> Duration { Duration::from_millis(self.probe_timeout_ms) }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSettings {
    pub path: Option<PathBuf>,
}

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dockyard").join(CONFIG_FILE_NAME))
}

impl Config {
    pub fn parse(text: &str) -> anyhow::Result<Config> {
        toml::from_str(text).context("invalid dockyard configuration")
    }

    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Reads `path`, or the default location when `path` is `None`. A missing
    /// default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        if let Some(path) = path {
            return Self::read(path);
        }
        match config_file() {
            Some(path) if path.exists() => Self::read(&path),
            other => {
                debug!(path = ?other, "no config file, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("serializing dockyard configuration")
    }
}
