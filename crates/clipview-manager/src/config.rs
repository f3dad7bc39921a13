//! Settings file loading. Everything is optional; missing keys fall back
//! to the built-in defaults, an unreadable or malformed file is fatal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clipview_core::Prefs;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub manager: Option<ManagerSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ManagerSettings {
    /// Records fetched per browse page (default 10).
    pub page_size: Option<usize>,
    /// Maximum results served per search (default 20).
    pub search_limit: Option<usize>,
    /// Exit when the view loses focus (default false).
    pub hide_on_inactive: Option<bool>,
    /// Hand focus back to the previous process on exit (default true).
    pub return_focus: Option<bool>,
}

impl Settings {
    /// Merge the file's values onto the defaults.
    pub fn prefs(&self) -> Prefs {
        let mut prefs = Prefs::default();
        if let Some(m) = &self.manager {
            if let Some(v) = m.page_size {
                prefs.page_size = v;
            }
            if let Some(v) = m.search_limit {
                prefs.search_limit = v;
            }
            if let Some(v) = m.hide_on_inactive {
                prefs.hide_on_inactive = v;
            }
            if let Some(v) = m.return_focus {
                prefs.return_focus = v;
            }
        }
        prefs
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(dirs) = directories::BaseDirs::new() {
        dirs.config_dir().join("clipview")
    } else {
        PathBuf::from("./.config/clipview")
    }
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            toml::from_str(&text).with_context(|| format!("invalid settings file {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => {
            Err(e).with_context(|| format!("cannot read settings file {}", path.display()))
        }
    }
}
