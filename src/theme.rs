use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Reads the terminal's `COLORFGBG` hint ("fg;bg"); a light background
    /// colour index means a light theme.
    pub fn from_terminal_hint(hint: Option<&str>) -> Option<Self> {
        let bg: u8 = hint?.rsplit(';').next()?.trim().parse().ok()?;
        Some(match bg {
            7 | 15 => Theme::Light,
            _ => Theme::Dark,
        })
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                base: Style::default().fg(Color::White).bg(Color::Black),
                muted: Style::default().fg(Color::DarkGray),
                header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                court: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                winner: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                highlight: Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray).fg(Color::White),
                live: Color::Green,
                loading: Color::Yellow,
                error: Color::Red,
            },
            Theme::Light => Palette {
                base: Style::default().fg(Color::Black).bg(Color::White),
                muted: Style::default().fg(Color::Gray),
                header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                court: Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                winner: Style::default().fg(Color::Rgb(0, 110, 0)).add_modifier(Modifier::BOLD),
                highlight: Style::default().add_modifier(Modifier::BOLD).bg(Color::Gray).fg(Color::Black),
                live: Color::Rgb(0, 110, 0),
                loading: Color::Rgb(160, 110, 0),
                error: Color::Red,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub base: Style,
    pub muted: Style,
    pub header: Style,
    pub court: Style,
    pub winner: Style,
    pub highlight: Style,
    pub live: Color,
    pub loading: Color,
    pub error: Color,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Prefs {
    #[serde(default)]
    theme: Option<Theme>,
}

/// Preferences file holding the theme under the `"theme"` key.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Prefs> {
        if !self.path.exists() {
            return Ok(Prefs::default());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", self.path.display()))
    }

    pub fn stored_theme(&self) -> Option<Theme> {
        match self.read() {
            Ok(prefs) => prefs.theme,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable preferences");
                None
            }
        }
    }

    /// Stored preference, else the terminal hint, else dark.
    pub fn load_theme(&self, terminal_hint: Option<&str>) -> Theme {
        self.stored_theme()
            .or_else(|| Theme::from_terminal_hint(terminal_hint))
            .unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        let mut prefs = self.read().unwrap_or_default();
        prefs.theme = Some(theme);
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(&prefs)?;
        fs::write(&self.path, text).with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_hint() {
        assert_eq!(Theme::from_terminal_hint(Some("0;15")), Some(Theme::Light));
        assert_eq!(Theme::from_terminal_hint(Some("15;0")), Some(Theme::Dark));
        assert_eq!(Theme::from_terminal_hint(Some("12;default;7")), Some(Theme::Light));
        assert_eq!(Theme::from_terminal_hint(Some("garbage")), None);
        assert_eq!(Theme::from_terminal_hint(None), None);
    }

    #[test]
    fn test_theme_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(dir.path().join("nested").join("prefs.json"));

        assert_eq!(store.stored_theme(), None);
        assert_eq!(store.load_theme(Some("0;15")), Theme::Light);
        assert_eq!(store.load_theme(None), Theme::Dark);

        store.save_theme(Theme::Light).unwrap();
        assert_eq!(store.load_theme(Some("15;0")), Theme::Light);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\"theme\": \"light\""), "{}", text);
    }

    #[test]
    fn test_corrupt_prefs_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();

        let store = PrefsStore::new(&path);
        assert_eq!(store.load_theme(Some("0;7")), Theme::Light);
        store.save_theme(Theme::Dark).unwrap();
        assert_eq!(store.stored_theme(), Some(Theme::Dark));
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
