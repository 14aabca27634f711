// Key bindings: action names to key names

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Something the user can ask for in the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Up,
    Down,
    Top,
    Bottom,
    OpenModal,
    ToggleDone,
    Delete,
    Add,
    Quit,
    ExportMd,
    ExportCsv,
}

impl Action {
    /// Checked in this order, so an earlier action wins a shared key
    pub const ALL: [Action; 11] = [
        Action::Quit,
        Action::Down,
        Action::Up,
        Action::Top,
        Action::Bottom,
        Action::ToggleDone,
        Action::Delete,
        Action::Add,
        Action::OpenModal,
        Action::ExportMd,
        Action::ExportCsv,
    ];

    /// Name used in the config file
    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Top => "top",
            Action::Bottom => "bottom",
            Action::OpenModal => "openModal",
            Action::ToggleDone => "toggleDone",
            Action::Delete => "delete",
            Action::Add => "add",
            Action::Quit => "quit",
            Action::ExportMd => "exportMd",
            Action::ExportCsv => "exportCsv",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    fn default_keys(self) -> &'static [&'static str] {
        match self {
            Action::Up => &["k", "upArrow"],
            Action::Down => &["j", "downArrow"],
            Action::Top => &["g"],
            Action::Bottom => &["G"],
            Action::OpenModal => &["enter", "o"],
            Action::ToggleDone => &["x"],
            Action::Delete => &["d", "D"],
            Action::Add => &["a"],
            Action::Quit => &["q"],
            Action::ExportMd => &["m"],
            Action::ExportCsv => &["c"],
        }
    }
}

/// One key name or a list of them, as written in YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyBinding {
    One(String),
    Many(Vec<String>),
}

impl KeyBinding {
    pub fn keys(&self) -> Vec<String> {
        match self {
            KeyBinding::One(k) => vec![k.clone()],
            KeyBinding::Many(ks) => ks.clone(),
        }
    }
}

/// Resolved bindings for every action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: BTreeMap<Action, Vec<String>>,
}

impl Default for Keymap {
    fn default() -> Self {
        let bindings = Action::ALL
            .into_iter()
            .map(|a| (a, a.default_keys().iter().map(|k| k.to_string()).collect()))
            .collect();
        Self { bindings }
    }
}

impl Keymap {
    /// Defaults with user overrides; an override replaces that action's keys
    pub fn with_overrides(overrides: &BTreeMap<String, KeyBinding>) -> Self {
        let mut keymap = Self::default();
        for (name, binding) in overrides {
            match Action::from_name(name) {
                Some(action) => {
                    keymap.bindings.insert(action, binding.keys());
                }
                None => warn!(action = %name, "Unknown action in keymap, ignoring"),
            }
        }
        keymap
    }

    pub fn keys(&self, action: Action) -> &[String] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First action bound to `key`
    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|a| self.keys(*a).iter().any(|name| key_matches(name, key)))
    }

    /// Short hint such as `j/k:move` for the help line
    pub fn hint(&self, action: Action) -> String {
        self.keys(action).first().cloned().unwrap_or_default()
    }
}

/// Does the key name from the config describe `key`?
pub fn key_matches(name: &str, key: &KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match name {
        "upArrow" => key.code == KeyCode::Up,
        "downArrow" => key.code == KeyCode::Down,
        "enter" | "return" => key.code == KeyCode::Enter,
        "escape" | "esc" => key.code == KeyCode::Esc,
        "tab" => key.code == KeyCode::Tab,
        _ => {
            if let Some(rest) = name.strip_prefix("ctrl+") {
                let mut chars = rest.chars();
                return match (chars.next(), chars.next()) {
                    (Some(c), None) => ctrl && key.code == KeyCode::Char(c),
                    _ => false,
                };
            }
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => !ctrl && key.code == KeyCode::Char(c),
                _ => false,
            }
        }
    }
}
