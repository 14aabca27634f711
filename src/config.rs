// Application configuration: YAML file merged with CLI overrides

use crate::keymap::{KeyBinding, Keymap};
use crate::theme::{Theme, ThemeSpec};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_WINDOW_SIZE: usize = 30;

const APP_NAME: &str = "todoq";

/// Theme entry in the config file: a preset name or a full theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeConfig {
    Preset { preset: String },
    Custom(ThemeSpec),
}

/// Contents of `config.yaml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub data_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub theme: Option<ThemeConfig>,
    #[serde(default)]
    pub keymap: BTreeMap<String, KeyBinding>,
    pub list_window_size: Option<usize>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub export_dir: PathBuf,
    pub theme: Theme,
    pub keymap: Keymap,
    pub list_window_size: usize,
}

/// Well-known locations under the application directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub app_dir: PathBuf,
}

impl AppPaths {
    /// `$XDG_CONFIG_HOME/todoq`, or `~/.config/todoq`
    pub fn discover() -> Result<Self> {
        let base = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            Some(xdg) => PathBuf::from(xdg),
            None => dirs::home_dir()
                .ok_or_else(|| eyre!("Could not determine home directory"))?
                .join(".config"),
        };
        Ok(Self::at(base.join(APP_NAME)))
    }

    pub fn at(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.app_dir.join("config.yaml")
    }

    pub fn default_data(&self) -> PathBuf {
        self.app_dir.join("data.json")
    }

    pub fn default_export_dir(&self) -> PathBuf {
        self.app_dir.join("export")
    }

    pub fn log_file(&self) -> PathBuf {
        self.app_dir.join("todoq.log")
    }
}

impl Config {
    /// Read `config.yaml` (if present) and apply CLI overrides
    pub fn load(paths: &AppPaths, cli: &CliOverrides) -> Result<Self> {
        fs::create_dir_all(&paths.app_dir)
            .with_context(|| format!("Failed to create {}", paths.app_dir.display()))?;

        let file = read_file_config(&paths.config_file())?;
        let config = Self::resolve(paths, file, cli);
        fs::create_dir_all(&config.export_dir)
            .with_context(|| format!("Failed to create {}", config.export_dir.display()))?;

        info!(
            data = ?config.data_path,
            export = ?config.export_dir,
            theme = %config.theme.name,
            window = config.list_window_size,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Merge CLI > file > defaults without touching the filesystem
    pub fn resolve(paths: &AppPaths, file: FileConfig, cli: &CliOverrides) -> Self {
        let theme_spec = match file.theme {
            Some(ThemeConfig::Preset { preset }) if preset == "light" => ThemeSpec::light(),
            Some(ThemeConfig::Custom(spec)) => spec,
            _ => ThemeSpec::dark(),
        };

        Self {
            data_path: cli
                .data_path
                .clone()
                .or(file.data_path)
                .unwrap_or_else(|| paths.default_data()),
            export_dir: cli
                .export_dir
                .clone()
                .or(file.export_dir)
                .unwrap_or_else(|| paths.default_export_dir()),
            theme: Theme::from_spec(&theme_spec),
            keymap: Keymap::with_overrides(&file.keymap),
            list_window_size: file.list_window_size.unwrap_or(DEFAULT_WINDOW_SIZE).max(1),
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        debug!(file = ?path, "No config file, using defaults");
        return Ok(FileConfig::default());
    }

    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a sample `config.yaml` unless one already exists
///
/// Returns the path when a file was written.
pub fn write_sample_config(paths: &AppPaths) -> Result<Option<PathBuf>> {
    let path = paths.config_file();
    if path.exists() {
        return Ok(None);
    }

    let mut keymap = BTreeMap::new();
    keymap.insert(
        "down".to_string(),
        KeyBinding::Many(vec!["j".to_string(), "downArrow".to_string()]),
    );
    keymap.insert(
        "up".to_string(),
        KeyBinding::Many(vec!["k".to_string(), "upArrow".to_string()]),
    );

    let sample = FileConfig {
        data_path: Some(paths.default_data()),
        export_dir: Some(paths.default_export_dir()),
        theme: Some(ThemeConfig::Preset {
            preset: "dark".to_string(),
        }),
        keymap,
        list_window_size: Some(DEFAULT_WINDOW_SIZE),
    };

    fs::create_dir_all(&paths.app_dir)?;
    let yaml = serde_yaml::to_string(&sample).context("Failed to serialize sample config")?;
    fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(file = ?path, "Wrote sample config");
    Ok(Some(path))
}
