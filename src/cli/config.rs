//! `deck.toml`: where a deck keeps its style, assets and output settings.

use crate::data::source::CsvSourceConfig;
use crate::data::DeckStyle;
use crate::error::{Error, Result};
use crate::render::RenderOptions;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "deck.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub deck: DeckConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub source: DataSourceConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckConfig {
    pub name: Option<String>,
    #[serde(flatten)]
    pub style: DeckStyle,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetsConfig {
    /// Root for backgrounds and relative photo paths.
    pub path: Option<PathBuf>,
    /// Folder with the deck fonts' `.ttf` files.
    pub fonts: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pattern: default_pattern() }
    }
}

fn default_pattern() -> String {
    String::from("{index}-{name}-{side}")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataSourceConfig {
    #[serde(default)]
    pub csv: CsvSourceConfig,
}

impl Config {
    /// Opens `~/.kindred/<name>/deck.toml`, or `./deck.toml` without a name.
    /// A missing `./deck.toml` means every setting takes its default.
    pub fn find(name: Option<&str>) -> Result<(PathBuf, Self)> {
        match name {
            Some(name) => {
                let mut path = Self::config_folder()?;
                path.push(name);
                path.push(CONFIG_FILE);
                Self::open(&path)
            }
            None => {
                let path = PathBuf::from(".").join(CONFIG_FILE);
                if path.exists() {
                    Self::open(&path)
                } else {
                    tracing::info!("no {CONFIG_FILE} here, using defaults");
                    Ok((PathBuf::from("."), Self::default()))
                }
            }
        }
    }

    pub fn open(path: &impl AsRef<Path>) -> Result<(PathBuf, Self)> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::config_open(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::config_deser(path, e))?;
        let folder = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        Ok((folder, config))
    }

    #[cfg(target_os = "windows")]
    fn config_folder() -> Result<PathBuf> {
        let home = std::env::var("APPDATA").map_err(|_| Error::no_env_variable("APPDATA"))?;
        let mut home = PathBuf::from(home);
        home.push("kindred");
        Ok(home)
    }

    #[cfg(not(target_os = "windows"))]
    fn config_folder() -> Result<PathBuf> {
        let home = std::env::var("HOME").map_err(|_| Error::no_env_variable("HOME"))?;
        let mut home = PathBuf::from(home);
        home.push(".kindred");
        Ok(home)
    }

    pub fn assets_folder(&self, folder: &Path) -> PathBuf {
        folder.join(self.assets.path.as_deref().unwrap_or(Path::new("assets")))
    }

    pub fn fonts_folder(&self, folder: &Path) -> PathBuf {
        folder.join(self.assets.fonts.as_deref().unwrap_or(Path::new("fonts")))
    }
}
