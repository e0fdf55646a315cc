use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "ALBUMIST_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// File holding every user, album, photo and tag.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub stock: StockConfig,

    #[serde(default)]
    pub tagging: TaggingConfig,

    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Login name that opens the user administration view.
    /// Never stored as a regular user.
    #[serde(default = "default_admin_username")]
    pub username: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Recreate the stock user at startup when it is missing.
    #[serde(default = "default_stock_enabled")]
    pub enabled: bool,

    #[serde(default = "default_stock_username")]
    pub username: String,

    #[serde(default = "default_stock_album")]
    pub album: String,

    /// Photos placed in the stock album, in order.
    #[serde(default = "default_stock_photos")]
    pub photos: Vec<PathBuf>,
}

fn default_stock_enabled() -> bool {
    true
}

fn default_stock_username() -> String {
    "stock".to_string()
}

fn default_stock_album() -> String {
    "stock".to_string()
}

fn default_stock_photos() -> Vec<PathBuf> {
    (1..=5)
        .map(|n| PathBuf::from(format!("data/coffee{}.jpg", n)))
        .collect()
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            enabled: default_stock_enabled(),
            username: default_stock_username(),
            album: default_stock_album(),
            photos: default_stock_photos(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingConfig {
    /// Keys always offered when tagging, on top of keys already in use.
    #[serde(default = "default_suggested_keys")]
    pub suggested_keys: Vec<String>,
}

fn default_suggested_keys() -> Vec<String> {
    vec!["Person".to_string(), "Location".to_string()]
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            suggested_keys: default_suggested_keys(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

fn default_image_extensions() -> Vec<String> {
    vec![
        "jpg".to_string(),
        "jpeg".to_string(),
        "png".to_string(),
        "gif".to_string(),
        "webp".to_string(),
        "heic".to_string(),
    ]
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
        }
    }
}

fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("albumist")
        .join("users.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            admin: AdminConfig::default(),
            stock: StockConfig::default(),
            tagging: TaggingConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

impl Config {
    /// Load from `ALBUMIST_CONFIG` or the default location, writing a
    /// default config there if none exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("albumist")
    }

    fn config_path() -> PathBuf {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::config_dir().join("config.toml"),
        }
    }

    /// Whether `username` is the reserved admin login.
    pub fn is_admin(&self, username: &str) -> bool {
        username == self.admin.username
    }
}
