use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;
use url::Url;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let routinely_dir = home.join(".routinely");
        let config_path = routinely_dir.join("config.toml");

        if !routinely_dir.exists() {
            fs::create_dir_all(&routinely_dir).context("Failed to create .routinely directory")?;
        }

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let mut config = Self {
                config_path,
                ..Self::default()
            };
            config.apply_env_overrides();
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = path.to_path_buf();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        require_scheme("planner.base_url", &self.planner.base_url, &["http", "https"])?;
        require_scheme("channel.url", &self.channel.url, &["ws", "wss"])?;

        if self.planner.request_timeout_secs == 0 || self.planner.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "planner timeouts must be greater than zero".into(),
            ));
        }
        if self.channel.open_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "channel.open_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.session.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "session.poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn require_scheme(field: &str, raw: &str, schemes: &[&str]) -> std::result::Result<(), ConfigError> {
    let parsed =
        Url::parse(raw).map_err(|e| ConfigError::Validation(format!("{field}: {e}")))?;
    if schemes.contains(&parsed.scheme()) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field}: unsupported scheme `{}` (expected {})",
            parsed.scheme(),
            schemes.join(" or ")
        )))
    }
}
