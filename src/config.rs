use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/waifubot/config.toml";

/// Bot configuration
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub general: General,
    #[serde(default)]
    pub booru: Booru,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub economy: Economy,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct General {
    pub discord_token: String,
    pub command_prefix: String,
    /// Discord user ids allowed to run the admin commands.
    #[serde(default)]
    pub admin_ids: Vec<u64>,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Booru {
    pub api_url: String,
    pub user_agent: String,
    /// Tag filter used when a command names none.
    pub default_filter: String,
}

impl Default for Booru {
    fn default() -> Self {
        Self {
            api_url: "https://danbooru.donmai.us".to_owned(),
            user_agent: "WaifuBot/1.0".to_owned(),
            default_filter: "rating:safe".to_owned(),
        }
    }
}

#[derive(Default, serde::Serialize, serde::Deserialize)]
pub struct Storage {
    /// Postgres connection string.  Unset means the JSON file fallback.
    #[serde(default)]
    pub database_url: Option<String>,
}

#[derive(Default, serde::Serialize, serde::Deserialize)]
pub struct Economy {
    /// Award waifame on every view instead of only when favoriting.
    #[serde(default)]
    pub reward_views: bool,
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
            anyhow!(
                "Could not open configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(config)
    }

    pub async fn reload(&mut self) -> Result<()> {
        let new = Self::load().await?;
        *self = new;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_section_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            discord_token = "token"
            command_prefix = "?"
            "#,
        )
        .unwrap();

        assert!(config.general.admin_ids.is_empty());
        assert_eq!(config.booru.default_filter, "rating:safe");
        assert!(config.storage.database_url.is_none());
        assert!(!config.economy.reward_views);
    }
}
