use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use url::Url;

use crate::upload::UploadStrategy;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    pub gallery_base_url: Option<Url>,
    pub default_uploader: Option<String>,
    pub upload_strategy: Option<String>,
    pub request_timeout: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigEnv {
    gallery_base_url: Option<Url>,
    default_uploader: Option<String>,
    upload_strategy: Option<String>,
    request_timeout: Option<String>,
}

pub struct Config {
    pub gallery_base_url: Url,
    pub default_uploader: Option<String>,
    pub upload_strategy: UploadStrategy,
    /// Optional request timeout; absent by default, the backend imposes none.
    pub request_timeout: Option<Duration>,
}

fn merge_config(base: ConfigFile, override_config: ConfigEnv) -> Result<Config> {
    let gallery_base_url = override_config
        .gallery_base_url
        .or(base.gallery_base_url)
        .ok_or(anyhow!("No gallery base URL provided"))?;

    let default_uploader = override_config.default_uploader.or(base.default_uploader);

    let upload_strategy = override_config
        .upload_strategy
        .or(base.upload_strategy)
        .map(|s| s.parse::<UploadStrategy>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or_default();

    let request_timeout = override_config
        .request_timeout
        .or(base.request_timeout)
        .map(|s| humantime::parse_duration(&s))
        .transpose()
        .context("Invalid request_timeout value")?;

    Ok(Config {
        gallery_base_url,
        default_uploader,
        upload_strategy,
        request_timeout,
    })
}

fn config_path() -> Result<std::path::PathBuf> {
    let project_dirs = directories::ProjectDirs::from("com", "zamzam", "zam")
        .ok_or(anyhow!("Unable to determine home directory"))?;
    Ok(project_dirs.config_dir().join("config.toml"))
}

pub fn read_config() -> Result<Config> {
    let _ = dotenv();
    let env_config = envy::from_env::<ConfigEnv>().unwrap_or_default();

    let file_config = if let Ok(config) = fs::read_to_string(config_path()?) {
        toml::from_str(&config)?
    } else {
        ConfigFile::default()
    };

    merge_config(file_config, env_config)
}

pub fn write_config(config: ConfigFile) -> Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(&config)?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Configuration written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_file() {
        let file = ConfigFile {
            gallery_base_url: Some(Url::parse("http://file.example").unwrap()),
            default_uploader: Some("file-user".to_string()),
            ..Default::default()
        };
        let env = ConfigEnv {
            gallery_base_url: Some(Url::parse("http://env.example").unwrap()),
            ..Default::default()
        };

        let config = merge_config(file, env).unwrap();
        assert_eq!(config.gallery_base_url.as_str(), "http://env.example/");
        assert_eq!(config.default_uploader.as_deref(), Some("file-user"));
    }

    #[test]
    fn base_url_is_required() {
        let result = merge_config(ConfigFile::default(), ConfigEnv::default());
        assert!(result.is_err());
    }

    #[test]
    fn timeout_parses_humantime_strings() {
        let file = ConfigFile {
            gallery_base_url: Some(Url::parse("http://file.example").unwrap()),
            request_timeout: Some("30s".to_string()),
            ..Default::default()
        };

        let config = merge_config(file, ConfigEnv::default()).unwrap();
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn strategy_defaults_to_sequential() {
        let file = ConfigFile {
            gallery_base_url: Some(Url::parse("http://file.example").unwrap()),
            ..Default::default()
        };
        let config = merge_config(file, ConfigEnv::default()).unwrap();
        assert_eq!(config.upload_strategy, UploadStrategy::Sequential);

        let file = ConfigFile {
            gallery_base_url: Some(Url::parse("http://file.example").unwrap()),
            upload_strategy: Some("batch".to_string()),
            ..Default::default()
        };
        let config = merge_config(file, ConfigEnv::default()).unwrap();
        assert_eq!(config.upload_strategy, UploadStrategy::Batch);
    }
}
