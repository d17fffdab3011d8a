use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use url::Url;

pub const CONFIG_FILE: &str = "docgen.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub auth_token: Option<String>,
    pub download_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            auth_token: None,
            download_dir: PathBuf::from("."),
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then the config file (`docgen.toml` in the working directory
/// unless a path is given), then environment. CLI flags are applied by the
/// caller on top.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let path = config_path.unwrap_or(Path::new(CONFIG_FILE));
    match read_config_file(path)? {
        Some(file_cfg) => apply_file(&mut settings, &file_cfg),
        None if config_path.is_some() => bail!("config file '{}' not found", path.display()),
        None => {}
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.server_url = normalize_server_url(&settings.server_url)?;
    Ok(settings)
}

fn read_config_file(path: &Path) -> anyhow::Result<Option<HashMap<String, String>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    };
    let parsed = toml::from_str::<HashMap<String, String>>(&raw)
        .with_context(|| format!("invalid config file '{}'", path.display()))?;
    Ok(Some(parsed))
}

fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("auth_token") {
        settings.auth_token = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("download_dir") {
        settings.download_dir = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
}

/// Later names win: `APP__*` overrides the short forms.
fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DOCGEN_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("DOCGEN_TOKEN") {
        settings.auth_token = Some(v);
    }
    if let Some(v) = var("APP__AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }

    if let Some(v) = var("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }

    if let Some(v) = var("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if settings
        .auth_token
        .as_deref()
        .is_some_and(|token| token.trim().is_empty())
    {
        settings.auth_token = None;
    }
}

pub fn normalize_server_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid server url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("server url '{trimmed}' must use http or https");
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
