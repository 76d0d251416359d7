use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use client_core::ClientConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `path` if it exists, then environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<ClientConfig> {
    let mut settings = ClientConfig::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
        .base_url()
        .context("api base url from settings is unusable")?;
    Ok(settings)
}

fn apply_file(settings: &mut ClientConfig, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(v);
    }
}

fn apply_env(settings: &mut ClientConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("USERS_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout = Duration::from_secs(parsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_file(contents: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("users_console_test_{suffix}.toml"));
        fs::write(&path, contents).expect("write settings");
        path
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = load_settings(Path::new("/nonexistent/console.toml")).expect("settings");
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_file(
            "api_base_url = \"http://127.0.0.1:3000\"\nrequest_timeout_secs = 3\n",
        );
        let settings = load_settings(&path).expect("settings");
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert!(settings.api_base_url.starts_with("http://127.0.0.1:3000"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_file("request_timeout_secs = \"soon\"\n");
        let result = load_settings(&path);
        fs::remove_file(&path).expect("cleanup");
        assert!(result.is_err());
    }

    #[test]
    fn app_prefixed_env_wins_and_bad_timeout_is_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("USERS_API_BASE_URL", "http://users.local"),
            ("APP__API_BASE_URL", "http://app.local"),
            ("APP__REQUEST_TIMEOUT_SECS", "forever"),
        ]);
        let mut settings = ClientConfig::default();

        apply_env(&mut settings, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_base_url, "http://app.local");
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
    }
}
