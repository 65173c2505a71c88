use std::{fs, time::Duration};

use serde::Deserialize;

#[derive(Debug)]
pub struct Settings {
    pub backend_url: String,
    pub submit_timeout_seconds: u64,
}

impl Settings {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".into(),
            submit_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    submit_timeout_seconds: Option<u64>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("console.toml") {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            if let Some(v) = file_cfg.backend_url {
                settings.backend_url = v;
            }
            if let Some(v) = file_cfg.submit_timeout_seconds {
                settings.submit_timeout_seconds = v;
            }
        }
    }

    if let Ok(v) = std::env::var("CONSOLE_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Ok(v) = std::env::var("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Ok(v) = std::env::var("APP__SUBMIT_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.submit_timeout_seconds = parsed;
        }
    }

    settings.backend_url = normalize_backend_url(&settings.backend_url);
    settings
}

fn normalize_backend_url(raw_backend_url: &str) -> String {
    let raw_backend_url = raw_backend_url.trim();

    if raw_backend_url.is_empty() {
        return Settings::default().backend_url;
    }

    let candidate = if raw_backend_url.contains("://") {
        raw_backend_url.to_string()
    } else {
        format!("http://{raw_backend_url}")
    };

    match url::Url::parse(&candidate) {
        Ok(_) => candidate.trim_end_matches('/').to_string(),
        Err(_) => Settings::default().backend_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_an_http_scheme() {
        assert_eq!(
            normalize_backend_url("127.0.0.1:8000"),
            "http://127.0.0.1:8000"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(
            normalize_backend_url("http://backend.local:8000/"),
            "http://backend.local:8000"
        );
    }

    #[test]
    fn empty_and_unparseable_urls_fall_back_to_the_default() {
        assert_eq!(normalize_backend_url("   "), Settings::default().backend_url);
        assert_eq!(
            normalize_backend_url("http://"),
            Settings::default().backend_url
        );
    }

    #[test]
    fn env_overrides_win_over_defaults() {
        std::env::set_var("APP__BACKEND_URL", "http://10.1.1.1:8000");
        std::env::set_var("APP__SUBMIT_TIMEOUT_SECONDS", "5");

        let settings = load_settings();
        assert_eq!(settings.backend_url, "http://10.1.1.1:8000");
        assert_eq!(settings.submit_timeout_seconds, 5);

        std::env::remove_var("APP__BACKEND_URL");
        std::env::remove_var("APP__SUBMIT_TIMEOUT_SECONDS");
    }

    #[test]
    fn file_settings_tolerate_partial_files() {
        let file_cfg: FileSettings =
            toml::from_str("backend_url = \"http://10.0.0.5:8000\"").expect("parse");
        assert_eq!(file_cfg.backend_url.as_deref(), Some("http://10.0.0.5:8000"));
        assert_eq!(file_cfg.submit_timeout_seconds, None);
    }
}
