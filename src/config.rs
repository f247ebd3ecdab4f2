use std::{env, fs, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str =
    "https://apis.netstart.cn/maoyan/cinema/shows?cinemaId=26501&ci=1&channelId=4";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_WINDOW_TITLE: &str = "中影影城(临清店)排片生成器";
pub const DEFAULT_FILE_PREFIX: &str = "中影影城排片";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub window_title: String,
    pub file_prefix: String,
    /// Where documents are written. `None` means the user's desktop.
    pub output_dir: Option<PathBuf>,
    pub ui_font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            output_dir: None,
            ui_font_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(alias = "url")]
    api_url: Option<String>,
    user_agent: Option<String>,
    request_timeout_secs: Option<u64>,
    window_title: Option<String>,
    file_prefix: Option<String>,
    output_dir: Option<String>,
    ui_font_path: Option<String>,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Merge a `config.json` body over the defaults. Blank strings are ignored.
pub fn parse_config(raw: &str) -> Result<AppConfig, serde_json::Error> {
    let parsed: RawConfig = serde_json::from_str(raw)?;
    let mut cfg = AppConfig::default();

    if let Some(url) = non_blank(parsed.api_url) {
        cfg.api_url = url;
    }
    if let Some(ua) = non_blank(parsed.user_agent) {
        cfg.user_agent = ua;
    }
    if let Some(secs) = parsed.request_timeout_secs {
        if secs == 0 {
            warn!("request_timeout_secs must be positive; keeping {DEFAULT_TIMEOUT_SECS}");
        } else {
            cfg.request_timeout_secs = secs;
        }
    }
    if let Some(title) = non_blank(parsed.window_title) {
        cfg.window_title = title;
    }
    if let Some(prefix) = non_blank(parsed.file_prefix) {
        cfg.file_prefix = prefix;
    }
    cfg.output_dir = non_blank(parsed.output_dir).map(PathBuf::from);
    cfg.ui_font_path = non_blank(parsed.ui_font_path).map(PathBuf::from);

    Ok(cfg)
}

/// `config.json` in the working directory wins over the one beside the executable.
fn config_candidates() -> Vec<PathBuf> {
    let mut out = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = env::current_exe().ok().and_then(|p| p.parent().map(|d| d.to_path_buf())) {
        out.push(dir.join(CONFIG_FILE));
    }
    out
}

pub fn load_config() -> AppConfig {
    for cfg_path in config_candidates() {
        let Ok(raw) = fs::read_to_string(&cfg_path) else {
            continue;
        };
        return match parse_config(&raw) {
            Ok(cfg) => {
                info!("Loaded config from {}", cfg_path.display());
                cfg
            }
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Using defaults.",
                    cfg_path.display(),
                    err
                );
                AppConfig::default()
            }
        };
    }

    info!("No config.json found; using defaults");
    AppConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_keeps_defaults() {
        let cfg = parse_config("{}").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn overrides_and_blank_values() {
        let raw = r#"{
            "url": "http://127.0.0.1:9000/shows",
            "file_prefix": "  ",
            "request_timeout_secs": 0,
            "output_dir": "/tmp/sheets"
        }"#;
        let cfg = parse_config(raw).unwrap();
        assert_eq!(cfg.api_url, "http://127.0.0.1:9000/shows");
        assert_eq!(cfg.file_prefix, DEFAULT_FILE_PREFIX);
        assert_eq!(cfg.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/sheets")));
        assert_eq!(cfg.ui_font_path, None);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(parse_config(r#"{"request_timeout_secs": "ten"}"#).is_err());
    }
}
