use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
///
/// The Gemini API key is deliberately optional: the server starts without it
/// and model calls fail at first use.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub port: u16,
    /// Level for this crate when `RUST_LOG` is unset. Read from `LOG_LEVEL`.
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub cache_enabled: bool,
    /// Seconds a cached model reply stays valid. 0 = never expires.
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            port: 8000,
            log_level: "info".to_string(),
            cors_origins: vec!["*".to_string()],
            cache_enabled: true,
            cache_ttl_secs: 3600,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_api_base),
            port: match optional_env("PORT") {
                Some(port) => port
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => defaults.port,
            },
            log_level: optional_env("LOG_LEVEL").unwrap_or(defaults.log_level),
            cors_origins: optional_env("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            cache_enabled: match optional_env("CACHE_ENABLED") {
                Some(flag) => parse_flag(&flag).context("CACHE_ENABLED must be true or false")?,
                None => defaults.cache_enabled,
            },
            cache_ttl_secs: match optional_env("CACHE_TTL_SECS") {
                Some(ttl) => ttl
                    .parse::<u64>()
                    .context("CACHE_TTL_SECS must be a whole number of seconds")?,
                None => defaults.cache_ttl_secs,
            },
        })
    }

    /// Fallback `EnvFilter` directive, used only when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> String {
        format!("{}={}", env!("CARGO_CRATE_NAME"), self.log_level)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Reads a variable, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised boolean value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.port, 8000);
        assert!(config.cache_enabled);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert!(config.allows_any_origin());
    }

    #[test]
    fn test_default_log_filter_uses_log_level() {
        let config = Config {
            log_level: "debug".to_string(),
            ..Config::default()
        };
        assert_eq!(config.default_log_filter(), "job_optimizer_api=debug");
        assert_eq!(Config::default().default_log_filter(), "job_optimizer_api=info");
    }

    #[test]
    fn test_parse_origins_trims_and_drops_blanks() {
        let origins = parse_origins(" http://localhost:3000, ,https://app.example.com ");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn test_explicit_origins_do_not_allow_any() {
        let config = Config {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..Config::default()
        };
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(parse_flag("1").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
