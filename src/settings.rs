use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, path::PathBuf, str::FromStr};

use crate::constants::{DEFAULT_MAX_EDGE, DEFAULT_MAX_TARGET_EDGE};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Shared secret every upload must present in its `token` field.
    #[serde(default)]
    pub upload_token: String,

    /// Allowed referer hosts, or `*` to allow every caller.
    #[serde(default)]
    pub referers: Vec<String>,

    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Longest edge an upload keeps when no resize directive says otherwise.
    #[serde(default = "default_max_edge")]
    pub max_edge: u32,

    /// Largest side a `resize` directive may produce.
    #[serde(default = "default_max_target_edge")]
    pub max_target_edge: u32,

    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Media-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_storage_root() -> PathBuf {
    PathBuf::from("static")
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}
fn default_max_edge() -> u32 {
    DEFAULT_MAX_EDGE
}
fn default_max_target_edge() -> u32 {
    DEFAULT_MAX_TARGET_EDGE
}
fn default_jpeg_quality() -> u8 {
    85
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name.to_string().to_lowercase())).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("referers"),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;
        config.upload_token = fill_or_env(config.upload_token, "APP_UPLOAD_TOKEN")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.upload_token.trim().is_empty() {
            errors.push("UPLOAD_TOKEN cannot be empty");
        }
        if self.allowed_referers().is_empty() {
            errors.push("REFERERS must list at least one host or *");
        }
        if self.max_edge == 0 {
            errors.push("MAX_EDGE must be greater than zero");
        }
        if self.max_target_edge < self.max_edge {
            errors.push("MAX_TARGET_EDGE must be at least MAX_EDGE");
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            errors.push("JPEG_QUALITY must be between 1 and 100");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    /// Referer entries with comma-joined values split apart, trimmed and lower-cased.
    pub fn allowed_referers(&self) -> Vec<String> {
        self.referers
            .iter()
            .flat_map(|host| host.split(','))
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "[MISSING]" } else { "[REDACTED]" }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("upload_token", &redact(&self.upload_token))
            .field("referers", &self.referers)
            .field("storage_root", &self.storage_root)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_edge", &self.max_edge)
            .field("max_target_edge", &self.max_target_edge)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig {
            env: AppEnvironment::Testing,
            name: "media".into(),
            port: 0,
            host: "127.0.0.1".into(),
            worker_count: 1,
            upload_token: "secret".into(),
            referers: vec!["*".into()],
            storage_root: PathBuf::from("static"),
            max_upload_bytes: 1024,
            max_edge: 1000,
            max_target_edge: 8192,
            jpeg_quality: 85,
        }
    }

    #[test]
    fn referers_are_split_trimmed_and_lowercased() {
        let config = AppConfig {
            referers: vec!["MySite.com, cdn.example.org".into(), " ".into(), "other.net".into()],
            ..sample_config()
        };

        assert_eq!(
            config.allowed_referers(),
            vec!["mysite.com", "cdn.example.org", "other.net"]
        );
    }

    #[test]
    fn validate_rejects_empty_token_and_referers() {
        let config = AppConfig {
            upload_token: "   ".into(),
            referers: vec![],
            ..sample_config()
        };

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("UPLOAD_TOKEN"));
        assert!(message.contains("REFERERS"));
    }

    #[test]
    fn validate_rejects_target_cap_below_max_edge() {
        let config = AppConfig {
            max_target_edge: 500,
            ..sample_config()
        };

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("MAX_TARGET_EDGE"));
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", sample_config());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
