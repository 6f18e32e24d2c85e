use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub recaptcha: RecaptchaConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path the contact form posts to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Optional directory of pre-built frontend assets served for unmatched paths
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_endpoint() -> String {
    "/api/email".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub name: String,
    /// `local` enables debug logging, `production` switches to JSON logs
    pub env: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }

    pub fn is_local(&self) -> bool {
        self.env == "local"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// `*` or a semicolon-delimited list of exact origins
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
        }
    }
}

fn default_allow_origin() -> String {
    "*".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecaptchaConfig {
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_recaptcha_timeout")]
    pub timeout_secs: u64,
}

fn default_verify_url() -> String {
    "https://www.google.com/recaptcha/api/siteverify".to_string()
}

fn default_recaptcha_timeout() -> u64 {
    10
}

/// Transport security for the SMTP session.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailSecurity {
    /// Plain connection without TLS
    #[serde(alias = "")]
    None,
    /// STARTTLS upgrade, usually port 587
    #[default]
    Tls,
    /// Implicit TLS, usually port 465
    Ssl,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub host: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    #[serde(default = "default_mail_auth")]
    pub auth: bool,
    /// Falls back to `from` when empty
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub secure: MailSecurity,
    pub from: String,
    /// Falls back to `app.name` when unset
    #[serde(default)]
    pub from_name: Option<String>,
    /// Semicolon-delimited recipients
    pub to: String,
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
}

impl MailConfig {
    pub fn username(&self) -> &str {
        if self.username.is_empty() {
            &self.from
        } else {
            &self.username
        }
    }

    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .split(';')
            .map(str::trim)
            .filter(|to| !to.is_empty())
            .collect()
    }
}

fn default_mail_port() -> u16 {
    587
}

fn default_mail_auth() -> bool {
    true
}

fn default_mail_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive; unset means `debug` for `local`, `error` elsewhere
    #[serde(default)]
    pub level: Option<String>,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: default_log_format(),
        }
    }
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Flat variables understood by earlier deployments of the contact form,
/// mapped onto their configuration keys.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("APP_NAME", "app.name"),
    ("APP_ENV", "app.env"),
    ("ACCESS_CONTROL_ALLOW_ORIGIN", "cors.allow_origin"),
    ("RECAPTCHA_URL_VERIFY", "recaptcha.verify_url"),
    ("RECAPTCHA_V3_SECRET_KEY", "recaptcha.secret_key"),
    ("CONTACT_MAIL_HOST", "mail.host"),
    ("CONTACT_MAIL_AUTH", "mail.auth"),
    ("CONTACT_MAIL_FROM", "mail.from"),
    ("CONTACT_MAIL_PASSWORD", "mail.password"),
    ("CONTACT_MAIL_SECURE", "mail.secure"),
    ("CONTACT_MAIL_PORT", "mail.port"),
    ("CONTACT_MAIL_TO", "mail.to"),
];

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy flat environment variables (CONTACT_MAIL_HOST, etc.), from the
    ///    process or from a `.env` file; the process wins
    /// 2. Environment variables (FORMRELAY__MAIL__HOST, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("app.name", "formrelay")?
            .set_default("app.env", "production")?
            .set_default("mail.host", "")?
            .set_default("mail.from", "")?
            .set_default("mail.to", "")?
            .set_default("recaptcha.secret_key", "")?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional - ignore if not found
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("FORMRELAY")
                .separator("__")
                .try_parsing(true),
        );

        // Existing variables are never replaced by `.env` entries
        dotenv::dotenv().ok();

        for (var, key) in LEGACY_ENV {
            if let Ok(value) = env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    pub fn log_level(&self) -> &str {
        match &self.logging.level {
            Some(level) => level.as_str(),
            None if self.app.is_local() => "debug",
            None => "error",
        }
    }

    pub fn from_name(&self) -> &str {
        self.mail.from_name.as_deref().unwrap_or(&self.app.name)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if !self.server.endpoint.starts_with('/') {
            return Err("Server endpoint must start with '/'".to_string());
        }
        if self.recaptcha.secret_key.is_empty() {
            return Err("reCAPTCHA secret key is not configured".to_string());
        }
        if self.mail.host.is_empty() {
            return Err("Mail host is not configured".to_string());
        }
        if self.mail.from.is_empty() {
            return Err("Mail sender address is not configured".to_string());
        }
        if self.mail.recipients().is_empty() {
            return Err("Mail recipient list is empty".to_string());
        }
        if self.mail.auth && self.mail.password.is_empty() {
            return Err("Mail authentication is enabled but no password is set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            endpoint: default_endpoint(),
            static_dir: None,
        },
        app: AppConfig {
            name: "Portfolio".to_string(),
            env: "local".to_string(),
        },
        cors: CorsConfig::default(),
        recaptcha: RecaptchaConfig {
            verify_url: default_verify_url(),
            secret_key: "secret".to_string(),
            timeout_secs: 10,
        },
        mail: MailConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            auth: true,
            username: String::new(),
            password: "password".to_string(),
            secure: MailSecurity::Tls,
            from: "noreply@example.com".to_string(),
            from_name: None,
            to: "owner@example.com; partner@example.com;".to_string(),
            timeout_secs: 30,
        },
        logging: LoggingConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_port() {
        let mut config = test_config();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_relative_endpoint() {
        let mut config = test_config();
        config.server.endpoint = "api/email".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_missing_secret() {
        let mut config = test_config();
        config.recaptcha.secret_key.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_recipients() {
        let mut config = test_config();
        config.mail.to = " ; ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_auth_without_password() {
        let mut config = test_config();
        config.mail.password.clear();
        assert!(config.validate().is_err());

        config.mail.auth = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_recipients_are_split_and_trimmed() {
        let config = test_config();

        assert_eq!(
            config.mail.recipients(),
            vec!["owner@example.com", "partner@example.com"]
        );
    }

    #[test]
    fn test_log_level_follows_environment() {
        let mut config = test_config();
        assert_eq!(config.log_level(), "debug");

        config.app.env = "production".to_string();
        assert_eq!(config.log_level(), "error");

        config.app.env = "staging".to_string();
        assert_eq!(config.log_level(), "error");

        config.logging.level = Some("warn,formrelay=info".to_string());
        assert_eq!(config.log_level(), "warn,formrelay=info");
    }

    #[test]
    fn test_username_and_from_name_fallbacks() {
        let mut config = test_config();
        assert_eq!(config.mail.username(), "noreply@example.com");
        assert_eq!(config.from_name(), "Portfolio");

        config.mail.username = "relay-user".to_string();
        config.mail.from_name = Some("Contact form".to_string());
        assert_eq!(config.mail.username(), "relay-user");
        assert_eq!(config.from_name(), "Contact form");
    }
}
