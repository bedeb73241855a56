use serde::Deserialize;
use std::env;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
/// Argon2 refuses salts shorter than this.
const MIN_SALT_LEN: usize = 8;

/// Flat environment variables understood in addition to the nested
/// `SERVICE_ACCOUNT__SECTION__KEY` form.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVICE_ACCOUNT_CLIENT_ID", "oauth2.client_id"),
    ("SERVICE_ACCOUNT_CLIENT_SECRET", "oauth2.client_secret"),
    ("SERVICE_ACCOUNT_HYDRA_PROTO", "oauth2.hydra_proto"),
    ("SERVICE_ACCOUNT_HYDRA_PUBLIC_HOST", "oauth2.hydra_public_host"),
    (
        "SERVICE_ACCOUNT_HYDRA_PUBLIC_HOST_PRIVATE_LAN",
        "oauth2.hydra_public_host_private_lan",
    ),
    (
        "SERVICE_ACCOUNT_HYDRA_ADMIN_HOST_PRIVATE_LAN",
        "oauth2.hydra_admin_host_private_lan",
    ),
    ("SERVICE_ACCOUNT_REDIRECT_ADDR", "oauth2.redirect_addr"),
    ("SERVICE_ACCOUNT_DSN", "database.dsn"),
    ("SERVICE_ACCOUNT_SALT", "database.salt"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct HttpConfig {
    pub proto: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl HttpConfig {
    /// `listen_addr:port`, the socket address the server binds.
    pub fn host(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }

    pub fn host_url(&self) -> String {
        format!("{}://{}", self.proto, self.host())
    }
}

#[derive(Clone, Deserialize)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub hydra_proto: String,
    /// Public address of this service as seen by browsers coming back from the provider.
    pub redirect_addr: String,
    pub hydra_public_host: String,
    pub hydra_public_host_private_lan: String,
    pub hydra_admin_host_private_lan: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Lifetime in seconds of remembered login and consent sessions.
    #[serde(default = "default_remember_for")]
    pub remember_for: i64,
}

impl std::fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("hydra_proto", &self.hydra_proto)
            .field("redirect_addr", &self.redirect_addr)
            .field("hydra_public_host", &self.hydra_public_host)
            .field(
                "hydra_public_host_private_lan",
                &self.hydra_public_host_private_lan,
            )
            .field(
                "hydra_admin_host_private_lan",
                &self.hydra_admin_host_private_lan,
            )
            .field("scopes", &self.scopes)
            .field("remember_for", &self.remember_for)
            .finish()
    }
}

impl OAuth2Config {
    /// Base URL of the provider's admin API.
    pub fn admin_url(&self) -> String {
        with_scheme(&self.hydra_proto, &self.hydra_admin_host_private_lan)
    }

    /// Token endpoint, reached over the private network.
    pub fn token_url(&self) -> String {
        format!(
            "{}/oauth2/token",
            with_scheme(&self.hydra_proto, &self.hydra_public_host_private_lan)
        )
    }

    /// Browser-facing authorization endpoint.
    pub fn auth_url(&self) -> String {
        format!(
            "{}/oauth2/auth",
            with_scheme(&self.hydra_proto, &self.hydra_public_host)
        )
    }

    /// Browser-facing RP-initiated logout endpoint.
    pub fn logout_url(&self) -> String {
        format!(
            "{}/oauth2/sessions/logout",
            with_scheme(&self.hydra_proto, &self.hydra_public_host)
        )
    }
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub salt: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("dsn", &"<redacted>")
            .field("salt", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub oauth2: OAuth2Config,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// The consent flow is served by this service, so the consent URL is our own host URL.
    pub fn consent_url(&self) -> String {
        self.http.host_url()
    }

    /// Where the provider sends the browser back to.
    pub fn redirect_url(&self) -> String {
        format!("{}://{}", self.http.proto, self.oauth2.redirect_addr)
    }

    pub fn callback_url(&self) -> String {
        format!("{}/callback", self.redirect_url())
    }

    /// Check that every required attribute is present and usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("http.proto", &self.http.proto),
            ("http.listen_addr", &self.http.listen_addr),
            ("oauth2.client_id", &self.oauth2.client_id),
            ("oauth2.client_secret", &self.oauth2.client_secret),
            ("oauth2.hydra_proto", &self.oauth2.hydra_proto),
            ("oauth2.redirect_addr", &self.oauth2.redirect_addr),
            ("oauth2.hydra_public_host", &self.oauth2.hydra_public_host),
            (
                "oauth2.hydra_public_host_private_lan",
                &self.oauth2.hydra_public_host_private_lan,
            ),
            (
                "oauth2.hydra_admin_host_private_lan",
                &self.oauth2.hydra_admin_host_private_lan,
            ),
            ("database.dsn", &self.database.dsn),
            ("database.salt", &self.database.salt),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "missing required attribute {name}"
            )));
        }

        if !matches!(self.http.proto.as_str(), "http" | "https") {
            return Err(ConfigError::Validation(
                "http.proto must be either http or https".into(),
            ));
        }
        if self.http.port == 0 {
            return Err(ConfigError::Validation("http.port must be > 0".into()));
        }
        if self.database.salt.len() < MIN_SALT_LEN {
            return Err(ConfigError::Validation(format!(
                "database.salt must be at least {MIN_SALT_LEN} bytes"
            )));
        }
        if self.oauth2.remember_for < 0 {
            return Err(ConfigError::Validation(
                "oauth2.remember_for must not be negative".into(),
            ));
        }

        Ok(())
    }
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_scopes() -> Vec<String> {
    vec!["openid".to_string(), "offline".to_string()]
}

fn default_remember_for() -> i64 {
    3600
}

fn with_scheme(proto: &str, host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("{proto}://{host}")
    }
}

/// Path of the configuration file, `SERVICE_ACCOUNT_CONFIG` or `config.yaml`.
pub fn config_path() -> String {
    env::var("SERVICE_ACCOUNT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load application configuration from [`config_path`] + environment overrides.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_path())
}

/// Load configuration from the YAML file at `path`.
///
/// Nested keys can be overridden with `SERVICE_ACCOUNT__HTTP__PORT` style
/// variables, and the flat `SERVICE_ACCOUNT_*` variables listed in
/// `ENV_OVERRIDES` take precedence over both. Empty variables are ignored.
pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File, FileFormat};

    let mut builder = Config::builder()
        .set_default("http.listen_addr", DEFAULT_LISTEN_ADDR)?
        .set_default("http.port", i64::from(DEFAULT_PORT))?
        .add_source(File::new(path, FileFormat::Yaml))
        .add_source(
            Environment::with_prefix("SERVICE_ACCOUNT")
                .prefix_separator("__")
                .separator("__"),
        );

    for (var, key) in ENV_OVERRIDES {
        let value = env::var(var).ok().filter(|v| !v.is_empty());
        builder = builder.set_override_option(*key, value)?;
    }

    let app: AppConfig = builder.build()?.try_deserialize()?;
    app.validate()?;

    Ok(app)
}
