//! Configuration management for txportal
//!
//! This module handles loading, validation, and management of
//! txportal configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Only identities from this email domain are admitted
    #[serde(default = "default_allowed_domain")]
    pub allowed_domain: String,
    /// Bearer-token validation endpoint (optional)
    #[serde(default)]
    pub token_validation_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_domain: default_allowed_domain(),
            token_validation_url: None,
        }
    }
}

fn default_allowed_domain() -> String {
    "farmatodo.com".to_string()
}

/// Outbound HTTP settings shared by every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// A selectable account for a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub number: String,
    pub description: String,
}

impl AccountEntry {
    fn new(number: &str, description: &str) -> Self {
        Self {
            number: number.to_string(),
            description: description.to_string(),
        }
    }
}

/// Banco Plaza endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlazaConfig {
    #[serde(default = "default_plaza_url")]
    pub url: String,
    #[serde(default = "default_plaza_accounts")]
    pub accounts: Vec<AccountEntry>,
}

impl Default for PlazaConfig {
    fn default() -> Self {
        Self {
            url: default_plaza_url(),
            accounts: default_plaza_accounts(),
        }
    }
}

fn default_plaza_url() -> String {
    "https://plaza-movimientos-37254579896.us-central1.run.app".to_string()
}

fn default_plaza_accounts() -> Vec<AccountEntry> {
    vec![
        AccountEntry::new("01380033220330017446", "Cuenta Pago Movil"),
        AccountEntry::new("01380010300100290019", "Cuenta Débito Inmediato"),
        AccountEntry::new("01380033260330024345", "Cuenta Vuelto"),
        AccountEntry::new("01380033280330025252", "Cuenta Devoluciones"),
    ]
}

/// Banco de Venezuela endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenezuelaConfig {
    #[serde(default = "default_venezuela_url")]
    pub url: String,
    /// Currency sent as `tipoMoneda`
    #[serde(default = "default_venezuela_currency")]
    pub currency: String,
    /// Hard cap on page requests per search
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_venezuela_accounts")]
    pub accounts: Vec<AccountEntry>,
}

impl Default for VenezuelaConfig {
    fn default() -> Self {
        Self {
            url: default_venezuela_url(),
            currency: default_venezuela_currency(),
            max_pages: default_max_pages(),
            accounts: default_venezuela_accounts(),
        }
    }
}

fn default_venezuela_url() -> String {
    "https://venezuela-movimientos-37254579896.us-central1.run.app".to_string()
}

fn default_venezuela_currency() -> String {
    "VES".to_string()
}

fn default_max_pages() -> usize {
    50
}

fn default_venezuela_accounts() -> Vec<AccountEntry> {
    vec![
        AccountEntry::new("01020762210000117663", "Cuenta Pago Movil"),
        AccountEntry::new("01020762230000117676", "Cuenta Vuelto"),
    ]
}

/// Mercantil mobile-payment endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MercantilConfig {
    #[serde(default = "default_mercantil_url")]
    pub url: String,
    /// Phone number that receives the payments being validated
    #[serde(default = "default_destination_phone")]
    pub destination_phone: String,
    /// Currency sent as `tipoMoneda`
    #[serde(default = "default_mercantil_currency")]
    pub currency: String,
    #[serde(default = "default_mercantil_accounts")]
    pub accounts: Vec<AccountEntry>,
}

impl Default for MercantilConfig {
    fn default() -> Self {
        Self {
            url: default_mercantil_url(),
            destination_phone: default_destination_phone(),
            currency: default_mercantil_currency(),
            accounts: default_mercantil_accounts(),
        }
    }
}

fn default_mercantil_url() -> String {
    "https://consulta-pm-mercantil-843945314233.us-central1.run.app".to_string()
}

fn default_destination_phone() -> String {
    "04141150078".to_string()
}

fn default_mercantil_currency() -> String {
    "ves".to_string()
}

fn default_mercantil_accounts() -> Vec<AccountEntry> {
    vec![AccountEntry::new("MERCANTIL_PM", "Cuenta Pago Movil Mercantil")]
}

/// All provider endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub plaza: PlazaConfig,
    #[serde(default)]
    pub venezuela: VenezuelaConfig,
    #[serde(default)]
    pub mercantil: MercantilConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Movements per result page
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_records_per_page() -> usize {
    100
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Provider endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.auth.allowed_domain.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "auth.allowed_domain".to_string(),
            });
        }

        if let Some(ref url) = self.auth.token_validation_url {
            check_url("auth.token_validation_url", url)?;
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.pagination.records_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.providers.venezuela.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "providers.venezuela.max_pages".to_string(),
                reason: "At least one page must be allowed".to_string(),
            });
        }

        check_url("providers.plaza.url", &self.providers.plaza.url)?;
        check_url("providers.venezuela.url", &self.providers.venezuela.url)?;
        check_url("providers.mercantil.url", &self.providers.mercantil.url)?;

        if self.providers.mercantil.destination_phone.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "providers.mercantil.destination_phone".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Socket address string for the server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn check_url(field: &str, value: &str) -> ConfigResult<()> {
    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        Ok(parsed) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("Unsupported URL scheme: {}", parsed.scheme()),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("Invalid URL: {}", e),
        }),
    }
}

// ==================== Tests ====================
