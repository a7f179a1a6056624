use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment; selects which optional config overlay is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Prod,
}

impl Environment {
    /// Parse case-insensitively; anything unrecognised is treated as `Local`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "dev" => Environment::Dev,
            "prod" => Environment::Prod,
            _ => Environment::Local,
        }
    }

    /// Read `SEED_ENV`, defaulting to `Local`.
    pub fn from_env() -> Self {
        std::env::var("SEED_ENV")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual fields
    pub connection_string: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Target database name
    pub name: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "[REDACTED]"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            host: "localhost".to_string(),
            port: 5432,
            username: "postgres".to_string(),
            password: "password".to_string(),
            name: "metrics".to_string(),
            max_connections: 5,
            connect_timeout_secs: 10,
        }
    }
}

/// Where the connection settings ended up coming from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSource {
    /// `database.connection_string`
    Configured(String),
    /// `DATABASE_URL`
    Environment(String),
    /// Assembled from host, port, credentials and database name
    Components,
}

impl AppConfig {
    /// Load configuration from defaults, config files and environment variables
    pub fn load() -> anyhow::Result<Self> {
        Self::load_for(Environment::from_env())
    }

    /// Load configuration for an explicit environment.
    ///
    /// Precedence, lowest first: built-in defaults, `config/default.*`,
    /// `config/{environment}.*`, then `SEED_*` variables using `__` as the
    /// nesting separator (`SEED_DATABASE__NAME=metrics`).
    pub fn load_for(environment: Environment) -> anyhow::Result<Self> {
        let defaults = AppConfig {
            environment,
            ..AppConfig::default()
        };

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::File::with_name(&format!("config/{}", environment.as_str()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("SEED")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        // SEED_ENV picks the overlay; it must not be overridden by the overlay itself
        app_config.environment = environment;

        Ok(app_config)
    }
}

impl DatabaseConfig {
    /// Decide where the connection settings come from, honouring
    /// `connection_string`, then `DATABASE_URL`, then the individual fields.
    pub fn connection_source(&self) -> ConnectionSource {
        self.resolve_connection_source(std::env::var("DATABASE_URL").ok())
    }

    /// Same as `connection_source` with the `DATABASE_URL` value passed in.
    /// Blank values at either step are skipped.
    pub fn resolve_connection_source(&self, database_url: Option<String>) -> ConnectionSource {
        if let Some(connection_string) = &self.connection_string {
            if !connection_string.trim().is_empty() {
                return ConnectionSource::Configured(connection_string.clone());
            }
        }

        if let Some(url) = database_url {
            if !url.trim().is_empty() {
                return ConnectionSource::Environment(url);
            }
        }

        ConnectionSource::Components
    }

    /// Build driver connect options for the resolved connection source
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        self.connect_options_for(self.connection_source())
    }

    pub fn connect_options_for(&self, source: ConnectionSource) -> anyhow::Result<PgConnectOptions> {
        let options = match source {
            ConnectionSource::Configured(url) | ConnectionSource::Environment(url) => {
                PgConnectOptions::from_str(&url)?
            }
            ConnectionSource::Components => PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.username)
                .password(&self.password)
                .database(&self.name),
        };

        Ok(options)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Host/port/database triple for log lines; never includes credentials
    pub fn describe(&self) -> String {
        match self.connection_source() {
            ConnectionSource::Configured(_) => "configured connection string".to_string(),
            ConnectionSource::Environment(_) => "DATABASE_URL".to_string(),
            ConnectionSource::Components => {
                format!("{}:{}/{}", self.host, self.port, self.name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse_falls_back_to_local() {
        assert_eq!(Environment::parse("dev"), Environment::Dev);
        assert_eq!(Environment::parse("PROD"), Environment::Prod);
        assert_eq!(Environment::parse(" Local "), Environment::Local);
        assert_eq!(Environment::parse("staging"), Environment::Local);
        assert_eq!(Environment::parse(""), Environment::Local);
    }

    #[test]
    fn test_connection_string_wins() {
        let config = DatabaseConfig {
            connection_string: Some("postgres://seed:secret@db:5433/observability".to_string()),
            ..DatabaseConfig::default()
        };

        assert_eq!(
            config.connection_source(),
            ConnectionSource::Configured(
                "postgres://seed:secret@db:5433/observability".to_string()
            )
        );

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("observability"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = DatabaseConfig {
            connection_string: Some("postgres://seed:hunter2@db/metrics".to_string()),
            password: "hunter2".to_string(),
            ..DatabaseConfig::default()
        };

        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "metrics");
        assert_eq!(config.database.connect_timeout(), Duration::from_secs(10));
    }
    #[test]
    fn test_database_url_used_without_connection_string() {
        let config = DatabaseConfig::default();
        let source = config
            .resolve_connection_source(Some("postgres://env:pw@envhost:6543/envdb".to_string()));

        assert_eq!(
            source,
            ConnectionSource::Environment("postgres://env:pw@envhost:6543/envdb".to_string())
        );

        let options = config.connect_options_for(source).unwrap();
        assert_eq!(options.get_host(), "envhost");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("envdb"));
    }

    #[test]
    fn test_connection_string_beats_database_url() {
        let config = DatabaseConfig {
            connection_string: Some("postgres://cfg@cfghost/cfgdb".to_string()),
            ..DatabaseConfig::default()
        };

        assert_eq!(
            config.resolve_connection_source(Some("postgres://env@envhost/envdb".to_string())),
            ConnectionSource::Configured("postgres://cfg@cfghost/cfgdb".to_string())
        );
    }

    #[test]
    fn test_blank_sources_are_skipped() {
        let config = DatabaseConfig {
            connection_string: Some("   ".to_string()),
            ..DatabaseConfig::default()
        };

        assert_eq!(
            config.resolve_connection_source(Some(String::new())),
            ConnectionSource::Components
        );
        assert_eq!(
            config.resolve_connection_source(Some("  ".to_string())),
            ConnectionSource::Components
        );
        assert_eq!(
            config.resolve_connection_source(Some("postgres://env@envhost/envdb".to_string())),
            ConnectionSource::Environment("postgres://env@envhost/envdb".to_string())
        );
    }

    #[test]
    fn test_empty_connection_string_falls_back_to_components() {
        let config = DatabaseConfig {
            connection_string: Some(String::new()),
            host: "db.internal".to_string(),
            port: 5433,
            username: "seed".to_string(),
            password: "007".to_string(),
            name: "observability".to_string(),
            ..DatabaseConfig::default()
        };

        let source = config.resolve_connection_source(None);
        assert_eq!(source, ConnectionSource::Components);

        let options = config.connect_options_for(source).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "seed");
        assert_eq!(options.get_database(), Some("observability"));
    }
}
