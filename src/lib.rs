pub mod config;
pub mod model;
pub mod seed;
pub mod store;

pub use config::{AppConfig, DatabaseConfig, Environment};
pub use model::*;
pub use seed::*;
pub use store::{DocumentStore, MemoryStore, PostgresStore};

/// Initialise `env_logger` with `info` as the default level and the database
/// driver capped at `warn`. `RUST_LOG` overrides both. Fails if a logger is
/// already installed.
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_env(env_logger::Env::default())
        .try_init()
}
