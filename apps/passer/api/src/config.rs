use core_config::{env_parse_or, server::ServerConfig, FromEnv};
use domain_users::TokenConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub tokens: TokenConfig,
    /// Preload the development user set at startup
    pub seed_users: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8081
        let tokens = TokenConfig::from_env()?; // Required - will fail if JWT_SECRET_KEY is not set
        let seed_users = env_parse_or("SEED_USERS", environment.is_development())?;

        Ok(Self {
            environment,
            server,
            tokens,
            seed_users,
        })
    }
}
