//! Service configuration
//!
//! Loaded from an optional `config/albums.toml` overlaid with `ALBUMS__*`
//! environment variables, e.g. `ALBUMS__SERVER__PORT=8080` or
//! `ALBUMS__SHARING__TOKEN_STRATEGY=random`.

use serde::Deserialize;

/// Top-level configuration of the albums service
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Base URL used when building public share links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sharing: SharingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Bearer token verification settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the token issuer; required
    pub jwt_secret: String,
    /// Role id that bypasses ownership checks
    #[serde(default = "default_admin_role_id")]
    pub admin_role_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub counter: CounterBackend,
}

/// Where entities are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// Which service owns the numeric id counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterBackend {
    #[default]
    Postgres,
    Redis,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SharingConfig {
    #[serde(default)]
    pub token_strategy: TokenStrategy,
    #[serde(default)]
    pub duplicate_guard: DuplicateGuard,
}

/// How album share tokens are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStrategy {
    /// Album number, creation millis and owner id concatenated
    #[default]
    Sequential,
    /// 32 random alphanumeric characters
    Random,
}

/// How the one-share-per-user-and-album rule is enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateGuard {
    /// Existence query before insert; concurrent requests can both pass
    #[default]
    Check,
    /// Unique index on (user_id, album_ref)
    UniqueIndex,
}

impl AppConfig {
    /// Load configuration from `config/albums.toml` and the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/albums").required(false))
            .add_source(
                config::Environment::with_prefix("ALBUMS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build config: {e}"))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {e}"))?;

        if config.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!("auth.jwt_secret must not be empty");
        }
        config.storage.validate()?;

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl StorageConfig {
    /// Counters must live at least as long as the entities they number
    pub fn validate(&self) -> anyhow::Result<()> {
        match (self.backend, self.counter) {
            (StorageBackend::Memory, CounterBackend::Postgres) => {
                anyhow::bail!("Postgres counters require the postgres storage backend")
            }
            (StorageBackend::Postgres, CounterBackend::Memory) => {
                anyhow::bail!("Memory counters would restart below persisted ids; use postgres or redis")
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
impl AppConfig {
    /// Defaults everywhere except the token secret
    pub fn with_secret(jwt_secret: &str) -> Self {
        Self {
            server: ServerConfig::default(),
            public_base_url: default_public_base_url(),
            auth: AuthConfig {
                jwt_secret: jwt_secret.to_string(),
                admin_role_id: default_admin_role_id(),
            },
            storage: StorageConfig::default(),
            sharing: SharingConfig::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_public_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_admin_role_id() -> i64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const KEYS: [&str; 7] = [
        "ALBUMS__AUTH__JWT_SECRET",
        "ALBUMS__SERVER__PORT",
        "ALBUMS__AUTH__ADMIN_ROLE_ID",
        "ALBUMS__STORAGE__BACKEND",
        "ALBUMS__STORAGE__COUNTER",
        "ALBUMS__SHARING__TOKEN_STRATEGY",
        "ALBUMS__SHARING__DUPLICATE_GUARD",
    ];

    fn clear_env() {
        for key in KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        unsafe {
            env::set_var("ALBUMS__AUTH__JWT_SECRET", "s3cret");
        }

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.auth.admin_role_id, 1);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.storage.counter, CounterBackend::Postgres);
        assert_eq!(config.sharing.token_strategy, TokenStrategy::Sequential);
        assert_eq!(config.sharing.duplicate_guard, DuplicateGuard::Check);
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.auth.jwt_secret, "s3cret");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_jwt_secret_is_required() {
        clear_env();
        assert!(AppConfig::load().is_err());

        unsafe {
            env::set_var("ALBUMS__AUTH__JWT_SECRET", "  ");
        }
        assert!(AppConfig::load().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            env::set_var("ALBUMS__AUTH__JWT_SECRET", "s3cret");
            env::set_var("ALBUMS__SERVER__PORT", "8080");
            env::set_var("ALBUMS__AUTH__ADMIN_ROLE_ID", "3");
            env::set_var("ALBUMS__STORAGE__BACKEND", "memory");
            env::set_var("ALBUMS__STORAGE__COUNTER", "memory");
            env::set_var("ALBUMS__SHARING__TOKEN_STRATEGY", "random");
            env::set_var("ALBUMS__SHARING__DUPLICATE_GUARD", "unique_index");
        }

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.admin_role_id, 3);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.counter, CounterBackend::Memory);
        assert_eq!(config.sharing.token_strategy, TokenStrategy::Random);
        assert_eq!(config.sharing.duplicate_guard, DuplicateGuard::UniqueIndex);

        clear_env();
    }

    #[test]
    fn test_counters_must_outlive_entities() {
        let storage = |backend, counter| StorageConfig { backend, counter };

        assert!(storage(StorageBackend::Postgres, CounterBackend::Memory)
            .validate()
            .is_err());
        assert!(storage(StorageBackend::Memory, CounterBackend::Postgres)
            .validate()
            .is_err());
        assert!(storage(StorageBackend::Postgres, CounterBackend::Postgres)
            .validate()
            .is_ok());
        assert!(storage(StorageBackend::Postgres, CounterBackend::Redis)
            .validate()
            .is_ok());
        assert!(storage(StorageBackend::Memory, CounterBackend::Memory)
            .validate()
            .is_ok());
    }
}
