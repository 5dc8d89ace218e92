//! Configuration management
//!
//! Everything is read once at startup from `.env` and the process
//! environment, validated, and passed explicitly to the components that need
//! it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/neurika";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_OPENAI_MAX_TOKENS: u32 = 1000;

/// Default upload limit (20 MiB).
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 20 * 1024 * 1024;

/// Characters of raw dataset text sent as completion context.
pub const DEFAULT_DATASET_CONTEXT_CHARS: usize = 10_000;

pub const DEFAULT_MAIL_FROM: &str = "Neurika <onboarding@resend.dev>";
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";

pub const DEFAULT_RATE_LIMIT_REQUESTS_PER_MINUTE: u64 = 120;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub completion: CompletionConfig,
    pub uploads: UploadConfig,
    pub mail: MailConfig,
    pub rate_limit: RateLimitConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// External identity endpoint that resolves bearer tokens to users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL; the user lookup is `GET {url}/user`
    pub url: String,
    /// Sent as the `apikey` header when set
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// OpenAI-compatible completion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub dataset_context_chars: usize,
}

/// Invitation mail through a Resend-compatible API; disabled without a key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(skip_serializing)]
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub from: String,
    /// Frontend origin used to build invitation links
    pub app_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// 0 disables rate limiting
    pub requests_per_minute: u64,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_env();
        config.validate()?;

        Ok(config)
    }

    /// Read the environment without loading `.env` or validating
    pub fn from_env() -> Self {
        Config {
            server: ServerConfig {
                host: env_string("NEURIKA_HOST", DEFAULT_SERVER_HOST),
                port: env_or("NEURIKA_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "NEURIKA_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            database: DatabaseConfig {
                url: env_string("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
                min_connections: env_or(
                    "DATABASE_MIN_CONNECTIONS",
                    DEFAULT_DATABASE_MIN_CONNECTIONS,
                ),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                idle_timeout_secs: env_or(
                    "DATABASE_IDLE_TIMEOUT",
                    DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                ),
            },
            cors: CorsConfig {
                allowed_origins: env_string("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ALLOWED_ORIGIN)
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
            auth: AuthConfig {
                url: env_string("AUTH_URL", ""),
                api_key: env_optional("AUTH_API_KEY"),
            },
            completion: CompletionConfig {
                api_key: env_string("OPENAI_API_KEY", ""),
                base_url: env_string("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
                model: env_string("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
                temperature: env_or("OPENAI_TEMPERATURE", DEFAULT_OPENAI_TEMPERATURE),
                max_tokens: env_or("OPENAI_MAX_TOKENS", DEFAULT_OPENAI_MAX_TOKENS),
            },
            uploads: UploadConfig {
                max_bytes: env_or("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES),
                dataset_context_chars: env_or(
                    "DATASET_CONTEXT_CHARS",
                    DEFAULT_DATASET_CONTEXT_CHARS,
                ),
            },
            mail: MailConfig {
                resend_api_key: env_optional("RESEND_API_KEY"),
                resend_base_url: env_string("RESEND_BASE_URL", DEFAULT_RESEND_BASE_URL),
                from: env_string("MAIL_FROM", DEFAULT_MAIL_FROM),
                app_base_url: env_string("APP_BASE_URL", DEFAULT_APP_BASE_URL),
            },
            rate_limit: RateLimitConfig {
                requests_per_minute: env_or(
                    "RATE_LIMIT_REQUESTS_PER_MINUTE",
                    DEFAULT_RATE_LIMIT_REQUESTS_PER_MINUTE,
                ),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.auth.url.trim().is_empty() {
            anyhow::bail!("AUTH_URL must point at the identity endpoint");
        }

        if self.completion.api_key.trim().is_empty() {
            anyhow::bail!("OPENAI_API_KEY is required");
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            anyhow::bail!(
                "OPENAI_TEMPERATURE must be between 0 and 2, got {}",
                self.completion.temperature
            );
        }

        if self.uploads.max_bytes == 0 {
            anyhow::bail!("UPLOAD_MAX_BYTES must be greater than 0");
        }

        if self.uploads.dataset_context_chars == 0 {
            anyhow::bail!("DATASET_CONTEXT_CHARS must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        if self.mail.resend_api_key.is_none() {
            tracing::warn!("RESEND_API_KEY not set - invitation emails will not be sent");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            auth: AuthConfig {
                url: "http://localhost:54321/auth/v1".to_string(),
                api_key: None,
            },
            completion: CompletionConfig {
                api_key: String::new(),
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                model: DEFAULT_OPENAI_MODEL.to_string(),
                temperature: DEFAULT_OPENAI_TEMPERATURE,
                max_tokens: DEFAULT_OPENAI_MAX_TOKENS,
            },
            uploads: UploadConfig {
                max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
                dataset_context_chars: DEFAULT_DATASET_CONTEXT_CHARS,
            },
            mail: MailConfig {
                resend_api_key: None,
                resend_base_url: DEFAULT_RESEND_BASE_URL.to_string(),
                from: DEFAULT_MAIL_FROM.to_string(),
                app_base_url: DEFAULT_APP_BASE_URL.to_string(),
            },
            rate_limit: RateLimitConfig {
                requests_per_minute: DEFAULT_RATE_LIMIT_REQUESTS_PER_MINUTE,
            },
        }
    }
}
