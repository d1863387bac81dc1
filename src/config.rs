use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default bind host for the HTTP transport.
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
/// Default bind port for the HTTP transport.
pub const DEFAULT_HTTP_PORT: u16 = 8080;
/// Default idle timeout applied to streamable HTTP sessions.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable {variable}: '{value}' ({expected})")]
    InvalidValue {
        /// Name of the offending variable.
        variable: String,
        /// Raw value supplied by the environment.
        value: String,
        /// Human readable description of the accepted values.
        expected: String,
    },
}

/// Runtime configuration for the SparkyFitness MCP server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the SparkyFitness backend API.
    pub api_url: String,
    /// API key presented to the backend on every request.
    pub api_key: String,
    /// Transport used to talk to the MCP client.
    pub transport: TransportMode,
    /// Host the HTTP transport binds to.
    pub http_host: String,
    /// Port the HTTP transport listens on.
    pub http_port: u16,
    /// Optional credentials guarding the `/mcp` endpoint.
    pub basic_auth: Option<BasicAuthCredentials>,
    /// Idle timeout for streamable HTTP sessions.
    pub session_idle_timeout: Duration,
    /// Logging settings applied at startup.
    pub logging: LogSettings,
}

/// Supported MCP transports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    /// JSON-RPC framed over stdin/stdout.
    Stdio,
    /// Streamable HTTP served by an axum listener.
    Http,
}

/// Username/password pair for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthCredentials {
    /// Expected username.
    pub username: String,
    /// Expected password.
    pub password: String,
}

impl std::fmt::Debug for BasicAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Output format for console logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration derived from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Console output format.
    pub format: LogFormat,
    /// Optional file receiving a copy of every log line.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup, performing validation along the way.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()));

        let api_url = require("SPARKYFITNESS_API_URL")?;
        let api_key = require("SPARKYFITNESS_API_KEY")?;

        let transport = match get("MCP_TRANSPORT") {
            Some(value) => value.parse().map_err(|()| ConfigError::InvalidValue {
                variable: "MCP_TRANSPORT".into(),
                value,
                expected: "must be 'stdio' or 'http'".into(),
            })?,
            None => TransportMode::Stdio,
        };

        let http_host = get("MCP_HTTP_HOST").unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string());
        let http_port = match get("MCP_HTTP_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                variable: "MCP_HTTP_PORT".into(),
                value,
                expected: "must be a port number between 0 and 65535".into(),
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let basic_auth = match (
            get("MCP_HTTP_BASIC_AUTH_USER"),
            get("MCP_HTTP_BASIC_AUTH_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BasicAuthCredentials { username, password }),
            _ => None,
        };

        let session_idle_timeout = match get("MCP_HTTP_SESSION_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        variable: "MCP_HTTP_SESSION_TIMEOUT_SECS".into(),
                        value,
                        expected: "must be a positive number of seconds".into(),
                    });
                }
            },
            None => DEFAULT_SESSION_IDLE_TIMEOUT,
        };

        let format = match get("LOG_FORMAT") {
            Some(value) => value.parse().map_err(|()| ConfigError::InvalidValue {
                variable: "LOG_FORMAT".into(),
                value,
                expected: "must be 'text' or 'json'".into(),
            })?,
            None => LogFormat::Text,
        };

        Ok(Self {
            api_url,
            api_key,
            transport,
            http_host,
            http_port,
            basic_auth,
            session_idle_timeout,
            logging: LogSettings {
                level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                format,
                file: get("LOG_FILE").map(PathBuf::from),
            },
        })
    }

    /// `host:port` string the HTTP transport binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Whether the `/mcp` endpoint requires basic authentication.
    pub fn basic_auth_enabled(&self) -> bool {
        self.basic_auth.is_some()
    }
}

impl std::str::FromStr for TransportMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Http => f.write_str("http"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}
