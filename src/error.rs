use std::fmt;
use std::io;

/// Message carried by every route denial.
pub const ACCESS_DENIED_MESSAGE: &str =
    "Access denied: this route is restricted to the developer whitelist.";

/// Errors that can occur in the devgate crate.
#[derive(Debug)]
pub enum Error {
    /// A restricted route was requested from a client outside the allowlist
    AccessDenied(AccessDenied),
    /// Configuration could not be loaded
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AccessDenied(e) => write!(f, "{}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::AccessDenied(e) => Some(e),
            Error::Config(e) => Some(e),
        }
    }
}

impl From<AccessDenied> for Error {
    fn from(e: AccessDenied) -> Self {
        Error::AccessDenied(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

/// A terminal "forbidden" failure raised by the route gate.
///
/// The host framework should turn this into an HTTP 403 response and stop
/// handling the request. It is never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    client_ip: String,
    reverse: Option<String>,
}

impl AccessDenied {
    /// Creates a denial for the given client.
    pub fn new(client_ip: impl Into<String>, reverse: Option<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            reverse,
        }
    }

    /// Returns the fixed, user-visible denial message.
    pub fn message(&self) -> &'static str {
        ACCESS_DENIED_MESSAGE
    }

    /// Returns the HTTP status code hosts should answer with.
    pub fn status(&self) -> u16 {
        403
    }

    /// Returns the client IP that was denied.
    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }

    /// Returns the reverse hostname resolved for the client, if any.
    pub fn reverse(&self) -> Option<&str> {
        self.reverse.as_deref()
    }
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ACCESS_DENIED_MESSAGE)
    }
}

impl std::error::Error for AccessDenied {}

/// Failure to load or validate a [`GuardConfig`](crate::GuardConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    Io {
        /// Path that was being read
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The YAML document does not match the configuration schema
    Parse(serde_yaml::Error),
    /// A value is structurally impossible
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable explanation
        message: String,
    },
}

impl ConfigError {
    /// Creates a validation error for a field.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "cannot read '{}': {}", path, source),
            ConfigError::Parse(e) => write!(f, "invalid YAML: {}", e),
            ConfigError::Invalid { field, message } => {
                write!(f, "invalid value for '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e)
    }
}
