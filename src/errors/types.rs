//! # Error Types
//!
//! Error types for the policy reconciler using `thiserror`.

use validator::{ValidationErrors, ValidationErrorsKind};

/// Custom result type for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the policy reconciler
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Declared configuration is invalid; raised before any network call
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Connection-level failure talking to the policy server
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Well-formed exchange that ended in a non-success status
    #[error("{operation} rejected by server: HTTP {status}: {body}")]
    RemoteRejection {
        operation: String,
        status: u16,
        body: String,
    },

    /// Object does not exist on the server (import only)
    #[error("{resource_type} '{name}' not found on server")]
    NotFound { resource_type: String, name: String },

    /// Session login failed
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Server answered with success but the payload breaks an identity rule
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The caller cancelled the in-flight operation
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },
}

impl Error {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
        }
    }

    /// Create a configuration error pointing at a specific field
    pub fn configuration_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a transport error without an underlying source
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a remote rejection carrying the response body verbatim
    pub fn remote_rejection<O: Into<String>, B: Into<String>>(
        operation: O,
        status: u16,
        body: B,
    ) -> Self {
        Self::RemoteRejection {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, N: Into<String>>(resource_type: R, name: N) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Wrap an I/O error with context
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap a JSON error with context
    pub fn serialization<S: Into<String>>(context: S, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// True for errors detected locally before any network call
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// True when the caller cancelled the operation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// HTTP status of a remote rejection, if this is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "connection failed".to_string()
        } else {
            error.to_string()
        };
        Self::Transport {
            message,
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            context: "JSON serialization failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        let field = error.location().map(|l| format!("line {}", l.line()));
        Self::Configuration {
            message: format!("Invalid declared state: {}", error),
            field,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::configuration(format!("Invalid config file: {}", error))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        let mut failures = Vec::new();
        collect_validation_failures("", &errors, &mut failures);
        failures.sort();

        let field = failures.first().map(|(path, _)| path.clone());
        let message = failures
            .iter()
            .map(|(path, message)| format!("{}: {}", path, message))
            .collect::<Vec<_>>()
            .join("; ");

        Self::Configuration {
            message: format!("Validation failed: {}", message),
            field,
        }
    }
}

/// Walk nested and list validation errors, producing `rules[1].action` style paths
fn collect_validation_failures(
    prefix: &str,
    errors: &ValidationErrors,
    out: &mut Vec<(String, String)>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value ({})", error.code));
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_failures(&path, nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_failures(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
