//! CLI error types.

use thiserror::Error;
use zabbix_bulk::{CommandFileError, InvokeError};

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Connection to the API failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The API returned an error envelope.
    #[error("API error {code}: {message}{}", data_suffix(.data))]
    Api {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
        /// Additional detail from the server.
        data: Option<String>,
    },

    /// The API response could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A requested object does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A command failed outside a bulk file.
    #[error(transparent)]
    Command(InvokeError),

    /// Bulk command file error.
    #[error(transparent)]
    Bulk(#[from] CommandFileError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn data_suffix(data: &Option<String>) -> String {
    data.as_ref().map(|d| format!(" ({d})")).unwrap_or_default()
}

impl From<CliError> for InvokeError {
    fn from(err: CliError) -> Self {
        Self::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_display_connection() {
        let err = CliError::Connection("timeout".into());
        assert_eq!(err.to_string(), "connection error: timeout");
    }

    #[test]
    fn cli_error_display_api() {
        let err = CliError::Api {
            code: -32602,
            message: "Invalid params.".into(),
            data: Some("Host group \"Linux\" already exists.".into()),
        };
        assert_eq!(
            err.to_string(),
            "API error -32602: Invalid params. (Host group \"Linux\" already exists.)"
        );

        let err = CliError::Api {
            code: -32500,
            message: "Application error.".into(),
            data: None,
        };
        assert_eq!(err.to_string(), "API error -32500: Application error.");
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }

    #[test]
    fn cli_error_into_invoke_error_keeps_message() {
        let err: InvokeError = CliError::NotFound("host web01".into()).into();
        assert_eq!(err.to_string(), "host web01 not found");
        assert!(!err.is_clean_exit());
    }
}
