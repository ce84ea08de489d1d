use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Flowcast(#[from] flowcast::Error),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CliError {
    /// Process exit status: 2 for usage problems, 3 for content the view
    /// could have degraded around, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => 2,
            Self::Flowcast(err) if err.is_recoverable() => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<flowcast_core::SpecError> for CliError {
    fn from(err: flowcast_core::SpecError) -> Self {
        Self::Flowcast(err.into())
    }
}

impl From<flowcast::ConfigError> for CliError {
    fn from(err: flowcast::ConfigError) -> Self {
        Self::Flowcast(err.into())
    }
}

impl From<flowcast_web::RunnerError> for CliError {
    fn from(err: flowcast_web::RunnerError) -> Self {
        Self::Flowcast(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_exit_with_two() {
        assert_eq!(CliError::invalid("bad").exit_code(), 2);
        assert_eq!(CliError::invalid("bad").to_string(), "invalid argument: bad");
    }

    #[test]
    fn bad_content_is_distinguished_from_io() {
        let spec = flowcast_core::DiagramSpec::from_json_str("[").unwrap_err();
        assert_eq!(CliError::from(spec).exit_code(), 3);

        let io = CliError::ReadInput {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.exit_code(), 1);
        assert!(io.to_string().contains("missing.json"));
    }

    #[test]
    fn unreadable_config_aborts() {
        let err = CliError::from(flowcast::ConfigError::UnknownFormat(PathBuf::from("a.yaml")));
        assert_eq!(err.exit_code(), 1);
    }
}
