#![forbid(unsafe_code)]

//! flowcast error model and graceful degradation.
//!
//! The layout, particle and narrative paths never fail on data; they clamp
//! and drop. Errors exist only at adapter boundaries (parsing content,
//! loading configuration, sizing a surface), and each maps to a
//! [`DegradationAction`] so a host can keep the view alive.

use std::fmt;
use std::path::PathBuf;

use flowcast_core::SpecError;
use flowcast_render::SurfaceError;
use flowcast_web::RunnerError;

// ── Domain-Specific Error Types ─────────────────────────────────────────

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The text is not valid for its format.
    Parse { format: &'static str, message: String },
    /// The file extension names no known format.
    UnknownFormat(PathBuf),
    /// Parsed, but values are out of range.
    Invalid(Vec<String>),
}

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for flowcast adapters.
#[derive(Debug)]
pub enum Error {
    /// Diagram or script content could not be decoded.
    Spec(SpecError),
    Config(ConfigError),
    /// Viewport or pixel ratio rejected by the render surface.
    Surface(SurfaceError),
    Io(std::io::Error),
}

/// Standard result type for flowcast APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What the host should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Keep showing the previous content.
    KeepPrevious,
    /// Render with what is valid; defaults fill the rest.
    RenderPartial,
    /// Skip this frame and try again on the next.
    SkipFrame,
    /// Unrecoverable; stop.
    Abort,
}

impl Error {
    #[must_use]
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Spec(SpecError::Json(_)) => DegradationAction::KeepPrevious,

            Self::Config(ConfigError::Parse { .. }) => DegradationAction::KeepPrevious,
            Self::Config(ConfigError::Invalid(_)) => DegradationAction::RenderPartial,
            Self::Config(ConfigError::Io { .. } | ConfigError::UnknownFormat(_)) => {
                DegradationAction::Abort
            }

            Self::Surface(SurfaceError::InvalidViewport { .. }) => DegradationAction::SkipFrame,
            Self::Surface(SurfaceError::InvalidPixelRatio(_)) => DegradationAction::SkipFrame,

            Self::Io(_) => DegradationAction::Abort,
        }
    }

    /// Error type label for logs.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Spec(_) => "spec",
            Self::Config(_) => "config",
            Self::Surface(_) => "surface",
            Self::Io(_) => "io",
        }
    }

    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::Abort)
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse { format, message } => write!(f, "invalid {format} config: {message}"),
            Self::UnknownFormat(path) => {
                write!(f, "unknown config format for {} (expected .toml or .json)", path.display())
            }
            Self::Invalid(problems) => write!(f, "invalid config: {}", problems.join("; ")),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Surface(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "I/O: {err}"),
        }
    }
}

impl fmt::Display for DegradationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepPrevious => write!(f, "keep_previous"),
            Self::RenderPartial => write!(f, "render_partial"),
            Self::SkipFrame => write!(f, "skip_frame"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Surface(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<SpecError> for Error {
    fn from(err: SpecError) -> Self {
        Self::Spec(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<SurfaceError> for Error {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<RunnerError> for Error {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Spec(e) => Self::Spec(e),
            RunnerError::Surface(e) => Self::Surface(e),
            RunnerError::Config(message) => Self::Config(ConfigError::Parse {
                format: "json",
                message,
            }),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
