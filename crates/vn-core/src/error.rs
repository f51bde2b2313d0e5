//! Unified error type for the vidnorm pipeline.
//!
//! All crates funnel their failures into [`Error`]. The two fatal pipeline
//! outcomes are [`Error::Probe`] and [`Error::Transcode`]; the remaining
//! variants describe infrastructure problems (tool plumbing, scratch space,
//! configuration).

/// Unified error type covering all failure modes in vidnorm.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The inspection tool could not read or parse the input.
    #[error("Probe error: {0}")]
    Probe(String),

    /// The encoding tool failed. `message` carries the tool's diagnostic
    /// output.
    #[error("Transcode error: {message}")]
    Transcode {
        /// Diagnostic text reported by the encoder.
        message: String,
    },

    /// An external tool could not be spawned, timed out, or exited non-zero.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The per-invocation scratch area could not be prepared.
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Configuration failed validation or could not be parsed.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Map this error to the HTTP status an upload endpoint should answer
    /// with.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Probe(_) => 422,
            Error::Transcode { .. } => 502,
            Error::Tool { .. } => 502,
            Error::Workspace(_) => 500,
            Error::Io { .. } => 500,
            Error::Validation(_) => 400,
        }
    }

    /// Whether the failure was caused by the uploaded content rather than by
    /// the host environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Probe(_))
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Transcode`].
    pub fn transcode(message: impl Into<String>) -> Self {
        Error::Transcode {
            message: message.into(),
        }
    }

    /// Strip the variant prefix and return the inner message. Used when a
    /// lower-level error is re-classified into a pipeline error.
    pub fn into_message(self) -> String {
        match self {
            Error::Probe(m)
            | Error::Workspace(m)
            | Error::Validation(m) => m,
            Error::Transcode { message } => message,
            Error::Tool { tool, message } => format!("{tool}: {message}"),
            Error::Io { source } => source.to_string(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_display() {
        let err = Error::Probe("Invalid data found when processing input".into());
        assert_eq!(
            err.to_string(),
            "Probe error: Invalid data found when processing input"
        );
        assert_eq!(err.http_status(), 422);
        assert!(err.is_input_error());
    }

    #[test]
    fn transcode_display() {
        let err = Error::transcode("Unknown encoder 'libx264'");
        assert_eq!(err.to_string(), "Transcode error: Unknown encoder 'libx264'");
        assert_eq!(err.http_status(), 502);
        assert!(!err.is_input_error());
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("ffmpeg", "exit code 1");
        assert_eq!(err.to_string(), "Tool error [ffmpeg]: exit code 1");
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("bad json".into());
        assert_eq!(err.to_string(), "Validation error: bad json");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn into_message_drops_prefix() {
        assert_eq!(Error::Probe("x".into()).into_message(), "x");
        assert_eq!(Error::transcode("y").into_message(), "y");
        assert_eq!(
            Error::tool("ffprobe", "timed out after 1s").into_message(),
            "ffprobe: timed out after 1s"
        );
    }
}
