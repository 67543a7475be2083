//! Change detection errors

use thiserror::Error;

/// Error types for change detection
#[derive(Debug, Error)]
pub enum ChangeSourceError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git diff against {base} exited with code {code}: {stderr}")]
    Exit {
        base: String,
        code: i32,
        stderr: String,
    },

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("git output is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}
