// Error taxonomy for a single upload. Every variant is terminal: the
// binary prints it once and exits non-zero.

use std::path::PathBuf;

use reqwest::StatusCode;

use crate::config::UsageError;

/// Errors that can occur while removing the background of one image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file could not be opened.
    #[error("open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input file was opened but reading it failed.
    #[error("read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Building the HTTP client or the multipart body failed.
    #[error("build request: {0}")]
    Request(String),

    /// The request never produced a complete response (DNS, TLS, connect,
    /// timeout, or reading the body).
    #[error("http post: {}", transport_message(.0))]
    Transport(#[source] reqwest::Error),

    /// The service answered with something other than 200.
    #[error("{} {}\n{}", .status.as_u16(), .status.canonical_reason().unwrap_or(""), .body)]
    Status { status: StatusCode, body: String },

    /// The response could not be written to the destination.
    #[error("write output file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Required configuration was missing or malformed.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl Error {
    /// Process exit code for this error: 2 for usage problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => 2,
            _ => 1,
        }
    }

    /// Whether the request hit the client-side timeout. The server may still
    /// have processed the image in that case.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(e) if e.is_timeout())
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out (the server may still have processed the image): {err}")
    } else {
        err.to_string()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
