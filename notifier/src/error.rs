use std::io;

use http::StatusCode;
use thiserror::Error;

/// Enumeration of errors that end a single `report_error` call.
/// Each variant maps to the stage that produced it; nothing after that stage runs.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("couldn't get trace: no resolvable frame at stack offset {offset}")]
    TraceUnavailable { offset: usize },
    #[error("json encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] MalformedRequestError),
    #[error("error making HTTP request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("notice was not accepted, service responded with {status}")]
    UnexpectedStatus { status: StatusCode },
}

impl ReportError {
    /// A stable, low-cardinality name for this error, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::TraceUnavailable { .. } => "trace_unavailable",
            ReportError::Encoding(_) => "encoding",
            ReportError::MalformedRequest(_) => "malformed_request",
            ReportError::Transport(_) => "transport",
            ReportError::UnexpectedStatus { .. } => "unexpected_status",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ReportError::Transport(error) if error.is_timeout())
    }
}

/// Reasons a notice request could not be constructed before any network I/O.
#[derive(Error, Debug)]
pub enum MalformedRequestError {
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api key is not a valid header value")]
    ApiKey(#[from] reqwest::header::InvalidHeaderValue),
    #[error("could not build request: {0}")]
    Build(#[source] reqwest::Error),
}

/// Errors raised while setting up a `Connection`, before any notice is reported.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] envconfig::Error),
    #[error("couldn't read the current directory: {0}")]
    WorkingDirectory(#[source] io::Error),
    #[error("couldn't determine the hostname")]
    Hostname,
    #[error("failed to construct http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
