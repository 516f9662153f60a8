use crate::clients::{HttpStatusCode, StatusCode};
use snafu::Snafu;

/// The `Result` type returned by `clients`.
pub type Result<T> = std::result::Result<T, Error>;

/// The public error type returned by `clients`.
#[derive(Debug, Snafu)]
pub struct Error(InnerError);

/// The private error type returned by `clients`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum InnerError {
    #[snafu(display("Unable to build the HTTP client: {}", source))]
    ClientBuild { source: reqwest::Error },

    #[snafu(display("Invalid Kiali URL '{}': {}", url, source))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[snafu(display("Kiali URL '{}' cannot be used as a base for API paths", url))]
    CannotBeABase { url: String },

    #[snafu(display("Missing path parameter '{}' for '{}'", parameter, method))]
    MissingPathParameter { method: String, parameter: String },

    #[snafu(display("Unable to call '{}' at '{}': {}", method, url, source))]
    Request {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    #[snafu(display("Unable to read the response body of '{}': {}", method, source))]
    ReadBody {
        method: String,
        source: reqwest::Error,
    },

    #[snafu(display(
        "'{}' returned status {} but {} was expected: {}",
        method,
        status,
        expected,
        body
    ))]
    UnexpectedStatus {
        method: String,
        expected: u16,
        status: u16,
        body: String,
    },

    #[snafu(display("Unable to deserialize the response of '{}': {}", method, source))]
    Deserialize {
        method: String,
        source: serde_json::Error,
    },

    #[snafu(display("Missing '{}' in the response of '{}'", field, method))]
    MissingField { method: String, field: String },
}

impl HttpStatusCode for InnerError {
    fn status_code(&self) -> Option<StatusCode> {
        match self {
            InnerError::Request { source, .. } | InnerError::ReadBody { source, .. } => {
                source.status_code()
            }
            InnerError::UnexpectedStatus { status, .. } => StatusCode::from_u16(*status).ok(),
            InnerError::ClientBuild { .. }
            | InnerError::InvalidUrl { .. }
            | InnerError::CannotBeABase { .. }
            | InnerError::MissingPathParameter { .. }
            | InnerError::Deserialize { .. }
            | InnerError::MissingField { .. } => None,
        }
    }
}

impl HttpStatusCode for Error {
    fn status_code(&self) -> Option<StatusCode> {
        self.0.status_code()
    }
}
