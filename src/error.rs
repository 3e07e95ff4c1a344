use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Transport and decoding failures talking to the estimation backend.
///
/// Application-level failures (a body whose `status` is not `"ok"`) are not
/// errors here; the controller inspects the decoded body for those.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid API base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("JSON parse error from {endpoint}: {source}")]
    Json {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode chart '{target}': {source}")]
    Encode {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("display channel closed")]
    Closed,
}
