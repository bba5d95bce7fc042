use oauth2::basic::BasicErrorResponseType;
use oauth2::{RequestTokenError, StandardErrorResponse};

#[derive(thiserror::Error, Debug)]
pub enum HttpError {
    #[error("hyper {0}")]
    Hyper(#[from] hyper::Error),
    #[error("hyper http {0}")]
    HyperHttp(#[from] hyper::http::Error),
    #[error("invalid uri {0}")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),
    #[error("invalid header value {0}")]
    InvalidHeader(#[from] hyper::http::header::InvalidHeaderValue),
    #[error("invalid dns name {0}")]
    InvalidDnsName(String),
    #[error("unsupported url {0}")]
    UnsupportedUrl(String),
    #[error("oauth2 http conversion {0}")]
    Oauth2Conversion(String),
    #[error("io {0}")]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum TargetError {
    #[error("request token error: {0}")]
    RequestToken(#[from] RequestTokenError<HttpError, StandardErrorResponse<BasicErrorResponseType>>),
    #[error("oauth error: {0}")]
    Oauth2Parse(#[from] oauth2::url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("invalid json from {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}
