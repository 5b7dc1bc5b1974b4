use reqwest::StatusCode;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    Cli(String),
    IO(std::io::Error),
    Reqwest(reqwest::Error),
    SerdeJson(serde_json::Error),
    Url(url::ParseError),
    TimeFormat(time::error::Format),
    TimeParse(time::error::Parse),
    InvalidInput(String),
    Unauthorized(String),
    NotFound(String),
    Api { status: StatusCode, message: String },
    Timeout(String),
    Generic(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Cli(err) => write!(f, "{}", err),
            Error::IO(err) => err.fmt(f),
            Error::Reqwest(err) => err.fmt(f),
            Error::SerdeJson(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
            Error::TimeFormat(err) => err.fmt(f),
            Error::TimeParse(err) => err.fmt(f),
            Error::InvalidInput(err) => write!(f, "{}", err),
            Error::Unauthorized(err) => write!(f, "{}", err),
            Error::NotFound(err) => write!(f, "{}", err),
            Error::Api { status, message } => write!(f, "{status}: {message}"),
            Error::Timeout(err) => write!(f, "{}", err),
            Error::Generic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<&str> for Error {
    fn from(str: &str) -> Self {
        Error::Generic(str.to_owned())
    }
}

impl From<String> for Error {
    fn from(str: String) -> Self {
        Error::Generic(str)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Error::Timeout(error.to_string());
        }
        Error::Reqwest(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerdeJson(error)
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::Url(error)
    }
}

impl From<time::error::Format> for Error {
    fn from(error: time::error::Format) -> Self {
        Error::TimeFormat(error)
    }
}

impl From<time::error::Parse> for Error {
    fn from(error: time::error::Parse) -> Self {
        Error::TimeParse(error)
    }
}

impl Error {
    /// Maps a non-success backend response to an error variant. The backend
    /// reports failures as `{"error": "..."}` or `{"message": "..."}`.
    pub fn from_response(status: StatusCode, body: &str) -> Error {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|it| {
                it.get("error")
                    .or_else(|| it.get("message"))
                    .and_then(|it| it.as_str())
                    .map(|it| it.to_string())
            })
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unexpected response status")
                        .to_string()
                } else {
                    body.trim().to_string()
                }
            });
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }
}

#[cfg(test)]
mod test {
    use super::Error;
    use reqwest::StatusCode;

    #[test]
    fn from_response_error_field() {
        let err = Error::from_response(StatusCode::BAD_REQUEST, r#"{"error": "Bad term"}"#);
        assert_eq!("400 Bad Request: Bad term", err.to_string());
    }

    #[test]
    fn from_response_message_field() {
        let err = Error::from_response(StatusCode::UNAUTHORIZED, r#"{"message": "Invalid"}"#);
        assert!(matches!(err, Error::Unauthorized(ref msg) if msg == "Invalid"));
    }

    #[test]
    fn from_response_empty_body() {
        let err = Error::from_response(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, Error::NotFound(ref msg) if msg == "Not Found"));
    }

    #[test]
    fn from_response_plain_text() {
        let err = Error::from_response(StatusCode::INTERNAL_SERVER_ERROR, "boom\n");
        assert!(matches!(err, Error::Api { ref message, .. } if message == "boom"));
    }
}
