use hyper::{Method, StatusCode};
use stack_string::StackString;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("{method} {path} failed with {status}: {body}")]
    Api {
        method: Method,
        path: StackString,
        status: StatusCode,
        body: StackString,
    },
}

impl DriveError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Api { status, .. } => *status,
        }
    }

    /// Client errors other than 429 will fail the same way on every attempt.
    pub fn is_permanent(&self) -> bool {
        let status = self.status();
        status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS
    }
}

#[cfg(test)]
mod tests {
    use hyper::{Method, StatusCode};

    use crate::errors::DriveError;

    fn api_error(status: StatusCode) -> DriveError {
        DriveError::Api {
            method: Method::GET,
            path: "/drive/v3/files/abc".into(),
            status,
            body: "{}".into(),
        }
    }

    #[test]
    fn test_is_permanent() {
        assert!(api_error(StatusCode::NOT_FOUND).is_permanent());
        assert!(api_error(StatusCode::FORBIDDEN).is_permanent());
        assert!(!api_error(StatusCode::TOO_MANY_REQUESTS).is_permanent());
        assert!(!api_error(StatusCode::INTERNAL_SERVER_ERROR).is_permanent());
        assert_eq!(
            api_error(StatusCode::NOT_FOUND).to_string(),
            "GET /drive/v3/files/abc failed with 404 Not Found: {}"
        );
    }
}
