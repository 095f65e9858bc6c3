use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Missing required parameters: user and validUntilBlock are required")]
    MissingParams,
    #[error("Invalid user address format")]
    InvalidUserAddress,
    #[error("Invalid inviter address format")]
    InvalidInviterAddress,
    #[error("validUntilBlock must be a positive number")]
    InvalidValidUntilBlock,
    #[error("Failed to sign message: {0}")]
    Signing(String),
    #[error("not found")]
    NotFound,
    #[error("{}", msg)]
    Custom { status: StatusCode, msg: String },
}

impl Error {
    pub fn custom<T: std::fmt::Display>(status: StatusCode, msg: T) -> Self {
        Error::Custom {
            status,
            msg: msg.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn build<E: ResponseError>(e: &E) -> HttpResponse {
        HttpResponse::build(e.status_code()).json(ErrorBody {
            error: e.to_string(),
        })
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingParams
            | Error::InvalidUserAddress
            | Error::InvalidInviterAddress
            | Error::InvalidValidUntilBlock => StatusCode::BAD_REQUEST,
            Error::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Custom { status, .. } => *status,
        }
    }

    fn error_response(&self) -> HttpResponse {
        ErrorBody::build(self)
    }
}
