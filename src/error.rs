use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::payments::PaymentError;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized - {0}")]
    Unauthorized(String),

    #[error("Unauthorized - Access token expired")]
    AccessTokenExpired,

    #[error("Unauthorized - Invalid access token")]
    InvalidToken(String),

    #[error("Access denied - Admin only")]
    Forbidden,

    #[error("Invalid email or password")]
    IncorrectCredentials,

    #[error("User already exists")]
    DuplicateEmail,

    #[error("{0}")]
    BadRequest(String),

    #[error("Coupon expired")]
    CouponExpired,

    #[error("Service unavailable - Database connection error")]
    ServiceUnavailable,

    #[error("A server error occurred")]
    DatabaseError,

    #[error("Payment provider error")]
    PaymentProvider(String),

    #[error("Provided data was malformed")]
    MalformedData,

    #[error("Unexpected error occurred")]
    UnexpectedError,

    #[error("Unexpected error occurred")]
    CryptoError(#[from] argon2::Error),
}

/// Body rendered for every failed request
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StoreError {
    /// Extra detail surfaced to the client next to the message
    fn detail(&self) -> Option<String> {
        match self {
            Self::InvalidToken(detail) | Self::PaymentProvider(detail) => Some(detail.clone()),
            Self::ServiceUnavailable => {
                Some("Cannot connect to database, please try again later".to_owned())
            }
            _ => None,
        }
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::DuplicateEmail | Self::IncorrectCredentials => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) | Self::AccessTokenExpired | Self::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) | Self::CouponExpired => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseError
            | Self::PaymentProvider(_)
            | Self::MalformedData
            | Self::UnexpectedError
            | Self::CryptoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.to_string(),
            error: self.detail(),
        })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> StoreError {
        use sqlx::Error::*;

        match e {
            RowNotFound => StoreError::NotFound("Resource not found".to_owned()),
            PoolTimedOut | PoolClosed | Io(_) | Tls(_) => {
                error!(err = ?e, "database is unreachable");
                StoreError::ServiceUnavailable
            }
            _ => {
                error!(err = ?e, "SQLx error occurred");
                StoreError::DatabaseError
            }
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> StoreError {
        use serde_json::error::Category::*;
        error!(err = ?e, "JSON Serde error occurred");

        match e.classify() {
            Syntax | Data | Eof => StoreError::MalformedData,
            Io => StoreError::UnexpectedError,
        }
    }
}

impl From<PaymentError> for StoreError {
    fn from(e: PaymentError) -> StoreError {
        error!(err = ?e, "payment provider call failed");
        match e {
            PaymentError::Provider { message, .. } => StoreError::PaymentProvider(message),
            PaymentError::Transport(message) => StoreError::PaymentProvider(message),
            PaymentError::MalformedResponse(_) => StoreError::MalformedData,
        }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> StoreError {
        error!(
            err = ?e,
            was_cancelled = e.is_cancelled(),
            did_panic = e.is_panic(),
            "Tokio task join error occurred"
        );
        StoreError::UnexpectedError
    }
}
