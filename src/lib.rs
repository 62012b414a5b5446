//! Patrimoine is a self-hosted register for tracking a family's wealth: who
//! owns which assets, in what proportions, and what they are worth.
//!
//! This library provides a JSON REST API backed by an embedded SQLite
//! database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod asset;
mod auth;
mod db;
mod endpoints;
mod family;
mod logging;
mod password;
mod register_user;
mod routing;
mod user;

pub use app_state::AppState;
pub use asset::{
    AssetCategory, AssetDetail, AssetId, BankAccountDetail, BusinessDetail, InvestmentDetail,
    OtherDetail, OwnerShare, RealEstateDetail, VehicleDetail, create_asset,
};
pub use db::initialize as initialize_db;
pub use family::{Family, FamilyId, create_family};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserID, create_user, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body could not be parsed into the expected shape.
    ///
    /// Holds a description of what was wrong with the request, suitable for
    /// returning to the client.
    #[error("{0}")]
    InvalidInput(String),

    /// A required text field was empty or contained only whitespace.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A monetary amount was NaN or infinite.
    ///
    /// Amounts are stored as SQLite REAL columns, so non-finite values would
    /// silently corrupt valuation totals if they were let through.
    #[error("{0} must be a finite number")]
    NonFiniteAmount(&'static str),

    /// The user provided an invalid email and password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token cookie could not be parsed, or has expired.
    #[error("the auth token is invalid or has expired")]
    InvalidAuthToken,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address used to register already belongs to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The family ID used to register did not match an existing family.
    #[error("the family with ID {0} could not be found")]
    FamilyNotFound(FamilyId),

    /// An asset was submitted with an empty owners list.
    #[error("an asset must have at least one owner")]
    NoOwners,

    /// An ownership percentage was outside the range [0, 100].
    #[error("ownership percentage {0} is outside the range [0, 100]")]
    PercentageOutOfRange(f64),

    /// The same user appeared more than once in an asset's owners list.
    #[error("user {0:?} appears more than once in the owners list")]
    DuplicateOwner(UserID),

    /// The ownership percentages of an asset did not sum to 100.
    ///
    /// Holds the sum that was actually submitted.
    #[error("ownership percentages sum to {0}, expected exactly 100")]
    OwnershipSumInvalid(f64),

    /// One or more owners of an asset do not belong to the creating user's
    /// family.
    ///
    /// Holds the IDs of the offending users so the client can point at the
    /// rows that need fixing.
    #[error("users {0:?} are not members of your family")]
    OwnerNotInFamily(Vec<UserID>),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An asset row exists but its category-specific detail row is missing.
    ///
    /// Details are written in the same transaction as the asset, so this
    /// indicates either a bug or outside tampering with the database.
    #[error("asset {0} has no {1} detail row")]
    DetailMissing(AssetId, AssetCategory),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// A write was given an invalid foreign key, e.g. an owner that was
    /// removed between validation and insert.
    #[error("a referenced row does not exist")]
    InvalidForeignKey,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidForeignKey
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The machine-readable category reported to API clients in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_)
            | Error::EmptyField(_)
            | Error::NonFiniteAmount(_)
            | Error::TooWeak(_)
            | Error::DuplicateEmail
            | Error::FamilyNotFound(_)
            | Error::NoOwners
            | Error::PercentageOutOfRange(_)
            | Error::DuplicateOwner(_) => "InvalidInput",
            Error::OwnershipSumInvalid(_) => "OwnershipSumInvalid",
            Error::OwnerNotInFamily(_) => "OwnerNotInFamily",
            Error::InvalidCredentials | Error::CookieMissing | Error::InvalidAuthToken => {
                "Unauthenticated"
            }
            Error::NotFound => "NotFound",
            Error::DetailMissing(_, _) => "DetailMissing",
            Error::InvalidForeignKey | Error::SqlError(_) | Error::DatabaseLockError => {
                "PersistenceFailed"
            }
            Error::HashingError(_) | Error::JSONSerializationError(_) => "Internal",
        }
    }

    /// The HTTP status code that this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_)
            | Error::EmptyField(_)
            | Error::NonFiniteAmount(_)
            | Error::TooWeak(_)
            | Error::DuplicateEmail
            | Error::FamilyNotFound(_)
            | Error::NoOwners
            | Error::PercentageOutOfRange(_)
            | Error::DuplicateOwner(_)
            | Error::OwnershipSumInvalid(_)
            | Error::OwnerNotInFamily(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::CookieMissing | Error::InvalidAuthToken => {
                StatusCode::UNAUTHORIZED
            }
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DetailMissing(_, _)
            | Error::InvalidForeignKey
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::HashingError(_)
            | Error::JSONSerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        // Server-side faults are not intended to be shown to the client.
        let message = if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "kind": self.kind(),
            "message": message,
        }));

        (status_code, body).into_response()
    }
}
