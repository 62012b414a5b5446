//! The endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    family::{FamilyId, create_family, get_family_by_id},
    user::{UserResponse, create_user},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data in a registration request.
///
/// Exactly one of `family_name` and `family_id` must be set: the former
/// starts a new family for the user, the latter joins an existing one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    /// The display name of the new user.
    pub name: String,
    /// The email address the user will log in with.
    pub email: String,
    /// The password the user will log in with.
    pub password: String,
    /// The name of a new family to create for the user.
    pub family_name: Option<String>,
    /// The ID of an existing family the user joins.
    pub family_id: Option<FamilyId>,
}

/// Handler for registering a new user via the POST method.
///
/// On success the new user's summary is returned with status 201. Email
/// addresses are lowercased before they are stored, so later matching is
/// case-insensitive.
///
/// # Errors
///
/// This function will return an error in several cases:
/// - the request body was not valid JSON, the email is malformed, or the
///   family fields are not exactly one of `familyName` and `familyId`
///   ([Error::InvalidInput]).
/// - the password is too weak ([Error::TooWeak]).
/// - the email address is already registered ([Error::DuplicateEmail]).
/// - `familyId` refers to a family that does not exist
///   ([Error::FamilyNotFound]).
pub async fn register_user(
    State(state): State<RegistrationState>,
    payload: Result<Json<RegisterForm>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    let Json(user_data) = payload.map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;

    let name = user_data.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    let email = user_data.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(Error::EmptyField("email"));
    }
    if !email.contains('@') {
        return Err(Error::InvalidInput(format!(
            "{email} is not a valid email address"
        )));
    }

    let validated_password = ValidatedPassword::new(&user_data.password)?;
    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)?;

    let mut connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    // A rejected registration must not leave a new family behind.
    let transaction = connection.transaction()?;

    let family = match (&user_data.family_name, user_data.family_id) {
        (Some(family_name), None) => {
            let family_name = family_name.trim();
            if family_name.is_empty() {
                return Err(Error::EmptyField("familyName"));
            }

            create_family(family_name, &transaction)?
        }
        (None, Some(family_id)) => {
            get_family_by_id(family_id, &transaction).map_err(|error| match error {
                Error::NotFound => Error::FamilyNotFound(family_id),
                error => error,
            })?
        }
        _ => {
            return Err(Error::InvalidInput(
                "exactly one of familyName and familyId must be set".to_owned(),
            ));
        }
    };

    let user = create_user(&email, name, family.id, password_hash, &transaction)?;
    transaction.commit()?;

    Ok((StatusCode::CREATED, Json(user.into())))
}
