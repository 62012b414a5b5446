//! The log in endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::cookie::set_auth_cookie,
    user::get_user_by_email,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub(crate) const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a log in.
#[derive(Debug, Clone)]
pub struct LogInState {
    cookie_key: Key,
    cookie_duration: Duration,
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data in the log in request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInData {
    /// Email entered during log in.
    pub email: String,
    /// Password entered during log in.
    pub password: String,
    /// Whether to stay logged in for a week rather than the default session
    /// length.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log in requests via the POST method.
///
/// On success the auth cookie is set and a 204 response returned. The email
/// is lowercased before the lookup, matching how registration stores it.
///
/// # Errors
///
/// This function will return an error in several cases:
/// - the request body was not valid JSON ([Error::InvalidInput]).
/// - the email is unknown or the password is wrong
///   ([Error::InvalidCredentials]).
/// - an internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    payload: Result<Json<LogInData>, JsonRejection>,
) -> Result<(PrivateCookieJar, StatusCode), Error> {
    let Json(user_data) = payload.map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;

    let email = user_data.email.trim().to_lowercase();

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    // Report unknown emails the same way as wrong passwords so the endpoint
    // cannot be used to discover which email addresses are registered.
    let user = get_user_by_email(&email, &connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCredentials,
        error => error,
    })?;

    let is_password_valid = user
        .password_hash
        .verify(&user_data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if user_data.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };
    let jar = set_auth_cookie(jar, user.id, cookie_duration)?;

    Ok((jar, StatusCode::NO_CONTENT))
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error, PasswordHash,
        auth::cookie::{DEFAULT_COOKIE_DURATION, get_token_from_cookies},
        db::initialize,
        family::create_family,
        user::{User, create_user},
    };

    use super::{LogInData, LogInState, REMEMBER_ME_COOKIE_DURATION, post_log_in};

    const TEST_PASSWORD: &str = "averystrongandsecurepassword";

    fn get_test_state() -> (LogInState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let family = create_family("Ferrars", &connection).unwrap();
        let user = create_user(
            "edward@example.com",
            "Edward",
            family.id,
            PasswordHash::from_raw_password(TEST_PASSWORD, 4).unwrap(),
            &connection,
        )
        .unwrap();

        let hash = Sha512::digest(b"foobar");
        let state = LogInState {
            cookie_key: Key::from(&hash),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user)
    }

    fn get_jar(state: &LogInState) -> PrivateCookieJar {
        PrivateCookieJar::new(state.cookie_key.clone())
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {:?}, want {:?}",
            left,
            right
        );
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let (state, user) = get_test_state();
        let jar = get_jar(&state);
        let data = LogInData {
            email: "edward@example.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
            remember_me: false,
        };

        let (jar, status) = post_log_in(State(state), jar, Ok(Json(data))).await.unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.user_id, user.id);
        assert_date_time_close(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION,
        );
    }

    #[tokio::test]
    async fn log_in_with_remember_me_sets_week_long_cookie() {
        let (state, _) = get_test_state();
        let jar = get_jar(&state);
        let data = LogInData {
            email: "edward@example.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
            remember_me: true,
        };

        let (jar, _) = post_log_in(State(state), jar, Ok(Json(data))).await.unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert_date_time_close(
            token.expires_at,
            OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION,
        );
    }

    #[tokio::test]
    async fn log_in_accepts_mixed_case_email() {
        let (state, user) = get_test_state();
        let jar = get_jar(&state);
        let data = LogInData {
            email: "Edward@Example.COM".to_owned(),
            password: TEST_PASSWORD.to_owned(),
            remember_me: false,
        };

        let (jar, status) = post_log_in(State(state), jar, Ok(Json(data))).await.unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.user_id, user.id);
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let (state, _) = get_test_state();
        let jar = get_jar(&state);
        let data = LogInData {
            email: "edward@example.com".to_owned(),
            password: "notthepassword".to_owned(),
            remember_me: false,
        };

        let result = post_log_in(State(state), jar, Ok(Json(data))).await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let (state, _) = get_test_state();
        let jar = get_jar(&state);
        let data = LogInData {
            email: "marianne@example.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
            remember_me: false,
        };

        let result = post_log_in(State(state), jar, Ok(Json(data))).await;

        // Unknown emails must be indistinguishable from wrong passwords.
        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }
}
