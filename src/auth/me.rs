//! The endpoint reporting who the authenticated user is.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    user::{UserID, UserResponse, get_user_by_id},
};

/// The state needed to look up the authenticated user.
#[derive(Debug, Clone)]
pub struct MeState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A handler returning a summary of the authenticated user.
///
/// # Errors
///
/// This function will return an error if the user no longer exists or the
/// app state could not acquire a database lock.
pub async fn get_me_endpoint(
    State(state): State<MeState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<UserResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod me_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        PasswordHash, db::initialize, family::create_family, user::create_user,
    };

    use super::{MeState, get_me_endpoint};

    #[tokio::test]
    async fn get_me_returns_the_user_summary_without_the_password() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let family = create_family("Ferrars", &connection).unwrap();
        let user = create_user(
            "edward@example.com",
            "Edward",
            family.id,
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let state = MeState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_me_endpoint(State(state), Extension(user.id))
            .await
            .unwrap();

        let got = serde_json::to_value(&response.0).unwrap();
        assert_eq!(
            got,
            json!({
                "userId": user.id.as_i64(),
                "name": "Edward",
                "email": "edward@example.com",
                "familyId": family.id,
            })
        );
    }
}
