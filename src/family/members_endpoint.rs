//! Defines the endpoint for listing the members of the logged in user's family.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    family::get_family_members,
    user::{User, UserID, get_user_by_id},
};

/// The state needed to list family members.
#[derive(Debug, Clone)]
pub struct FamilyMembersState {
    /// The database connection for reading users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FamilyMembersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A family member as returned by the members endpoint.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberResponse {
    /// The member's user ID.
    pub user_id: UserID,
    /// The member's display name.
    pub name: String,
    /// The member's email address.
    pub email: String,
}

impl From<User> for FamilyMemberResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// A route handler for listing the members of the logged in user's family.
///
/// The members are ordered by name and do not include password hashes.
pub async fn get_family_members_endpoint(
    State(state): State<FamilyMembersState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<FamilyMemberResponse>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = get_user_by_id(user_id, &connection)?;
    let members = get_family_members(user.family_id, &connection)?;

    Ok(Json(
        members.into_iter().map(FamilyMemberResponse::from).collect(),
    ))
}

#[cfg(test)]
mod family_members_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        db::initialize,
        family::create_family,
        user::create_user,
    };

    use super::{FamilyMemberResponse, FamilyMembersState, get_family_members_endpoint};

    fn get_test_state() -> FamilyMembersState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        FamilyMembersState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn lists_only_the_requesting_users_family() {
        let state = get_test_state();
        let (edward, elinor) = {
            let connection = state.db_connection.lock().unwrap();
            let family = create_family("Ferrars", &connection).unwrap();
            let other_family = create_family("Steele", &connection).unwrap();

            let edward = create_user(
                "edward@example.com",
                "Edward",
                family.id,
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap();
            let elinor = create_user(
                "elinor@example.com",
                "Elinor",
                family.id,
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap();
            create_user(
                "lucy@example.com",
                "Lucy",
                other_family.id,
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap();

            (edward, elinor)
        };

        let response = get_family_members_endpoint(State(state), Extension(edward.id))
            .await
            .unwrap();

        let want = vec![
            FamilyMemberResponse::from(edward),
            FamilyMemberResponse::from(elinor),
        ];
        assert_eq!(response.0, want);
    }

    #[tokio::test]
    async fn serializes_members_with_camel_case_fields() {
        let state = get_test_state();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let family = create_family("Ferrars", &connection).unwrap();

            create_user(
                "edward@example.com",
                "Edward",
                family.id,
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap()
        };

        let response = get_family_members_endpoint(State(state), Extension(user.id))
            .await
            .unwrap();

        let json = serde_json::to_value(&response.0).unwrap();
        let want = serde_json::json!([{
            "userId": user.id.as_i64(),
            "name": "Edward",
            "email": "edward@example.com",
        }]);
        assert_eq!(json, want);
    }
}
