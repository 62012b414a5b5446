//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash, family::FamilyId};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// Every user belongs to exactly one family, which scopes the assets they can
/// see and the owners they can assign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The ID of the family the user belongs to.
    pub family_id: FamilyId,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// A user summary as returned by the API. Never includes the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user's ID.
    pub user_id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email address the user logs in with.
    pub email: String,
    /// The ID of the family the user belongs to.
    pub family_id: FamilyId,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            family_id: user.family_id,
        }
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                password TEXT NOT NULL,
                family_id INTEGER NOT NULL REFERENCES family(id),
                created_at TEXT NOT NULL,
                deleted_at TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` already belongs to a registered user ([Error::DuplicateEmail]).
/// - an SQL related error occurred ([Error::SqlError]).
pub fn create_user(
    email: &str,
    name: &str,
    family_id: FamilyId,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, name, password, family_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            email,
            name,
            password_hash.to_string(),
            family_id,
            OffsetDateTime::now_utc(),
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_string(),
        name: name.to_string(),
        family_id,
        password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, email, name, password, family_id FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row_to_user)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email equal to `email`.
///
/// Users that have been removed from their family (soft-deleted) are treated
/// as absent so they can no longer log in.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(
            "SELECT id, email, name, password, family_id FROM user \
             WHERE email = :email AND deleted_at IS NULL",
        )?
        .query_row(&[(":email", &email)], map_row_to_user)
        .map_err(|error| error.into())
}

pub(crate) fn map_row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let email = row.get(1)?;
    let name = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let family_id = row.get(4)?;

    Ok(User {
        id: UserID::new(raw_id),
        email,
        name,
        family_id,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        family::{create_family, create_family_table},
        user::{UserID, create_user, get_user_by_email, get_user_by_id},
    };

    use super::{Error, create_user_table};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_family_table(&conn).expect("Could not create family table");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let family = create_family("Tester Family", &db_connection).unwrap();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user = create_user(
            "tester@example.com",
            "Tester",
            family.id,
            password_hash.clone(),
            &db_connection,
        )
        .unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "tester@example.com");
        assert_eq!(inserted_user.name, "Tester");
        assert_eq!(inserted_user.family_id, family.id);
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_with_duplicate_email() {
        let db_connection = get_db_connection();
        let family = create_family("Tester Family", &db_connection).unwrap();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        create_user(
            "tester@example.com",
            "Tester",
            family.id,
            password_hash.clone(),
            &db_connection,
        )
        .unwrap();

        let duplicate = create_user(
            "tester@example.com",
            "Tester Again",
            family.id,
            password_hash,
            &db_connection,
        );

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let family = create_family("Tester Family", &db_connection).unwrap();
        let test_user = create_user(
            "tester@example.com",
            "Tester",
            family.id,
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_succeeds_with_existing_email() {
        let db_connection = get_db_connection();
        let family = create_family("Tester Family", &db_connection).unwrap();
        let test_user = create_user(
            "tester@example.com",
            "Tester",
            family.id,
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_email("tester@example.com", &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_fails_with_unknown_email() {
        let db_connection = get_db_connection();

        assert_eq!(
            get_user_by_email("nobody@example.com", &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_by_email_excludes_soft_deleted_users() {
        let db_connection = get_db_connection();
        let family = create_family("Tester Family", &db_connection).unwrap();
        let test_user = create_user(
            "tester@example.com",
            "Tester",
            family.id,
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        db_connection
            .execute(
                "UPDATE user SET deleted_at = datetime('now') WHERE id = ?1",
                (test_user.id.as_i64(),),
            )
            .unwrap();

        assert_eq!(
            get_user_by_email("tester@example.com", &db_connection),
            Err(Error::NotFound)
        );
    }
}
