use rusqlite::Connection;

use crate::{
    Error,
    user::{User, map_row_to_user},
};

/// An alias for integer family IDs.
pub type FamilyId = i64;

/// A group of users that share visibility of each other's assets.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    /// The id for the family.
    pub id: FamilyId,
    /// The name the family registered with, e.g. a surname.
    pub name: String,
}

pub fn create_family_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS family (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new family into the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn create_family(name: &str, connection: &Connection) -> Result<Family, Error> {
    connection.execute("INSERT INTO family (name) VALUES (?1)", (name,))?;

    let id = connection.last_insert_rowid();

    Ok(Family {
        id,
        name: name.to_string(),
    })
}

/// Get the family from the database with an ID equal to `family_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `family_id` does not belong to a registered family.
/// - there was an error trying to access the store.
pub fn get_family_by_id(family_id: FamilyId, connection: &Connection) -> Result<Family, Error> {
    connection
        .prepare("SELECT id, name FROM family WHERE id = :id")?
        .query_row(&[(":id", &family_id)], |row| {
            Ok(Family {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .map_err(|error| error.into())
}

/// Get all active users belonging to the family with an ID equal to
/// `family_id`, ordered by name. Members that were removed from the family
/// (soft-deleted) are not returned.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_family_members(
    family_id: FamilyId,
    connection: &Connection,
) -> Result<Vec<User>, Error> {
    connection
        .prepare(
            "SELECT id, email, name, password, family_id FROM user \
             WHERE family_id = :family_id AND deleted_at IS NULL ORDER BY name",
        )?
        .query_map(&[(":family_id", &family_id)], map_row_to_user)?
        .map(|row_result| row_result.map_err(|error| error.into()))
        .collect()
}

#[cfg(test)]
mod family_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        user::{create_user, create_user_table},
    };

    use super::{create_family, create_family_table, get_family_by_id, get_family_members};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_family_table(&conn).expect("Could not create family table");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_family_succeeds() {
        let db_connection = get_db_connection();

        let family = create_family("Ferrars", &db_connection).unwrap();

        assert!(family.id > 0);
        assert_eq!(family.name, "Ferrars");
    }

    #[test]
    fn get_family_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        assert_eq!(get_family_by_id(42, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_family_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let family = create_family("Ferrars", &db_connection).unwrap();

        let retrieved_family = get_family_by_id(family.id, &db_connection).unwrap();

        assert_eq!(retrieved_family, family);
    }

    #[test]
    fn get_family_members_only_returns_members() {
        let db_connection = get_db_connection();
        let family = create_family("Ferrars", &db_connection).unwrap();
        let other_family = create_family("Steele", &db_connection).unwrap();

        let edward = create_user(
            "edward@example.com",
            "Edward",
            family.id,
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();
        let elinor = create_user(
            "elinor@example.com",
            "Elinor",
            family.id,
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();
        create_user(
            "lucy@example.com",
            "Lucy",
            other_family.id,
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let members = get_family_members(family.id, &db_connection).unwrap();

        assert_eq!(members, vec![edward, elinor]);
    }

    #[test]
    fn get_family_members_returns_empty_list_for_empty_family() {
        let db_connection = get_db_connection();
        let family = create_family("Ferrars", &db_connection).unwrap();

        let members = get_family_members(family.id, &db_connection).unwrap();

        assert_eq!(members, Vec::new());
    }

    #[test]
    fn get_family_members_excludes_soft_deleted_members() {
        let db_connection = get_db_connection();
        let family = create_family("Ferrars", &db_connection).unwrap();

        let edward = create_user(
            "edward@example.com",
            "Edward",
            family.id,
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();
        let lucy = create_user(
            "lucy@example.com",
            "Lucy",
            family.id,
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        db_connection
            .execute(
                "UPDATE user SET deleted_at = datetime('now') WHERE id = ?1",
                (lucy.id.as_i64(),),
            )
            .unwrap();

        let members = get_family_members(family.id, &db_connection).unwrap();

        assert_eq!(members, vec![edward]);
    }
}
