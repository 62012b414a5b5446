//! Database setup for the application.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    asset::{create_asset_table, create_detail_tables, create_ownership_table},
    family::create_family_table,
    user::create_user_table,
};

/// Create the application tables if they do not exist, and turn on foreign
/// key enforcement for `connection`.
///
/// The tables are created in one exclusive transaction so concurrent callers
/// cannot observe a half-initialized schema.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // SQLite does not enforce foreign keys unless this pragma is set, and the
    // pragma is a no-op inside a transaction, so it must run first.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_family_table(&transaction)?;
    create_user_table(&transaction)?;
    create_asset_table(&transaction)?;
    create_detail_tables(&transaction)?;
    create_ownership_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
