//! Ownership shares: who owns an asset and in what proportion.
//!
//! Shares are validated before any database work, then checked against the
//! family roster in a single query. The percentages of an asset must cover
//! exactly 100% of it, within the configured tolerance.

use std::collections::HashSet;

use rusqlite::{Connection, params, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};

use crate::{Error, asset::AssetId, family::FamilyId, user::UserID};

/// One entry in the owners list of an asset creation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerShare {
    /// The owning user.
    pub user_id: UserID,
    /// The owner's share of the asset as a percentage in [0, 100].
    pub percentage: f64,
}

/// One owner of a stored asset, joined with the user's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetOwner {
    /// The owning user.
    pub user_id: UserID,
    /// The owner's display name.
    pub name: String,
    /// The owner's share of the asset as a percentage.
    pub percentage: f64,
}

/// Create the ownership table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_ownership_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS ownership (
            id INTEGER PRIMARY KEY,
            asset_id INTEGER NOT NULL REFERENCES asset(id),
            user_id INTEGER NOT NULL REFERENCES user(id),
            percentage REAL NOT NULL,
            UNIQUE(asset_id, user_id)
        )",
        (),
    )?;

    Ok(())
}

/// Check that `shares` is a well-formed division of an asset.
///
/// Rejects, in order: an empty list, percentages outside [0, 100] (NaN and
/// infinities fail this check too), the same user appearing twice, and a sum
/// that differs from 100 by more than `tolerance`.
///
/// `tolerance` comes from the server configuration and defaults to zero,
/// i.e. the sum must be exactly 100.
pub fn validate_shares(shares: &[OwnerShare], tolerance: f64) -> Result<(), Error> {
    if shares.is_empty() {
        return Err(Error::NoOwners);
    }

    for share in shares {
        if !(share.percentage >= 0.0 && share.percentage <= 100.0) {
            return Err(Error::PercentageOutOfRange(share.percentage));
        }
    }

    let mut seen = HashSet::new();
    for share in shares {
        if !seen.insert(share.user_id) {
            return Err(Error::DuplicateOwner(share.user_id));
        }
    }

    let sum: f64 = shares.iter().map(|share| share.percentage).sum();
    if (sum - 100.0).abs() > tolerance {
        return Err(Error::OwnershipSumInvalid(sum));
    }

    Ok(())
}

/// Check that every owner in `shares` is an active member of the family with
/// ID `family_id`. Members that were removed from the family (soft-deleted)
/// do not count.
///
/// Runs a single query for the whole list. Reads only, never writes.
///
/// # Errors
///
/// This function will return an error if:
/// - one or more owners are not members of the family
///   ([Error::OwnerNotInFamily] holding the offending IDs).
/// - there was an error trying to access the store.
pub fn verify_owners_in_family(
    family_id: FamilyId,
    shares: &[OwnerShare],
    connection: &Connection,
) -> Result<(), Error> {
    if shares.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; shares.len()].join(", ");
    let query = format!(
        "SELECT id FROM user \
         WHERE family_id = ? AND deleted_at IS NULL AND id IN ({placeholders})"
    );

    let mut query_params: Vec<Value> = Vec::with_capacity(shares.len() + 1);
    query_params.push(Value::from(family_id));
    for share in shares {
        query_params.push(Value::from(share.user_id.as_i64()));
    }

    let member_ids: HashSet<UserID> = connection
        .prepare(&query)?
        .query_map(params_from_iter(query_params), |row| {
            row.get(0).map(UserID::new)
        })?
        .collect::<Result<_, _>>()?;

    let missing: Vec<UserID> = shares
        .iter()
        .map(|share| share.user_id)
        .filter(|user_id| !member_ids.contains(user_id))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::OwnerNotInFamily(missing))
    }
}

/// Insert one ownership row per share for the asset with ID `asset_id`.
///
/// The caller is expected to run this inside the same transaction that
/// inserts the asset row.
///
/// # Errors
///
/// Returns a [Error::InvalidForeignKey] if a share names a user that does
/// not exist, or a [Error::SqlError] for any other SQL related error,
/// including a share naming the same user twice (unique constraint).
pub fn insert_owners(
    asset_id: AssetId,
    shares: &[OwnerShare],
    connection: &Connection,
) -> Result<(), Error> {
    for share in shares {
        connection.execute(
            "INSERT INTO ownership (asset_id, user_id, percentage) VALUES (?1, ?2, ?3)",
            params![asset_id, share.user_id.as_i64(), share.percentage],
        )?;
    }

    Ok(())
}

/// Get the owners of the asset with ID `asset_id`, largest share first.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_owners(asset_id: AssetId, connection: &Connection) -> Result<Vec<AssetOwner>, Error> {
    connection
        .prepare(
            "SELECT ownership.user_id, user.name, ownership.percentage
             FROM ownership
             INNER JOIN user ON user.id = ownership.user_id
             WHERE ownership.asset_id = ?1
             ORDER BY ownership.percentage DESC, user.name",
        )?
        .query_map(params![asset_id], |row| {
            Ok(AssetOwner {
                user_id: row.get(0).map(UserID::new)?,
                name: row.get(1)?,
                percentage: row.get(2)?,
            })
        })?
        .map(|row_result| row_result.map_err(|error| error.into()))
        .collect()
}
