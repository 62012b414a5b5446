use rusqlite::{Connection, params};
use time::OffsetDateTime;

use crate::{
    Error,
    asset::{
        AssetCategory, AssetDetail,
        detail::insert_detail,
        ownership::{OwnerShare, insert_owners, validate_shares, verify_owners_in_family},
    },
    family::FamilyId,
};

/// An alias for integer asset IDs.
pub type AssetId = i64;

/// The category-independent part of a stored asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// The id for the asset.
    pub id: AssetId,
    /// The family whose members own the asset.
    pub family_id: FamilyId,
    /// Which detail table holds the rest of the asset.
    pub category: AssetCategory,
    /// When the asset was registered.
    pub created_at: OffsetDateTime,
    /// When the asset was last changed.
    pub updated_at: OffsetDateTime,
}

/// Create the asset table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_asset_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS asset (
            id INTEGER PRIMARY KEY,
            family_id INTEGER NOT NULL REFERENCES family(id),
            category TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_asset(row: &rusqlite::Row) -> Result<Asset, rusqlite::Error> {
    Ok(Asset {
        id: row.get(0)?,
        family_id: row.get(1)?,
        category: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Create an asset for the family with ID `family_id`.
///
/// This is the full creation workflow: validate the detail fields, validate
/// the ownership shares, check every owner belongs to the family, then
/// persist the asset atomically. `tolerance` is the allowed deviation of the
/// share sum from 100.
///
/// # Errors
///
/// This function will return an error if:
/// - a detail field is empty or non-finite.
/// - the shares are empty, out of range, duplicated or do not sum to 100.
/// - an owner does not belong to the family ([Error::OwnerNotInFamily]).
/// - the transaction could not be committed ([Error::SqlError]).
pub fn create_asset(
    family_id: FamilyId,
    detail: &AssetDetail,
    owners: &[OwnerShare],
    tolerance: f64,
    connection: &mut Connection,
) -> Result<AssetId, Error> {
    detail.validate()?;
    validate_shares(owners, tolerance)?;
    verify_owners_in_family(family_id, owners, connection)?;

    persist_asset(family_id, detail, owners, connection)
}

/// Insert the asset row, its detail row and its ownership rows in a single
/// transaction.
///
/// Either every row is written or none are: any failure rolls the
/// transaction back when it is dropped.
///
/// The caller is expected to have validated `detail` and `owners` first.
///
/// # Errors
///
/// Returns a [Error::InvalidForeignKey] if a referenced row was removed
/// between validation and the insert, or a [Error::SqlError] if any other
/// insert error occurred or the final commit failed.
pub fn persist_asset(
    family_id: FamilyId,
    detail: &AssetDetail,
    owners: &[OwnerShare],
    connection: &mut Connection,
) -> Result<AssetId, Error> {
    let transaction = connection.transaction()?;
    let now = OffsetDateTime::now_utc();

    transaction.execute(
        "INSERT INTO asset (family_id, category, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        params![family_id, detail.category(), now, now],
    )?;
    let asset_id = transaction.last_insert_rowid();

    insert_detail(detail, asset_id, &transaction)?;
    insert_owners(asset_id, owners, &transaction)?;

    transaction.commit()?;

    Ok(asset_id)
}

/// Get the asset row with ID `asset_id`, scoped to the family with ID
/// `family_id`.
///
/// Soft-deleted assets and assets belonging to other families are treated as
/// absent.
///
/// # Errors
///
/// This function will return an error if:
/// - no such asset is visible to the family ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_asset_row(
    asset_id: AssetId,
    family_id: FamilyId,
    connection: &Connection,
) -> Result<Asset, Error> {
    connection
        .prepare(
            "SELECT id, family_id, category, created_at, updated_at FROM asset \
             WHERE id = ?1 AND family_id = ?2 AND deleted_at IS NULL",
        )?
        .query_row(params![asset_id, family_id], map_row_to_asset)
        .map_err(|error| error.into())
}

/// Get the asset rows of the family with ID `family_id`, oldest first,
/// optionally restricted to one category.
///
/// Soft-deleted assets are not returned.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_asset_rows(
    family_id: FamilyId,
    category: Option<AssetCategory>,
    connection: &Connection,
) -> Result<Vec<Asset>, Error> {
    match category {
        Some(category) => connection
            .prepare(
                "SELECT id, family_id, category, created_at, updated_at FROM asset \
                 WHERE family_id = ?1 AND category = ?2 AND deleted_at IS NULL ORDER BY id",
            )?
            .query_map(params![family_id, category], map_row_to_asset)?
            .map(|row_result| row_result.map_err(|error| error.into()))
            .collect(),
        None => connection
            .prepare(
                "SELECT id, family_id, category, created_at, updated_at FROM asset \
                 WHERE family_id = ?1 AND deleted_at IS NULL ORDER BY id",
            )?
            .query_map(params![family_id], map_row_to_asset)?
            .map(|row_result| row_result.map_err(|error| error.into()))
            .collect(),
    }
}
