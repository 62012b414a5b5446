use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    asset::{
        AssetCategory, AssetDetail, AssetId,
        core::{Asset, get_asset_row, get_asset_rows},
        detail::get_detail,
        ownership::{AssetOwner, get_owners},
    },
    family::FamilyId,
};

/// A fully assembled asset: the stored row joined with its detail and its
/// owners.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    /// The id for the asset.
    pub asset_id: AssetId,
    /// The category tag and the category-specific fields.
    #[serde(flatten)]
    pub detail: AssetDetail,
    /// Who owns the asset and by how much, largest share first.
    pub owners: Vec<AssetOwner>,
    /// When the asset was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the asset was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn assemble(asset: Asset, connection: &Connection) -> Result<AssetResponse, Error> {
    let detail = get_detail(asset.id, asset.category, connection)?;
    let owners = get_owners(asset.id, connection)?;

    Ok(AssetResponse {
        asset_id: asset.id,
        detail,
        owners,
        created_at: asset.created_at,
        updated_at: asset.updated_at,
    })
}

/// Get the asset with ID `asset_id` along with its detail and owners.
///
/// # Errors
///
/// This function will return an error if:
/// - the asset does not exist, is soft-deleted or belongs to another family
///   ([Error::NotFound]).
/// - the detail row is missing ([Error::DetailMissing]).
/// - there was an error trying to access the store.
pub fn get_asset(
    asset_id: AssetId,
    family_id: FamilyId,
    connection: &Connection,
) -> Result<AssetResponse, Error> {
    let asset = get_asset_row(asset_id, family_id, connection)?;

    assemble(asset, connection)
}

/// Get every asset of the family with ID `family_id`, oldest first,
/// optionally restricted to one category. Each asset comes with its detail
/// and owners.
///
/// # Errors
///
/// This function will return an error if:
/// - an asset is missing its detail row ([Error::DetailMissing]).
/// - there was an error trying to access the store.
pub fn list_assets(
    family_id: FamilyId,
    category: Option<AssetCategory>,
    connection: &Connection,
) -> Result<Vec<AssetResponse>, Error> {
    get_asset_rows(family_id, category, connection)?
        .into_iter()
        .map(|asset| assemble(asset, connection))
        .collect()
}
