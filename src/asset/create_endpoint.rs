use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    AppState, Error,
    asset::{AssetDetail, AssetId, core::create_asset, ownership::OwnerShare},
    user::{UserID, get_user_by_id},
};

/// The state needed for creating assets.
#[derive(Debug, Clone)]
pub struct CreateAssetState {
    db_connection: Arc<Mutex<Connection>>,
    ownership_tolerance: f64,
}

impl FromRef<AppState> for CreateAssetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ownership_tolerance: state.ownership_tolerance,
        }
    }
}

/// The request payload for creating an asset: the category-specific fields
/// at the top level plus the ownership split.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetForm<D> {
    #[serde(flatten)]
    pub detail: D,
    pub owners: Vec<OwnerShare>,
}

/// The response payload for a successfully created asset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCreatedResponse {
    /// The id of the new asset.
    pub asset_id: AssetId,
}

/// A handler for creating an asset in the authenticated user's family.
///
/// Each asset category's route instantiates this with its own detail type,
/// which decides the fields accepted at the top level of the payload.
///
/// # Errors
///
/// This function will return an error in several cases:
/// - the request body was not valid JSON for the category
///   ([Error::InvalidInput]).
/// - a detail field or the ownership split failed validation.
/// - an owner is not a member of the user's family
///   ([Error::OwnerNotInFamily]).
/// - the app state could not acquire a database lock, or the asset could not
///   be persisted.
pub async fn create_asset_endpoint<D>(
    State(state): State<CreateAssetState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<CreateAssetForm<D>>, JsonRejection>,
) -> Result<(StatusCode, Json<AssetCreatedResponse>), Error>
where
    D: DeserializeOwned + Into<AssetDetail> + Send,
{
    let Json(form) = payload.map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;

    let mut connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = get_user_by_id(user_id, &connection)?;
    let detail = form.detail.into();
    let asset_id = create_asset(
        user.family_id,
        &detail,
        &form.owners,
        state.ownership_tolerance,
        &mut connection,
    )?;

    Ok((StatusCode::CREATED, Json(AssetCreatedResponse { asset_id })))
}
