use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    asset::{AssetCategory, response::{AssetResponse, list_assets}},
    user::{UserID, get_user_by_id},
};

/// The state needed for listing assets.
#[derive(Debug, Clone)]
pub struct ListAssetsState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListAssetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters accepted when listing assets.
#[derive(Debug, Deserialize)]
pub struct AssetListParams {
    /// Restrict the listing to one asset category.
    category: Option<AssetCategory>,
}

/// A handler for listing the authenticated user's family's assets, each
/// assembled with its detail and owners. Accepts an optional `category`
/// query parameter such as `?category=VEHICLE`.
///
/// # Errors
///
/// This function will return an error in several cases:
/// - the category query parameter was not a known category
///   ([Error::InvalidInput]).
/// - the app state could not acquire a database lock, or the assets could
///   not be read.
pub async fn list_assets_endpoint(
    State(state): State<ListAssetsState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<AssetListParams>, QueryRejection>,
) -> Result<Json<Vec<AssetResponse>>, Error> {
    let Query(params) = query.map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = get_user_by_id(user_id, &connection)?;

    list_assets(user.family_id, params.category, &connection).map(Json)
}
