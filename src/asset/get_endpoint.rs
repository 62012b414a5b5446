use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    asset::{AssetId, response::{AssetResponse, get_asset}},
    user::{UserID, get_user_by_id},
};

/// The state needed for fetching a single asset.
#[derive(Debug, Clone)]
pub struct GetAssetState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetAssetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A handler for fetching one of the authenticated user's family's assets,
/// assembled with its detail and owners.
///
/// # Errors
///
/// This function will return an error in several cases:
/// - the path segment was not a valid asset ID ([Error::InvalidInput]).
/// - the asset does not exist, is soft-deleted or belongs to another family
///   ([Error::NotFound]).
/// - the app state could not acquire a database lock, or the asset could not
///   be read.
pub async fn get_asset_endpoint(
    State(state): State<GetAssetState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<AssetId>, PathRejection>,
) -> Result<Json<AssetResponse>, Error> {
    let Path(asset_id) = path.map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = get_user_by_id(user_id, &connection)?;

    get_asset(asset_id, user.family_id, &connection).map(Json)
}

#[cfg(test)]
mod get_asset_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::{Path, State}};
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        asset::{AssetDetail, OtherDetail, OwnerShare, core::create_asset},
        db::initialize,
        family::create_family,
        user::{User, create_user},
    };

    use super::{GetAssetState, get_asset_endpoint};

    fn get_test_state() -> (GetAssetState, User, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let ferrars = create_family("Ferrars", &connection).unwrap();
        let steeles = create_family("Steele", &connection).unwrap();
        let edward = create_user(
            "edward@example.com",
            "Edward",
            ferrars.id,
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let lucy = create_user(
            "lucy@example.com",
            "Lucy",
            steeles.id,
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let state = GetAssetState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, edward, lucy)
    }

    fn seed_asset(state: &GetAssetState, owner: &User) -> i64 {
        let detail = AssetDetail::Other(OtherDetail {
            asset_name: "Grandmother's Ring".to_owned(),
            asset_category: "Jewellery".to_owned(),
            description: None,
            purchase_price: 4_000.0,
            purchase_date: None,
            current_valuation: 5_500.0,
            valuation_date: None,
        });
        let owners = vec![OwnerShare {
            user_id: owner.id,
            percentage: 100.0,
        }];
        let mut connection = state.db_connection.lock().unwrap();

        create_asset(owner.family_id, &detail, &owners, 0.0, &mut connection).unwrap()
    }

    #[tokio::test]
    async fn get_asset_endpoint_returns_the_assembled_asset() {
        let (state, edward, _) = get_test_state();
        let asset_id = seed_asset(&state, &edward);

        let Json(response) = get_asset_endpoint(
            State(state),
            Extension(edward.id),
            Ok(Path(asset_id)),
        )
        .await
        .unwrap();

        assert_eq!(response.asset_id, asset_id);
        assert_eq!(response.owners[0].name, "Edward");
    }

    #[tokio::test]
    async fn get_asset_endpoint_hides_other_families_assets() {
        let (state, edward, lucy) = get_test_state();
        let asset_id = seed_asset(&state, &edward);

        let result =
            get_asset_endpoint(State(state), Extension(lucy.id), Ok(Path(asset_id))).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
