//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, Error,
    asset::{
        BankAccountDetail, BusinessDetail, InvestmentDetail, OtherDetail, RealEstateDetail,
        VehicleDetail, create_asset_endpoint, get_asset_endpoint, list_assets_endpoint,
    },
    auth::{auth_guard, get_log_out, get_me_endpoint, post_log_in},
    endpoints,
    family::get_family_members_endpoint,
    logging_middleware,
    register_user::register_user,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::USERS, post(register_user));

    let protected_routes = Router::new()
        .route(endpoints::ME, get(get_me_endpoint))
        .route(endpoints::FAMILY_MEMBERS, get(get_family_members_endpoint))
        .route(endpoints::ASSETS, get(list_assets_endpoint))
        .route(endpoints::ASSET, get(get_asset_endpoint))
        .route(
            endpoints::POST_REAL_ESTATE,
            post(create_asset_endpoint::<RealEstateDetail>),
        )
        .route(
            endpoints::POST_VEHICLE,
            post(create_asset_endpoint::<VehicleDetail>),
        )
        .route(
            endpoints::POST_BANK_ACCOUNT,
            post(create_asset_endpoint::<BankAccountDetail>),
        )
        .route(
            endpoints::POST_INVESTMENT,
            post(create_asset_endpoint::<InvestmentDetail>),
        )
        .route(
            endpoints::POST_BUSINESS,
            post(create_asset_endpoint::<BusinessDetail>),
        )
        .route(
            endpoints::POST_OTHER,
            post(create_asset_endpoint::<OtherDetail>),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_unknown_route)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Report that the server is up and able to respond.
async fn get_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// All unknown paths get the JSON not-found error body.
async fn get_unknown_route() -> Error {
    Error::NotFound
}
