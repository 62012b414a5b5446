//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/assets/{asset_id}', use [format_endpoint].

/// The route for checking whether the server is up.
pub const HEALTH: &str = "/api/health";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route for fetching the logged in user's profile.
pub const ME: &str = "/api/me";
/// The route for listing the members of the logged in user's family.
pub const FAMILY_MEMBERS: &str = "/api/family/members";
/// The route to list the family's assets.
pub const ASSETS: &str = "/api/assets";
/// The route to fetch a single asset with its owners.
pub const ASSET: &str = "/api/assets/{asset_id}";
/// The route to create a real estate asset.
pub const POST_REAL_ESTATE: &str = "/api/assets/real_estate";
/// The route to create a vehicle asset.
pub const POST_VEHICLE: &str = "/api/assets/vehicle";
/// The route to create a bank account asset.
pub const POST_BANK_ACCOUNT: &str = "/api/assets/bank_account";
/// The route to create an investment asset.
pub const POST_INVESTMENT: &str = "/api/assets/investment";
/// The route to create a business asset.
pub const POST_BUSINESS: &str = "/api/assets/business";
/// The route to create an asset that fits no other category.
pub const POST_OTHER: &str = "/api/assets/other";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/assets/{asset_id}', '{asset_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::HEALTH);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::ME);
        assert_endpoint_is_valid_uri(endpoints::FAMILY_MEMBERS);
        assert_endpoint_is_valid_uri(endpoints::ASSETS);
        assert_endpoint_is_valid_uri(endpoints::ASSET);
        assert_endpoint_is_valid_uri(endpoints::POST_REAL_ESTATE);
        assert_endpoint_is_valid_uri(endpoints::POST_VEHICLE);
        assert_endpoint_is_valid_uri(endpoints::POST_BANK_ACCOUNT);
        assert_endpoint_is_valid_uri(endpoints::POST_INVESTMENT);
        assert_endpoint_is_valid_uri(endpoints::POST_BUSINESS);
        assert_endpoint_is_valid_uri(endpoints::POST_OTHER);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
