//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/edit/{transaction_id}/', use [format_endpoint].

/// The dashboard, which lists the user's income and expenses.
pub const DASHBOARD_VIEW: &str = "/";
/// The page for creating a new transaction of the kind in the path.
pub const ADD_TRANSACTION_VIEW: &str = "/add/{kind}/";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/edit/{transaction_id}/";
/// The page for confirming and performing the deletion of a transaction.
pub const DELETE_TRANSACTION_VIEW: &str = "/delete/{transaction_id}/";
/// The route for creating an account.
pub const REGISTER_VIEW: &str = "/register/";
/// The route for logging in.
pub const LOG_IN_VIEW: &str = "/accounts/login/";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/accounts/logout/";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/edit/{transaction_id}/', '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
