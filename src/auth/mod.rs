//! User accounts, password handling and cookie based sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use redirect::normalize_redirect_url;
pub use register::{get_register_page, register_user};
pub use user::{
    USERNAME_MAX_LENGTH, User, UserID, Username, create_user, create_user_table, get_user_by_id,
    get_user_by_username, update_password,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
