use rusqlite::Connection;

use crate::{
    auth::{PasswordHash, User, Username, ValidatedPassword, create_user},
    db::initialize,
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize test database");

    connection
}

/// Insert a user whose password is `password`.
///
/// The hash uses the lowest bcrypt cost to keep tests fast.
pub(crate) fn insert_test_user(connection: &Connection, username: &str, password: &str) -> User {
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(password), 4)
        .expect("Could not hash test password");

    create_user(Username::new_unchecked(username), password_hash, connection)
        .expect("Could not create test user")
}
