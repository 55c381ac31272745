//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, auth::UserID, database_id::TransactionId, endpoints,
    transaction::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, redirects to the dashboard.
///
/// A transaction that is already gone, or that belongs to another user, is
/// left alone and the user is still sent back to the dashboard.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let Ok(connection) = state.db_connection.lock() else {
        return Error::DatabaseLockError.into_response();
    };

    match delete_transaction(user_id, transaction_id, &connection) {
        Ok(()) => {
            tracing::debug!("user {user_id} deleted transaction {transaction_id}");
        }
        Err(Error::NotFound) => {
            tracing::debug!(
                "user {user_id} tried to delete transaction {transaction_id}, which they do not have"
            );
        }
        Err(error) => return error.into_response(),
    }

    Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
}
