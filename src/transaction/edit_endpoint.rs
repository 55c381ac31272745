//! Defines the endpoint for updating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints,
    transaction::{
        TransactionForm, edit_page::edit_transaction_view, form::TransactionFormValues,
        get_transaction, update_transaction,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a transaction.
///
/// Redirects to the dashboard on success. Responds with the 404 page if the
/// transaction does not exist or belongs to another user, even when the
/// submission is invalid.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Ok(connection) = state.db_connection.lock() else {
        return Error::DatabaseLockError.into_response();
    };

    let current = match get_transaction(user_id, transaction_id, &connection) {
        Ok(transaction) => transaction,
        Err(error) => return error.into_response(),
    };

    match update_transaction(user_id, transaction_id, &form, &connection) {
        Ok(_) => Redirect::to(endpoints::DASHBOARD_VIEW).into_response(),
        Err(Error::Validation(errors)) => {
            let values = TransactionFormValues::from_submission(&form, Some(current.kind));

            (
                StatusCode::UNPROCESSABLE_ENTITY,
                edit_transaction_view(transaction_id, &values, &errors),
            )
                .into_response()
        }
        Err(error) => error.into_response(),
    }
}
