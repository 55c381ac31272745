//! Defines the endpoint for creating a new transaction.

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
    endpoints,
    not_found::get_404_not_found_response,
    transaction::{
        TransactionForm, TransactionKind, core::create_transaction,
        create_page::add_transaction_view, form::TransactionFormValues,
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction of the kind in the path.
///
/// Redirects to the dashboard on success, or re-renders the form with the
/// problems found if the submission is invalid.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(kind): Path<String>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Ok(kind) = kind.parse::<TransactionKind>() else {
        return get_404_not_found_response();
    };

    let Ok(connection) = state.db_connection.lock() else {
        return Error::DatabaseLockError.into_response();
    };

    match create_transaction(user_id, kind, &form, &connection) {
        Ok(transaction) => {
            tracing::debug!(
                "user {user_id} created {} transaction {}",
                transaction.kind,
                transaction.id
            );
            Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
        }
        Err(Error::Validation(errors)) => {
            // The kind is fixed by the URL on this form.
            let values = TransactionFormValues {
                description: &form.description,
                amount: &form.amount,
                kind: None,
            };

            (
                StatusCode::UNPROCESSABLE_ENTITY,
                add_transaction_view(kind, &values, &errors),
            )
                .into_response()
        }
        Err(error) => error.into_response(),
    }
}
