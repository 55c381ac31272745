//! Defines the route handler for the page that asks the user to confirm deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    transaction::{Transaction, get_transaction},
};

/// The state needed for the delete confirmation page.
#[derive(Debug, Clone)]
pub struct DeleteTransactionPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn delete_transaction_view(transaction: &Transaction) -> Markup {
    let delete_transaction_route =
        format_endpoint(endpoints::DELETE_TRANSACTION_VIEW, transaction.id);
    let nav_bar = NavBar::new(&delete_transaction_route).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Delete Transaction" }

            p class="mb-4"
            {
                "Are you sure you want to delete the " (transaction.kind.as_str()) " "
                strong { "\"" (transaction.description) "\"" }
                " for " (transaction.amount.to_string()) "?"
            }

            form method="post" action=(delete_transaction_route) class="w-full"
            {
                button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
            }

            p class="mt-4" { (link(endpoints::DASHBOARD_VIEW, "Cancel")) }
        }
    };

    base("Delete Transaction", &content)
}

/// Route handler for the delete confirmation page.
///
/// Responds with the 404 page if the transaction does not exist or belongs to another user.
pub async fn get_delete_transaction_page(
    State(state): State<DeleteTransactionPageState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let Ok(connection) = state.db_connection.lock() else {
        return Error::DatabaseLockError.into_response();
    };

    match get_transaction(user_id, transaction_id, &connection) {
        Ok(transaction) => delete_transaction_view(&transaction).into_response(),
        Err(error) => error.into_response(),
    }
}
