//! Defines the route handler for the page for editing a transaction.

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
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base, link},
    navigation::NavBar,
    transaction::{
        FieldErrors,
        form::{TransactionFormValues, transaction_form},
        get_transaction,
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit page for `transaction_id`.
///
/// `values` fills in the inputs and `errors` lists any problems with a previous submission.
pub fn edit_transaction_view(
    transaction_id: TransactionId,
    values: &TransactionFormValues<'_>,
    errors: &FieldErrors,
) -> Markup {
    let edit_transaction_route = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction_id);
    let delete_transaction_route =
        format_endpoint(endpoints::DELETE_TRANSACTION_VIEW, transaction_id);
    let nav_bar = NavBar::new(&edit_transaction_route).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit Transaction" }

            (transaction_form(&edit_transaction_route, "Save", values, errors))

            div class="flex justify-between w-full mt-4"
            {
                (link(endpoints::DASHBOARD_VIEW, "Cancel"))

                a href=(delete_transaction_route) class=(LINK_STYLE) { "Delete" }
            }
        }
    };

    base("Edit Transaction", &content)
}

/// Route handler for the edit transaction page.
///
/// Responds with the 404 page if the transaction does not exist or belongs to another user.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let transaction = {
        let Ok(connection) = state.db_connection.lock() else {
            return Error::DatabaseLockError.into_response();
        };

        match get_transaction(user_id, transaction_id, &connection) {
            Ok(transaction) => transaction,
            Err(error) => return error.into_response(),
        }
    };

    let amount = transaction.amount.to_string();
    let values = TransactionFormValues {
        description: &transaction.description,
        amount: &amount,
        kind: Some(transaction.kind),
    };

    edit_transaction_view(transaction_id, &values, &FieldErrors::default()).into_response()
}
