//! Defines the route handler for the page for adding a new transaction.

use axum::{
    extract::Path,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    not_found::get_404_not_found_response,
    transaction::{
        FieldErrors, TransactionKind,
        form::{TransactionFormValues, transaction_form},
    },
};

/// Render the add transaction page for `kind`.
///
/// `values` fills in the inputs and `errors` lists any problems with a previous submission.
pub fn add_transaction_view(
    kind: TransactionKind,
    values: &TransactionFormValues<'_>,
    errors: &FieldErrors,
) -> Markup {
    let add_transaction_route = format_endpoint(endpoints::ADD_TRANSACTION_VIEW, kind);
    let nav_bar = NavBar::new(&add_transaction_route).into_html();
    let title = format!("Add {}", kind.label());

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { (title) }

            (transaction_form(&add_transaction_route, "Save", values, errors))

            p class="mt-4" { (link(endpoints::DASHBOARD_VIEW, "Cancel")) }
        }
    };

    base(&title, &content)
}

/// Route handler for the add transaction page.
///
/// Responds with the 404 page if `kind` is not a transaction kind.
pub async fn get_add_transaction_page(Path(kind): Path<String>) -> Response {
    let Ok(kind) = kind.parse::<TransactionKind>() else {
        return get_404_not_found_response();
    };

    let values = TransactionFormValues {
        description: "",
        amount: "",
        kind: None,
    };

    add_transaction_view(kind, &values, &FieldErrors::default()).into_response()
}
