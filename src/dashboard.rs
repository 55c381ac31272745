//! The dashboard lists the user's income and expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionKind, list_transactions},
};

const ADD_LINK_STYLE: &str = "px-4 py-2 bg-blue-500 dark:bg-blue-600 \
    hover:bg-blue-600 hover:dark:bg-blue-700 text-white rounded";

const CREATED_AT_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with the user's income and expenses, newest first.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match render_dashboard(&state, user_id) {
        Ok(markup) => markup.into_response(),
        Err(error) => error.into_response(),
    }
}

fn render_dashboard(state: &DashboardState, user_id: UserID) -> Result<Markup, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let income = list_transactions(user_id, TransactionKind::Income, &connection)?;
    let expenses = list_transactions(user_id, TransactionKind::Expense, &connection)?;

    Ok(dashboard_view(
        user.username.as_str(),
        &income,
        &expenses,
        local_offset,
    ))
}

fn dashboard_view(
    username: &str,
    income: &[Transaction],
    expenses: &[Transaction],
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { "Hello, " (username) }

            div class="w-full max-w-screen-lg space-y-8"
            {
                (transactions_section(TransactionKind::Income, income, local_offset))
                (transactions_section(TransactionKind::Expense, expenses, local_offset))
            }
        }
    };

    base("Dashboard", &content)
}

fn transactions_section(
    kind: TransactionKind,
    transactions: &[Transaction],
    local_offset: UtcOffset,
) -> Markup {
    let add_url = format_endpoint(endpoints::ADD_TRANSACTION_VIEW, kind);

    html! {
        section id=(kind.as_str())
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-xl font-semibold" { (kind.label()) }

                a href=(add_url) class=(ADD_LINK_STYLE)
                {
                    "Add " (kind.as_str())
                }
            }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            (transaction_row(transaction, local_offset))
                        }

                        @if transactions.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan="4" class={(TABLE_CELL_STYLE) " text-center"}
                                {
                                    "No " (kind.as_str()) " recorded yet."
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transaction_row(transaction: &Transaction, local_offset: UtcOffset) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION_VIEW, transaction.id);
    let created_at = transaction
        .created_at
        .to_offset(local_offset)
        .format(CREATED_AT_FORMAT)
        .unwrap_or_else(|_| transaction.created_at.date().to_string());

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"} { (created_at) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class={(TABLE_CELL_STYLE) " text-right"} { (transaction.amount.to_string()) }
            td class={(TABLE_CELL_STYLE) " space-x-4 whitespace-nowrap"}
            {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                a href=(delete_url) class=(LINK_STYLE) { "Delete" }
            }
        }
    }
}

#[cfg(test)]
mod dashboard_route_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use scraper::{Html, Selector};

    use crate::{
        test_utils::{
            assert_content_type_html, assert_status_ok, assert_valid_html, get_test_connection,
            insert_test_user, parse_html_document,
        },
        transaction::{TransactionForm, TransactionKind, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn form(description: &str, amount: &str) -> TransactionForm {
        TransactionForm {
            description: description.to_owned(),
            amount: amount.to_owned(),
            kind: None,
        }
    }

    fn row_descriptions(document: &Html, section_id: &str) -> Vec<String> {
        let selector =
            Selector::parse(&format!("section#{section_id} tr[data-transaction-id] td")).unwrap();

        document
            .select(&selector)
            .skip(1)
            .step_by(4)
            .map(|cell| cell.text().collect::<String>())
            .collect()
    }

    #[tokio::test]
    async fn lists_income_and_expenses_separately() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "jane", "test");
        create_transaction(
            user.id,
            TransactionKind::Income,
            &form("Salary", "1000"),
            &connection,
        )
        .unwrap();
        create_transaction(
            user.id,
            TransactionKind::Expense,
            &form("Coffee", "4.50"),
            &connection,
        )
        .unwrap();
        create_transaction(
            user.id,
            TransactionKind::Expense,
            &form("Lunch", "12"),
            &connection,
        )
        .unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(user.id)).await;

        assert_status_ok(&response);
        assert_content_type_html(&response);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        assert_eq!(row_descriptions(&document, "income"), vec!["Salary"]);
        assert_eq!(row_descriptions(&document, "expense"), vec!["Lunch", "Coffee"]);
    }

    #[tokio::test]
    async fn does_not_show_other_users_transactions() {
        let connection = get_test_connection();
        let alice = insert_test_user(&connection, "alice", "test");
        let bob = insert_test_user(&connection, "bob", "test");
        create_transaction(
            alice.id,
            TransactionKind::Income,
            &form("Alice's salary", "1000"),
            &connection,
        )
        .unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(bob.id)).await;

        let document = parse_html_document(response).await;
        assert!(row_descriptions(&document, "income").is_empty());
        let text = document.root_element().text().collect::<String>();
        assert!(
            !text.contains("Alice's salary"),
            "bob's dashboard shows alice's transaction"
        );
        assert!(text.contains("No income recorded yet."));
    }

    #[tokio::test]
    async fn links_to_add_edit_and_delete() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "jane", "test");
        let transaction = create_transaction(
            user.id,
            TransactionKind::Expense,
            &form("Coffee", "4.50"),
            &connection,
        )
        .unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(user.id)).await;

        let document = parse_html_document(response).await;
        let hrefs = document
            .select(&Selector::parse("section a[href]").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect::<Vec<_>>();
        for want in [
            "/add/income/".to_owned(),
            "/add/expense/".to_owned(),
            format!("/edit/{}/", transaction.id),
            format!("/delete/{}/", transaction.id),
        ] {
            assert!(hrefs.contains(&want.as_str()), "want link {want} in {hrefs:?}");
        }
    }

    #[tokio::test]
    async fn invalid_timezone_is_server_error() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "jane", "test");
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Not/AZone".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(user.id)).await;

        assert_eq!(
            response.status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
