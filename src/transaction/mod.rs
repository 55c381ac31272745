//! Income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the database functions for storing and querying them
//! - Validation of the add and edit forms
//! - View handlers for the add, edit and delete pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod delete_page;
mod edit_endpoint;
mod edit_page;
mod form;
mod validation;

pub use core::{
    Transaction, TransactionKind, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, list_transactions, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_add_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use delete_page::get_delete_transaction_page;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use validation::{FieldError, FieldErrors, TransactionField, TransactionForm};
