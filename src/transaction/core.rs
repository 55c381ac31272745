//! Defines the core data models and database queries for transactions.
//!
//! Every query that reads or changes a transaction filters on the owner, so a
//! user can never see or touch another user's transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql, named_params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::validation::TransactionForm,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The name used in URLs, forms and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The name shown to users, e.g. "Income".
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::InvalidTransactionKind(s.to_owned())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user who recorded the transaction.
    pub owner: UserID,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned, with two decimal places.
    pub amount: Decimal,
    /// Whether the money was spent or earned.
    pub kind: TransactionKind,
    /// When the transaction was recorded, in UTC.
    pub created_at: OffsetDateTime,
}

impl Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} ({})", self.description, self.amount, self.kind)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                amount TEXT NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                created_at TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Add composite index used by the dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_kind ON \"transaction\"(owner_id, kind);",
        (),
    )?;

    Ok(())
}

/// Amounts are stored as text so that no precision is lost.
fn amount_to_sql(amount: Decimal) -> String {
    let mut amount = amount;
    amount.rescale(2);
    amount.to_string()
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let owner = UserID::new(row.get(1)?);
    let description = row.get(2)?;
    let raw_amount: String = row.get(3)?;
    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let kind = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Transaction {
        id,
        owner,
        description,
        amount,
        kind,
        created_at,
    })
}

/// Validate `form` and record a new transaction of `kind` for `owner`.
///
/// Any kind submitted in `form` is ignored in favour of `kind`.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] listing every invalid field, in which case nothing is saved,
/// - [Error::NotFound] if `owner` is not a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    owner: UserID,
    kind: TransactionKind,
    form: &TransactionForm,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let fields = form.validate().map_err(Error::Validation)?;

    connection
        .prepare(
            "INSERT INTO \"transaction\" (owner_id, description, amount, kind, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, owner_id, description, amount, kind, created_at",
        )?
        .query_row(
            (
                owner.as_i64(),
                &fields.description,
                amount_to_sql(fields.amount),
                kind,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })
}

/// List the transactions of `kind` that belong to `owner`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    owner: UserID,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, description, amount, kind, created_at FROM \"transaction\"
             WHERE owner_id = :owner_id AND kind = :kind
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(
            named_params! {":owner_id": owner.as_i64(), ":kind": kind},
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Retrieve the transaction `id` if it belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    owner: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, description, amount, kind, created_at FROM \"transaction\"
             WHERE id = :id AND owner_id = :owner_id",
        )?
        .query_row(
            &[(":id", &id), (":owner_id", &owner.as_i64())],
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Validate `form` and overwrite the description, amount and, when given,
/// the kind of the transaction `id` owned by `owner`.
///
/// The owner, ID and creation time never change.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] listing every invalid field, in which case nothing is saved,
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    owner: UserID,
    id: TransactionId,
    form: &TransactionForm,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let fields = form.validate().map_err(Error::Validation)?;

    connection
        .prepare(
            "UPDATE \"transaction\"
             SET description = ?1, amount = ?2, kind = COALESCE(?3, kind)
             WHERE id = ?4 AND owner_id = ?5
             RETURNING id, owner_id, description, amount, kind, created_at",
        )?
        .query_row(
            (
                &fields.description,
                amount_to_sql(fields.amount),
                fields.kind,
                id,
                owner.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}

type RowsAffected = usize;

/// Delete the transaction `id` if it belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    owner: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected: RowsAffected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND owner_id = :owner_id",
        &[(":id", &id), (":owner_id", &owner.as_i64())],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod transaction_kind_tests {
    use crate::{Error, transaction::TransactionKind};

    #[test]
    fn parses_known_kinds() {
        assert_eq!("income".parse(), Ok(TransactionKind::Income));
        assert_eq!("expense".parse(), Ok(TransactionKind::Expense));
    }

    #[test]
    fn rejects_unknown_kind() {
        assert_eq!(
            "Income".parse::<TransactionKind>(),
            Err(Error::InvalidTransactionKind("Income".to_owned()))
        );
        assert_eq!(
            "transfer".parse::<TransactionKind>(),
            Err(Error::InvalidTransactionKind("transfer".to_owned()))
        );
    }
}
