use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use finance_tracker::{
    PasswordHash, TransactionForm, TransactionKind, Username, ValidatedPassword,
    create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const SAMPLE_TRANSACTIONS: [(TransactionKind, &str, &str); 6] = [
    (TransactionKind::Income, "Salary", "4200.00"),
    (TransactionKind::Income, "Sold old bike", "150"),
    (TransactionKind::Expense, "Rent", "1800"),
    (TransactionKind::Expense, "Groceries", "212.37"),
    (TransactionKind::Expense, "Coffee", "4.50"),
    (TransactionKind::Expense, "Refund for returned shoes", "-89.99"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new("test")?, password_hash, &conn)?;

    println!("Creating sample transactions...");

    for (kind, description, amount) in SAMPLE_TRANSACTIONS {
        let form = TransactionForm {
            description: description.to_owned(),
            amount: amount.to_owned(),
            kind: None,
        };

        create_transaction(user.id, kind, &form, &conn)?;
    }

    println!("Success! Log in with the username 'test' and password 'test'.");

    Ok(())
}
