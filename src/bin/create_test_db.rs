use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use fintrack_rs::{
    Category, PaymentMode, SQLiteTransactionStore, Transaction, TransactionKind, TransactionStore,
    create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

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
    let user = create_user("test@test.com", &conn)?;

    println!("Creating test transactions...");
    let mut store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let now = OffsetDateTime::now_utc();

    // A few months of plausible activity so every analytics endpoint has
    // something to chew on.
    let sample_data = [
        (
            TransactionKind::Income,
            52_000.0,
            Category::Salary,
            Some("Acme Corp"),
            PaymentMode::Netbanking,
            5,
        ),
        (
            TransactionKind::Income,
            8_500.0,
            Category::Freelance,
            Some("Design gig"),
            PaymentMode::Upi,
            12,
        ),
        (
            TransactionKind::Expense,
            1_250.0,
            Category::Groceries,
            Some("Big Bazaar"),
            PaymentMode::Card,
            1,
        ),
        (
            TransactionKind::Expense,
            430.0,
            Category::FoodAndDining,
            Some("Cafe Coffee Day"),
            PaymentMode::Upi,
            2,
        ),
        (
            TransactionKind::Expense,
            18_000.0,
            Category::Rent,
            None,
            PaymentMode::Netbanking,
            4,
        ),
        (
            TransactionKind::Expense,
            649.0,
            Category::Subscriptions,
            Some("Netflix"),
            PaymentMode::Card,
            9,
        ),
        (
            TransactionKind::Expense,
            320.0,
            Category::Transportation,
            Some("Metro card top-up"),
            PaymentMode::Cash,
            15,
        ),
        (
            TransactionKind::Income,
            52_000.0,
            Category::Salary,
            Some("Acme Corp"),
            PaymentMode::Netbanking,
            35,
        ),
        (
            TransactionKind::Expense,
            18_000.0,
            Category::Rent,
            None,
            PaymentMode::Netbanking,
            34,
        ),
        (
            TransactionKind::Expense,
            2_100.0,
            Category::Shopping,
            Some("Amazon"),
            PaymentMode::Card,
            40,
        ),
        (
            TransactionKind::Income,
            52_000.0,
            Category::Salary,
            Some("Acme Corp"),
            PaymentMode::Netbanking,
            66,
        ),
        (
            TransactionKind::Expense,
            5_400.0,
            Category::Travel,
            Some("Weekend trip"),
            PaymentMode::Card,
            70,
        ),
    ];

    for (kind, amount, category, merchant, payment_mode, days_ago) in sample_data {
        store.create(
            user.id,
            Transaction::build(kind, amount, category)
                .merchant(merchant.map(str::to_owned))
                .payment_mode(payment_mode)
                .occurred_at(Some(now - Duration::days(days_ago))),
        )?;
    }

    println!("Success!");

    Ok(())
}
