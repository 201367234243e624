use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expenses_rs::{CATEGORIES, Category, Description, NewExpense, create_expense, initialize_db};

/// A utility for creating a test database for the expenses_rs web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of sample expenses to create, ending today.
    #[arg(long, short, default_value_t = 60)]
    days: u16,
}

const SAMPLE_DESCRIPTIONS: [&str; 5] = [
    "Groceries",
    "Bus fare",
    "Weekly rent",
    "Power bill",
    "Pharmacy",
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

    println!("Creating sample expenses for the last {} days...", args.days);

    let today = OffsetDateTime::now_utc().date();

    for day in 0..args.days {
        let date = today - Duration::days(i64::from(day));
        // Cycle through the categories so that every one shows up in the charts.
        let index = usize::from(day) % CATEGORIES.len();
        let amount = 5.0 + f64::from(day % 17) * 3.25;

        create_expense(
            NewExpense {
                description: Description::new(SAMPLE_DESCRIPTIONS[index])?,
                amount,
                category: Category::new(CATEGORIES[index])?,
                date,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
