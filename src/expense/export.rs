//! CSV download of the filtered expenses.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    expense::{
        Expense,
        query::{ExpenseFilter, FilterQuery, SortOrder, get_filtered_expenses},
    },
};

/// The header row of the exported CSV file.
const CSV_HEADER: [&str; 4] = ["Date", "Description", "Category", "Amount"];

/// The state needed for exporting expenses.
#[derive(Debug, Clone)]
pub struct ExportCsvState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportCsvState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Download the expenses matching the filter as a CSV file, oldest first.
///
/// Unlike the list page, a start date after the end date is applied as given
/// and simply matches nothing.
pub async fn export_csv_endpoint(
    State(state): State<ExportCsvState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let query = query.trimmed();
    let filter = ExpenseFilter::from_query(&query);

    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_filtered_expenses(&filter, SortOrder::Ascending, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?
    };

    let body = write_csv(&expenses)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&query.start, &query.end)
    );

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Write `expenses` as CSV text with a header row and amounts to two decimal places.
fn write_csv(expenses: &[Expense]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for expense in expenses {
        writer
            .write_record([
                expense.date.to_string(),
                expense.description.to_string(),
                expense.category.to_string(),
                format!("{:.2}", expense.amount),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

/// The download file name, e.g. "expenses_2024-01-01_to_all.csv".
///
/// Empty bounds are written as "all". Characters other than ASCII letters,
/// digits, '-' and '.' are replaced with '_' so the name is safe to quote in a
/// header.
fn export_file_name(start: &str, end: &str) -> String {
    let bound_or_all = |bound: &str| {
        if bound.is_empty() {
            "all".to_owned()
        } else {
            bound
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect()
        }
    };

    format!("expenses_{}_to_{}.csv", bound_or_all(start), bound_or_all(end))
}
