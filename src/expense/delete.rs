//! Expense deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    expense::{ExpenseIdPath, delete_expense},
    flash::set_flash,
};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle expense deletion.
///
/// Redirects to the expense list with a notice, or responds with the 404 page
/// if the expense does not exist.
pub async fn delete_expense_endpoint(
    ExpenseIdPath(expense_id): ExpenseIdPath,
    State(state): State<DeleteExpenseState>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    match delete_expense(expense_id, &connection) {
        Ok(()) => {
            tracing::info!("deleted expense {expense_id}");
            let jar = set_flash(jar, &Alert::success("Expense deleted successfully!"));

            Ok((jar, Redirect::to(endpoints::ROOT)).into_response())
        }
        Err(Error::DeleteMissingExpense) => {
            tracing::debug!("tried to delete missing expense {expense_id}");
            Err(Error::DeleteMissingExpense)
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            Err(error)
        }
    }
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::State,
        http::{StatusCode, header::LOCATION},
        response::IntoResponse,
    };
    use axum_extra::extract::PrivateCookieJar;
    use time::macros::date;

    use crate::{
        Error,
        app_state::create_cookie_key,
        endpoints,
        expense::{
            ExpenseIdPath,
            db::test_utils::{count_expenses, get_test_connection, must_create_expense},
            get_expense,
        },
        test_utils::get_header,
    };

    use super::{DeleteExpenseState, delete_expense_endpoint};

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(create_cookie_key("foobar"))
    }

    #[tokio::test]
    async fn deletes_expense() {
        let connection = get_test_connection();
        let expense = must_create_expense("Gone", 1.0, "Food", date!(2024 - 01 - 01), &connection);
        let state = DeleteExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_expense_endpoint(ExpenseIdPath(expense.id), State(state.clone()), get_jar())
            .await
            .expect("Could not delete expense");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, LOCATION.as_str()), endpoints::ROOT);
        assert!(get_header(&response, "set-cookie").starts_with("flash="));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(expense.id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn missing_expense_returns_not_found() {
        let connection = get_test_connection();
        let expense =
            must_create_expense("Stays", 1.0, "Food", date!(2024 - 01 - 01), &connection);
        let state = DeleteExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result =
            delete_expense_endpoint(ExpenseIdPath(expense.id + 1000), State(state.clone()), get_jar())
                .await;

        let response = result.expect_err("want error for missing expense").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(count_expenses(&state.db_connection.lock().unwrap()), 1);
    }
}
