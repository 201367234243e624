//! Expense creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    expense::{create_expense, domain::ExpenseFormData},
    flash::set_flash,
    timezone::local_today,
};

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Handle the add expense form submission.
///
/// Both valid and invalid submissions redirect back to the expense list with a
/// notice saying what happened. Invalid submissions do not touch the database.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseFormData>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let new_expense = match form.validate(today) {
        Ok(new_expense) => new_expense,
        Err(error) => {
            tracing::debug!("rejected new expense {form:?}: {error}");
            let jar = set_flash(jar, &Alert::error(&error.to_string()));
            return Ok((jar, Redirect::to(endpoints::ROOT)).into_response());
        }
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = create_expense(new_expense, &connection)
        .inspect_err(|error| tracing::error!("could not create expense: {error}"))?;

    tracing::info!("created expense {}", expense.id);

    let jar = set_flash(jar, &Alert::success("Expense added successfully!"));

    Ok((jar, Redirect::to(endpoints::ROOT)).into_response())
}
