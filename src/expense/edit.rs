//! Expense editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    expense::{
        CATEGORIES, Expense, ExpenseIdPath,
        domain::ExpenseFormData,
        form::{ExpenseFormDefaults, expense_form_fields},
        get_expense, update_expense,
    },
    flash::{set_flash, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the edit expense page and endpoint.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the expense editing page, or the 404 page if the expense does not exist.
pub async fn get_edit_expense_page(
    ExpenseIdPath(expense_id): ExpenseIdPath,
    State(state): State<EditExpenseState>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let expense = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_expense(expense_id, &connection).inspect_err(|error| {
            if *error != Error::NotFound {
                tracing::error!("Failed to retrieve expense {expense_id}: {error}");
            }
        })?
    };

    let (jar, alert) = take_flash(jar);

    Ok((jar, edit_expense_view(&expense, alert, today)).into_response())
}

/// Handle the edit expense form submission.
///
/// The expense must exist before the form is validated. An invalid form
/// redirects back to the edit page with an error notice, a valid form
/// overwrites the expense and redirects to the expense list.
pub async fn edit_expense_endpoint(
    ExpenseIdPath(expense_id): ExpenseIdPath,
    State(state): State<EditExpenseState>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseFormData>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_expense(expense_id, &connection)?;

    let update = match form.validate(today) {
        Ok(update) => update,
        Err(error) => {
            tracing::debug!("rejected update to expense {expense_id} {form:?}: {error}");
            let jar = set_flash(jar, &Alert::error(&error.to_string()));
            let edit_url = endpoints::format_endpoint(endpoints::EDIT_EXPENSE, expense_id);

            return Ok((jar, Redirect::to(&edit_url)).into_response());
        }
    };

    update_expense(expense_id, &update, &connection).inspect_err(|error| {
        tracing::error!("An unexpected error occurred while updating expense {expense_id}: {error}")
    })?;

    tracing::info!("updated expense {expense_id}");

    let jar = set_flash(jar, &Alert::success("Expense updated successfully!"));

    Ok((jar, Redirect::to(endpoints::ROOT)).into_response())
}

fn edit_expense_view(expense: &Expense, alert: Option<Alert>, today: Date) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_EXPENSE, expense.id);
    let nav_bar = NavBar::new(&edit_url, endpoints::EXPORT_CSV).into_html();
    let defaults = ExpenseFormDefaults {
        description: Some(expense.description.as_ref()),
        amount: Some(expense.amount),
        category: Some(expense.category.as_ref()),
        date: Some(expense.date),
        today,
        autofocus_description: true,
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            @if let Some(alert) = alert {
                (alert.into_html())
            }

            form
                method="post"
                action=(edit_url)
                class="w-full space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { "Edit Expense" }

                (expense_form_fields(&defaults, &CATEGORIES))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }

                a href=(endpoints::ROOT) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
            }
        }
    };

    base("Edit Expense", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod edit_expense_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::State,
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::PrivateCookieJar;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        alert::Alert,
        app_state::create_cookie_key,
        expense::{
            ExpenseIdPath,
            db::test_utils::{get_test_connection, must_create_expense},
        },
        flash::set_flash,
        test_utils::{
            assert_content_type, assert_form_input_with_value,
            assert_form_submit_button_with_text, assert_status_ok, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::{EditExpenseState, get_edit_expense_page};

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(create_cookie_key("foobar"))
    }

    #[tokio::test]
    async fn renders_prefilled_form() {
        let connection = get_test_connection();
        let expense =
            must_create_expense("Groceries", 42.5, "Food", date!(2024 - 03 - 01), &connection);
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_edit_expense_page(ExpenseIdPath(expense.id), State(state), get_jar())
            .await
            .expect("Could not render edit page");

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_eq!(
            form.value().attr("action"),
            Some(format!("/edit/{}", expense.id).as_str())
        );
        assert_eq!(form.value().attr("method"), Some("post"));
        assert_form_input_with_value(&form, "description", "text", "Groceries");
        assert_form_input_with_value(&form, "amount", "number", "42.5");
        assert_form_submit_button_with_text(&form, "Save Changes");

        let selected = form
            .select(&Selector::parse("option[selected]").unwrap())
            .next()
            .expect("No selected category");
        assert_eq!(selected.value().attr("value"), Some("Food"));

        let date = form
            .select(&Selector::parse("input[name=date]").unwrap())
            .next()
            .expect("No date input");
        assert_eq!(date.value().attr("value"), Some("2024-03-01"));
    }

    #[tokio::test]
    async fn prefills_amount_exactly_as_stored() {
        let connection = get_test_connection();
        let expense =
            must_create_expense("Groceries", 12.345, "Food", date!(2024 - 03 - 01), &connection);
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_edit_expense_page(ExpenseIdPath(expense.id), State(state), get_jar())
            .await
            .expect("Could not render edit page");

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "amount", "number", "12.345");

        let amount = form
            .select(&Selector::parse("input[name=amount]").unwrap())
            .next()
            .expect("No amount input");
        assert_eq!(amount.value().attr("step"), Some("any"));
    }

    #[tokio::test]
    async fn shows_flash() {
        let connection = get_test_connection();
        let expense =
            must_create_expense("Groceries", 42.5, "Food", date!(2024 - 03 - 01), &connection);
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };
        let jar = set_flash(get_jar(), &Alert::error("Amount must be a positive number"));

        let response = get_edit_expense_page(ExpenseIdPath(expense.id), State(state), jar)
            .await
            .expect("Could not render edit page");

        let html = parse_html_document(response).await;
        let alert = html
            .select(&Selector::parse("#alert").unwrap())
            .next()
            .expect("No alert found");
        assert_eq!(
            alert.text().collect::<String>().trim(),
            "Amount must be a positive number"
        );
    }

    #[tokio::test]
    async fn missing_expense_returns_not_found() {
        let state = EditExpenseState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_edit_expense_page(ExpenseIdPath(1337), State(state), get_jar()).await;

        let response = result.expect_err("want error for missing expense").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
