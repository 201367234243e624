//! Expense listing page with filters, totals and charts.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
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
        CATEGORIES, Category, Expense,
        charts::{charts_script, charts_view, expense_charts},
        form::{ExpenseFormDefaults, expense_form_fields},
        query::{
            ExpenseFilter, FilterQuery, SortOrder, get_category_totals, get_daily_totals,
            get_filtered_expenses, total_amount,
        },
    },
    flash::take_flash,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles,
        format_currency,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the expenses listing page.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Everything the listing page shows for one filter window.
struct ExpensesPage {
    expenses: Vec<Expense>,
    total: f64,
    category_totals: Vec<(Category, f64)>,
    daily_totals: Vec<(Date, f64)>,
    query: FilterQuery,
    alerts: Vec<Alert>,
    today: Date,
}

/// Render the expenses listing page.
///
/// A start date after the end date discards both dates and shows an error
/// notice instead of an empty list.
pub async fn get_expenses_page(
    State(state): State<ListExpensesState>,
    Query(query): Query<FilterQuery>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let (jar, flash) = take_flash(jar);
    let mut alerts = flash.into_iter().collect::<Vec<_>>();

    let mut query = query.trimmed();
    let mut filter = ExpenseFilter::from_query(&query);

    if filter.has_inverted_range() {
        tracing::debug!("ignoring inverted date range {} to {}", query.start, query.end);
        alerts.push(Alert::error(&Error::InvalidDateRange.to_string()));
        filter = filter.without_dates();
        query.start.clear();
        query.end.clear();
    }

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_filtered_expenses(&filter, SortOrder::Descending, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;
    let category_totals = get_category_totals(&filter, &connection)
        .inspect_err(|error| tracing::error!("Failed to total expenses by category: {error}"))?;
    let daily_totals = get_daily_totals(&filter, &connection)
        .inspect_err(|error| tracing::error!("Failed to total expenses by day: {error}"))?;

    let page = ExpensesPage {
        total: total_amount(&expenses),
        expenses,
        category_totals,
        daily_totals,
        query,
        alerts,
        today,
    };

    Ok((jar, expenses_view(page)).into_response())
}

fn expenses_view(page: ExpensesPage) -> Markup {
    let export_url = page.query.to_url(endpoints::EXPORT_CSV);
    let nav_bar = NavBar::new(endpoints::ROOT, &export_url).into_html();

    let mut head_elements = vec![dollar_input_styles()];
    let charts = expense_charts(&page.category_totals, &page.daily_totals);
    let has_expenses = !page.expenses.is_empty();

    if has_expenses {
        head_elements.push(HeadElement::ScriptLink(
            "/static/echarts.6.0.0.min.js".to_owned(),
        ));
        head_elements.push(charts_script(&charts));
    }

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            @for alert in page.alerts {
                (alert.into_html())
            }

            section class="w-full grid grid-cols-1 lg:grid-cols-2 gap-4 mb-4"
            {
                (add_expense_form(page.today))
                (filter_form(&page.query))
            }

            section class="w-full mb-4"
            {
                header class="flex justify-between flex-wrap items-end mb-2"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    p id="total" class="text-lg"
                    {
                        "Total: "
                        span class="font-semibold tabular-nums" { (format_currency(page.total)) }
                    }
                }

                @if has_expenses {
                    (charts_view(&charts))
                }

                (expenses_table(&page.expenses))

                p class="mt-2"
                {
                    a href=(export_url) class=(LINK_STYLE) { "Download these expenses as CSV" }
                }
            }
        }
    );

    base("Expenses", &head_elements, &content)
}

fn add_expense_form(today: Date) -> Markup {
    let defaults = ExpenseFormDefaults {
        description: None,
        amount: None,
        category: None,
        date: None,
        today,
        autofocus_description: true,
    };

    html!(
        form
            id="add-expense"
            method="post"
            action=(endpoints::ADD_EXPENSE)
            class="w-full space-y-4 p-4 bg-white rounded shadow-sm dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold" { "Add Expense" }

            (expense_form_fields(&defaults, &CATEGORIES))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Expense" }
        }
    )
}

fn filter_form(query: &FilterQuery) -> Markup {
    let extra_category = (!query.category.is_empty()
        && !CATEGORIES.contains(&query.category.as_str()))
    .then_some(query.category.as_str());

    html!(
        form
            id="filter-expenses"
            method="get"
            action=(endpoints::ROOT)
            class="w-full space-y-4 p-4 bg-white rounded shadow-sm dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold" { "Filter" }

            div
            {
                label for="start" class=(FORM_LABEL_STYLE) { "From" }

                input
                    name="start"
                    id="start"
                    type="date"
                    value=(query.start)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end" class=(FORM_LABEL_STYLE) { "To" }

                input
                    name="end"
                    id="end"
                    type="date"
                    value=(query.end)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="filter-category" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    name="category"
                    id="filter-category"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[query.category.is_empty()] { "All categories" }

                    @for category in CATEGORIES {
                        option value=(category) selected[query.category == category]
                        {
                            (category)
                        }
                    }

                    @if let Some(category) = extra_category {
                        option value=(category) selected { (category) }
                    }
                }
            }

            div class="flex gap-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
                a href=(endpoints::ROOT) class=(BUTTON_SECONDARY_STYLE) { "Clear" }
            }
        }
    )
}

fn expenses_table(expenses: &[Expense]) -> Markup {
    let table_row = |expense: &Expense| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_EXPENSE, expense.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id);
        let confirm_message = format!(
            "return confirm('Are you sure you want to delete \"{}\"?')",
            expense.description.as_ref().replace(['\'', '"', '\\'], "")
        );

        html!(
            tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
            {
                td class=(TABLE_CELL_STYLE) { (expense.date) }
                td class=(TABLE_CELL_STYLE) { (expense.description) }
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (expense.category) }
                }
                td class="px-6 py-4 text-right tabular-nums"
                {
                    (format_currency(expense.amount))
                }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                        form method="post" action=(delete_url) onsubmit=(confirm_message)
                        {
                            button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                        }
                    }
                }
            }
        )
    };

    html!(
        section class="dark:bg-gray-800 w-full overflow-x-auto"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        (table_row(expense))
                    }

                    @if expenses.is_empty() {
                        tr
                        {
                            td
                                colspan="5"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No expenses found."
                            }
                        }
                    }
                }
            }
        }
    )
}
