//! Filtered queries and aggregate breakdowns over the expense table.

use rusqlite::{Connection, named_params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    expense::{Category, Expense, db::map_row, domain::parse_date_or_none},
};

/// The filter window exactly as the user typed it into the query string.
///
/// Missing parameters deserialize to empty strings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
}

impl FilterQuery {
    /// Remove surrounding whitespace from every parameter.
    pub(crate) fn trimmed(self) -> Self {
        Self {
            start: self.start.trim().to_owned(),
            end: self.end.trim().to_owned(),
            category: self.category.trim().to_owned(),
        }
    }

    /// `route` with the non-empty parameters appended as a query string.
    pub(crate) fn to_url(&self, route: &str) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{route}?{query}"),
            Ok(_) => route.to_owned(),
            Err(error) => {
                tracing::warn!("could not encode filter {self:?}: {error}");
                route.to_owned()
            }
        }
    }
}

/// The parsed filter window: optional inclusive date bounds and an exact category match.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub start: Option<Date>,
    pub end: Option<Date>,
    pub category: Option<String>,
}

impl ExpenseFilter {
    /// Parse the filter window from `query`, ignoring dates that are not valid ISO dates.
    pub(crate) fn from_query(query: &FilterQuery) -> Self {
        let category = query.category.trim();

        Self {
            start: parse_date_or_none(&query.start),
            end: parse_date_or_none(&query.end),
            category: (!category.is_empty()).then(|| category.to_owned()),
        }
    }

    /// Whether both bounds are set and the start comes after the end.
    pub(crate) fn has_inverted_range(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    /// The same filter with both date bounds removed.
    pub(crate) fn without_dates(self) -> Self {
        Self {
            start: None,
            end: None,
            ..self
        }
    }
}

/// The order to sort expenses in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first, ties broken by lowest ID.
    Ascending,
    /// Newest first, ties broken by highest ID.
    Descending,
}

// Each bound is skipped when its parameter is NULL.
const FILTER_CLAUSE: &str = "(:start IS NULL OR date >= :start) \
    AND (:end IS NULL OR date <= :end) \
    AND (:category IS NULL OR category = :category)";

/// Get the expenses matching `filter`, sorted by date and then ID in `sort_order`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn get_filtered_expenses(
    filter: &ExpenseFilter,
    sort_order: SortOrder,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let order_clause = match sort_order {
        SortOrder::Ascending => "ORDER BY date ASC, id ASC",
        SortOrder::Descending => "ORDER BY date DESC, id DESC",
    };

    let query = format!(
        "SELECT id, description, amount, category, date FROM expense \
        WHERE {FILTER_CLAUSE} {order_clause}"
    );

    connection
        .prepare(&query)?
        .query_map(
            named_params! {
                ":start": filter.start,
                ":end": filter.end,
                ":category": filter.category,
            },
            map_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Sum the amounts of the expenses matching `filter` for each category.
///
/// There is one entry per category present in the filtered expenses, ordered
/// by category name, with each sum rounded to cents.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn get_category_totals(
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<Vec<(Category, f64)>, Error> {
    let query = format!(
        "SELECT category, SUM(amount) FROM expense \
        WHERE {FILTER_CLAUSE} GROUP BY category ORDER BY category ASC"
    );

    connection
        .prepare(&query)?
        .query_map(
            named_params! {
                ":start": filter.start,
                ":end": filter.end,
                ":category": filter.category,
            },
            |row| {
                let category: String = row.get(0)?;
                let total: f64 = row.get(1)?;

                Ok((Category::new_unchecked(&category), round_to_cents(total)))
            },
        )?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

/// Sum the amounts of the expenses matching `filter` for each day, oldest day first.
///
/// Days without expenses are omitted. Each sum is rounded to cents.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn get_daily_totals(
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<Vec<(Date, f64)>, Error> {
    let query = format!(
        "SELECT date, SUM(amount) FROM expense \
        WHERE {FILTER_CLAUSE} GROUP BY date ORDER BY date ASC"
    );

    connection
        .prepare(&query)?
        .query_map(
            named_params! {
                ":start": filter.start,
                ":end": filter.end,
                ":category": filter.category,
            },
            |row| {
                let date: Date = row.get(0)?;
                let total: f64 = row.get(1)?;

                Ok((date, round_to_cents(total)))
            },
        )?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

/// The sum of the expense amounts, rounded to cents.
pub(crate) fn total_amount(expenses: &[Expense]) -> f64 {
    round_to_cents(expenses.iter().map(|expense| expense.amount).sum())
}

/// Round `amount` to two decimal places.
pub(crate) fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}


#[cfg(test)]
mod query_tests {
    use time::macros::date;

    use crate::expense::{
        Category,
        db::test_utils::{get_test_connection, must_create_expense},
    };

    use super::{
        ExpenseFilter, SortOrder, get_category_totals, get_daily_totals, get_filtered_expenses,
        round_to_cents, total_amount,
    };

    #[test]
    fn no_filter_returns_everything_newest_first() {
        let connection = get_test_connection();
        let a = must_create_expense("A", 1.0, "Food", date!(2024 - 01 - 01), &connection);
        let b = must_create_expense("B", 2.0, "Rent", date!(2024 - 01 - 02), &connection);
        let c = must_create_expense("C", 3.0, "Food", date!(2024 - 01 - 02), &connection);

        let got = get_filtered_expenses(&ExpenseFilter::default(), SortOrder::Descending, &connection)
            .unwrap();

        assert_eq!(got, vec![c, b, a]);
    }

    #[test]
    fn ascending_order_sorts_by_date_then_id() {
        let connection = get_test_connection();
        let a = must_create_expense("A", 1.0, "Food", date!(2024 - 01 - 02), &connection);
        let b = must_create_expense("B", 2.0, "Rent", date!(2024 - 01 - 01), &connection);
        let c = must_create_expense("C", 3.0, "Food", date!(2024 - 01 - 02), &connection);

        let got = get_filtered_expenses(&ExpenseFilter::default(), SortOrder::Ascending, &connection)
            .unwrap();

        assert_eq!(got, vec![b, a, c]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let connection = get_test_connection();
        must_create_expense("Before", 1.0, "Food", date!(2023 - 12 - 31), &connection);
        let first = must_create_expense("First", 1.0, "Food", date!(2024 - 01 - 01), &connection);
        let last = must_create_expense("Last", 1.0, "Food", date!(2024 - 01 - 31), &connection);
        must_create_expense("After", 1.0, "Food", date!(2024 - 02 - 01), &connection);
        let filter = ExpenseFilter {
            start: Some(date!(2024 - 01 - 01)),
            end: Some(date!(2024 - 01 - 31)),
            category: None,
        };

        let got = get_filtered_expenses(&filter, SortOrder::Ascending, &connection).unwrap();

        assert_eq!(got, vec![first, last]);
    }

    #[test]
    fn category_filter_is_exact() {
        let connection = get_test_connection();
        let food = must_create_expense("Lunch", 10.0, "Food", date!(2024 - 01 - 01), &connection);
        must_create_expense("Snack", 2.0, "food", date!(2024 - 01 - 01), &connection);
        must_create_expense("Bus", 3.0, "Transport", date!(2024 - 01 - 01), &connection);
        let filter = ExpenseFilter {
            category: Some("Food".to_owned()),
            ..Default::default()
        };

        let got = get_filtered_expenses(&filter, SortOrder::Descending, &connection).unwrap();

        assert_eq!(got, vec![food]);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let connection = get_test_connection();
        must_create_expense("Lunch", 10.0, "Food", date!(2024 - 01 - 15), &connection);
        let filter = ExpenseFilter {
            start: Some(date!(2024 - 02 - 01)),
            end: Some(date!(2024 - 01 - 01)),
            category: None,
        };

        let got = get_filtered_expenses(&filter, SortOrder::Ascending, &connection).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn category_totals_group_and_round() {
        let connection = get_test_connection();
        must_create_expense("Lunch", 10.1, "Food", date!(2024 - 01 - 01), &connection);
        must_create_expense("Dinner", 20.2, "Food", date!(2024 - 01 - 02), &connection);
        must_create_expense("Bus", 3.0, "Transport", date!(2024 - 01 - 01), &connection);

        let got = get_category_totals(&ExpenseFilter::default(), &connection).unwrap();

        assert_eq!(
            got,
            vec![
                (Category::new_unchecked("Food"), 30.3),
                (Category::new_unchecked("Transport"), 3.0),
            ]
        );
    }

    #[test]
    fn daily_totals_are_oldest_first() {
        let connection = get_test_connection();
        must_create_expense("Lunch", 10.0, "Food", date!(2024 - 01 - 02), &connection);
        must_create_expense("Bus", 3.0, "Transport", date!(2024 - 01 - 01), &connection);
        must_create_expense("Dinner", 5.5, "Food", date!(2024 - 01 - 02), &connection);
        let filter = ExpenseFilter {
            category: Some("Food".to_owned()),
            ..Default::default()
        };

        let all = get_daily_totals(&ExpenseFilter::default(), &connection).unwrap();
        let food = get_daily_totals(&filter, &connection).unwrap();

        assert_eq!(
            all,
            vec![(date!(2024 - 01 - 01), 3.0), (date!(2024 - 01 - 02), 15.5)]
        );
        assert_eq!(food, vec![(date!(2024 - 01 - 02), 15.5)]);
    }

    #[test]
    fn total_amount_rounds_to_cents() {
        let connection = get_test_connection();
        let expenses = vec![
            must_create_expense("A", 0.1, "Food", date!(2024 - 01 - 01), &connection),
            must_create_expense("B", 0.2, "Food", date!(2024 - 01 - 01), &connection),
        ];

        assert_eq!(total_amount(&expenses), 0.3);
        assert_eq!(total_amount(&[]), 0.0);
        assert_eq!(round_to_cents(12.344), 12.34);
    }
}
