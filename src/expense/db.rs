//! Database operations for expenses.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    expense::{Category, Description, Expense, ExpenseId, NewExpense},
};

/// Create an expense and return it with its generated ID.
pub fn create_expense(expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (description, amount, category, date) VALUES (?1, ?2, ?3, ?4);",
        (
            expense.description.as_ref(),
            expense.amount,
            expense.category.as_ref(),
            expense.date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Expense {
        id,
        description: expense.description,
        amount: expense.amount,
        category: expense.category,
        date: expense.date,
    })
}

/// Retrieve a single expense by ID.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare("SELECT id, description, amount, category, date FROM expense WHERE id = :id;")?
        .query_row(&[(":id", &expense_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve every expense, oldest first.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare("SELECT id, description, amount, category, date FROM expense ORDER BY date ASC, id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Overwrite every field of an expense. Returns an error if the expense doesn't exist.
pub fn update_expense(
    expense_id: ExpenseId,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET description = ?1, amount = ?2, category = ?3, date = ?4 WHERE id = ?5",
        (
            expense.description.as_ref(),
            expense.amount,
            expense.category.as_ref(),
            expense.date,
            expense_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete an expense by ID. Returns an error if the expense doesn't exist.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Initialize the expense table and indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
    )?;

    Ok(())
}

pub(crate) fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_description: String = row.get(1)?;
    let amount = row.get(2)?;
    let raw_category: String = row.get(3)?;
    let date = row.get(4)?;

    Ok(Expense {
        id,
        description: Description::new_unchecked(&raw_description),
        amount,
        category: Category::new_unchecked(&raw_category),
        date,
    })
}
