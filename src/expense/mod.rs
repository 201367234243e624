//! Expense tracking: storage, filtering, charts and the pages for managing expenses.

mod charts;
mod create;
pub(crate) mod db;
mod delete;
mod domain;
mod edit;
mod export;
mod form;
mod list;
mod path;
pub(crate) mod query;

pub use create::create_expense_endpoint;
pub use db::{
    create_expense, create_expense_table, delete_expense, get_all_expenses, get_expense,
    update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{
    CATEGORIES, Category, Description, Expense, ExpenseId, MAX_CATEGORY_LENGTH,
    MAX_DESCRIPTION_LENGTH, NewExpense,
};
pub use edit::{edit_expense_endpoint, get_edit_expense_page};
pub use export::export_csv_endpoint;
pub use list::get_expenses_page;
pub use path::ExpenseIdPath;
