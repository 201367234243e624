//! Core expense domain types and form validation.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::Error;

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// The maximum number of characters in an expense description.
pub const MAX_DESCRIPTION_LENGTH: usize = 120;

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_LENGTH: usize = 50;

/// The categories offered in the expense forms.
///
/// These are suggestions only, any non-empty category is accepted.
pub const CATEGORIES: [&str; 5] = ["Food", "Transport", "Rent", "Utilities", "Health"];

/// ISO 8601 calendar date, e.g. "2024-01-31".
pub(crate) const ISO_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

/// A validated, non-empty expense description of at most [MAX_DESCRIPTION_LENGTH] characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Description(String);

impl Description {
    /// Create a description from `text` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return:
    /// - [Error::MissingRequiredField] if `text` is empty or only whitespace,
    /// - [Error::DescriptionTooLong] if `text` is longer than [MAX_DESCRIPTION_LENGTH] characters.
    pub fn new(text: &str) -> Result<Self, Error> {
        let text = text.trim();

        if text.is_empty() {
            Err(Error::MissingRequiredField)
        } else if text.graphemes(true).count() > MAX_DESCRIPTION_LENGTH {
            Err(Error::DescriptionTooLong)
        } else {
            Ok(Self(text.to_owned()))
        }
    }

    /// Create a description without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, non-empty category name of at most [MAX_CATEGORY_LENGTH] characters.
///
/// The category does not have to be one of [CATEGORIES].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    /// Create a category from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return:
    /// - [Error::MissingRequiredField] if `name` is empty or only whitespace,
    /// - [Error::CategoryTooLong] if `name` is longer than [MAX_CATEGORY_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::MissingRequiredField)
        } else if name.graphemes(true).count() > MAX_CATEGORY_LENGTH {
            Err(Error::CategoryTooLong)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recorded expense.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The ID of the expense, assigned by the database.
    pub id: ExpenseId,
    /// What the money was spent on.
    pub description: Description,
    /// How much was spent, always greater than zero.
    pub amount: f64,
    /// The category used for grouping and filtering.
    pub category: Category,
    /// When the money was spent.
    pub date: Date,
}

/// The fields of an expense that has passed validation but has no ID yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// What the money was spent on.
    pub description: Description,
    /// How much was spent, always greater than zero.
    pub amount: f64,
    /// The category used for grouping and filtering.
    pub category: Category,
    /// When the money was spent.
    pub date: Date,
}

/// Form data for creating and editing an expense.
///
/// All fields are kept as text so that validation can report friendly errors
/// instead of rejecting the request outright.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseFormData {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl ExpenseFormData {
    /// Validate the form, returning the expense it describes.
    ///
    /// Checks are made in this order:
    /// 1. description, amount and category must be non-empty,
    /// 2. description and category must not be too long,
    /// 3. amount must be a positive number.
    ///
    /// An empty or unparseable date falls back to `today` and is not an error.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as an [Error] suitable for showing to the user.
    pub fn validate(&self, today: Date) -> Result<NewExpense, Error> {
        let description = self.description.trim();
        let amount = self.amount.trim();
        let category = self.category.trim();

        if description.is_empty() || amount.is_empty() || category.is_empty() {
            return Err(Error::MissingRequiredField);
        }

        let description = Description::new(description)?;
        let category = Category::new(category)?;
        let amount = parse_amount(amount)?;
        let date = parse_date_or_none(&self.date).unwrap_or(today);

        Ok(NewExpense {
            description,
            amount,
            category,
            date,
        })
    }
}

/// Parse a strictly positive, finite amount of money.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `text` is not a number, is not finite, or is not above zero.
pub fn parse_amount(text: &str) -> Result<f64, Error> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .ok_or(Error::InvalidAmount)
}

/// Parse an ISO 8601 date such as "2024-01-31", or `None` if `text` is empty or invalid.
pub fn parse_date_or_none(text: &str) -> Option<Date> {
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    Date::parse(text, ISO_DATE_FORMAT).ok()
}
