//! Form fields shared by the add and edit expense forms.

use maud::{Markup, html};
use time::Date;

use crate::{
    expense::MAX_DESCRIPTION_LENGTH,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

pub struct ExpenseFormDefaults<'a> {
    pub description: Option<&'a str>,
    pub amount: Option<f64>,
    pub category: Option<&'a str>,
    /// The date to prefill, or `None` to leave the field empty and let the server use today.
    pub date: Option<Date>,
    pub today: Date,
    pub autofocus_description: bool,
}

pub fn expense_form_fields(defaults: &ExpenseFormDefaults<'_>, categories: &[&str]) -> Markup {
    // The shortest text that parses back to the stored amount, so saving an
    // untouched form keeps the amount as is.
    let amount_str = defaults.amount.map(|amount| format!("{amount}"));
    // Keep a category from outside the suggested list selectable when editing.
    let extra_category = defaults
        .category
        .filter(|category| !categories.contains(category));

    html! {
        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                maxlength=(MAX_DESCRIPTION_LENGTH)
                required
                value=[defaults.description]
                autofocus[defaults.autofocus_description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="any"
                    placeholder="0.01"
                    min="0"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            select
                name="category"
                id="category"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @if defaults.category.is_none() {
                    option value="" selected disabled { "Select a category" }
                }

                @for category in categories {
                    @if Some(*category) == defaults.category {
                        option value=(category) selected { (category) }
                    } @else {
                        option value=(category) { (category) }
                    }
                }

                @if let Some(category) = extra_category {
                    option value=(category) selected { (category) }
                }
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                value=[defaults.date]
                class=(FORM_TEXT_INPUT_STYLE);

            p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
            {
                "Leave empty to use today (" (defaults.today) ")."
            }
        }
    }
}
