//! Alert messages for telling the user whether their last action succeeded.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// A success or error message shown at the top of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Alert {
    Success(String),
    Error(String),
}

impl Alert {
    pub fn success(message: &str) -> Self {
        Self::Success(message.to_owned())
    }

    pub fn error(message: &str) -> Self {
        Self::Error(message.to_owned())
    }

    pub fn message(&self) -> &str {
        match self {
            Alert::Success(message) | Alert::Error(message) => message,
        }
    }

    pub fn into_html(self) -> Markup {
        let (role, style) = match self {
            Alert::Success(_) => (
                "status",
                "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
                dark:bg-gray-800 dark:text-green-400",
            ),
            Alert::Error(_) => (
                "alert",
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400",
            ),
        };

        html! {
            div
                id="alert"
                role=(role)
                class=(style)
            {
                p { (self.message()) }
            }
        }
    }
}
