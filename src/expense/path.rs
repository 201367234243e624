//! Extractor for the `{expense_id}` route parameter.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::{Error, expense::ExpenseId};

/// The expense ID from the request path.
///
/// An ID that is not an integer cannot name an expense, so it is rejected
/// with [Error::NotFound] rather than a 400 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseIdPath(pub ExpenseId);

impl<S> FromRequestParts<S> for ExpenseIdPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<ExpenseId>::from_request_parts(parts, state)
            .await
            .map(|Path(expense_id)| Self(expense_id))
            .map_err(|rejection| {
                tracing::debug!("invalid expense ID in {}: {rejection}", parts.uri.path());
                Error::NotFound
            })
    }
}
