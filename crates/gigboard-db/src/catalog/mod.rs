//! Query, search and mutation operations over venues, artists and shows.
//!
//! Every function takes the connection it should run on. Handlers pass the
//! pool from `AppState`; tests pass a mock connection.

pub mod aggregate;
pub mod artists;
pub mod shows;
pub mod venues;

use chrono::NaiveDateTime;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::ColumnTrait;

pub use aggregate::{Area, SearchResults, Summary, Timeline};

/// The instant shows are classified against.
pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Trim an optional text field, mapping blank values to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn require(field: &str, value: &str) -> crate::CatalogResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::CatalogError::validation(format!(
            "{field} is required"
        )));
    }
    Ok(trimmed.to_string())
}

/// `lower(column) LIKE pattern`, for patterns built by
/// [`aggregate::like_pattern`].
pub(crate) fn name_like<T: ColumnTrait>(column: T, pattern: String) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}
