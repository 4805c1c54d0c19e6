//! Catalog error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Store(#[from] sea_orm::DbErr),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn venue_not_found(id: i32) -> Self {
        Self::NotFound { entity: "venue", id }
    }

    pub fn artist_not_found(id: i32) -> Self {
        Self::NotFound { entity: "artist", id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
