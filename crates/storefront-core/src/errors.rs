use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// HTTP-style status for the error envelope.
    pub fn status(&self) -> u16 {
        match self {
            CatalogError::BadRequest(_) => 400,
            CatalogError::NotFound(_) => 404,
            CatalogError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
