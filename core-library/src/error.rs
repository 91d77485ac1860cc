use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
