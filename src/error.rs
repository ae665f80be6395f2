use thiserror::Error;

#[derive(Error, Debug)]
pub enum FillError {
    #[error("Worksheet '{sheet}' does not match any known layout: {details}")]
    LayoutMismatch { sheet: String, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FillError>;
