//! Error types for Cardsmith

use thiserror::Error;

/// Main error type for card editing, rendering and persistence
#[derive(Error, Debug)]
pub enum CardError {
    /// A loaded document failed shape validation and was rejected as a whole
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// A dynamic item (phone or social link) does not exist in the state
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Invalid operation for the addressed item
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// `begin_drag` was called while another drag is still active
    #[error("Drag already in progress for {0}")]
    DragInProgress(String),

    /// A drag move/end arrived without an active drag
    #[error("No active drag")]
    NoActiveDrag,

    /// QR code generation failed
    #[error("QR error: {0}")]
    Qr(String),

    /// Image upload collaborator failed
    #[error("Upload error: {0}")]
    Upload(String),

    /// Shareable link could not be parsed
    #[error("Invalid share link: {0}")]
    InvalidLink(String),

    /// Async work was cancelled because the active card changed
    #[error("Operation cancelled")]
    Cancelled,

    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CardError {
    fn from(err: serde_json::Error) -> Self {
        CardError::Serialization(err.to_string())
    }
}

/// Result type alias using CardError
pub type CardResult<T> = Result<T, CardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CardError::ItemNotFound("phone:01J0".to_string());
        assert_eq!(format!("{}", err), "Item not found: phone:01J0");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let card_err: CardError = io_err.into();
        assert!(matches!(card_err, CardError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let card_err: CardError = json_err.into();
        assert!(matches!(card_err, CardError::Serialization(_)));
    }
}
