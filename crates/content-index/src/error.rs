use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate identifier {id:?}: declared by both {first} and {second}")]
    DuplicateIdentifier {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
