use thiserror::Error;

/// Errors raised while parsing a path expression or editing a tree through one.
///
/// These signal a caller contract violation (a malformed path, an insert into
/// something that is not an array). Data conditions such as a missing
/// resource never produce an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Malformed path '{path}' at offset {offset}: {message}")]
    Malformed {
        path: String,
        offset: usize,
        message: String,
    },

    #[error("Insert path '{0}' must end in an array index, e.g. '[1]'")]
    InsertNotIndexed(String),

    #[error("Insert target at '{0}' is not an array")]
    NotAnArray(String),

    #[error("Index {index} is out of bounds for the array at '{path}' (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Cannot write through '{0}': the parent value is neither an object nor an array")]
    NotAContainer(String),

    #[error("The root of a tree cannot be removed")]
    RemoveRoot,
}

/// Errors that can occur while loading dialogs or resource collections from JSON.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
