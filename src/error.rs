use std::fmt;

/// Error type for collection operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Operation needs at least one entry
    Empty {
        operation: &'static str,
    },
    /// Requested more entries than the collection holds
    OutOfRange {
        operation: &'static str,
        requested: usize,
        size: usize,
    },
    /// A value could not be encoded
    Serialization {
        context: String,
    },
    /// Input could not be decoded into a collection
    Deserialization {
        context: String,
    },
}

impl CollectionError {
    pub fn empty(operation: &'static str) -> Self {
        CollectionError::Empty { operation }
    }

    pub fn out_of_range(operation: &'static str, requested: usize, size: usize) -> Self {
        CollectionError::OutOfRange {
            operation,
            requested,
            size,
        }
    }

    pub fn serialization(context: impl Into<String>) -> Self {
        CollectionError::Serialization {
            context: context.into(),
        }
    }

    pub fn deserialization(context: impl Into<String>) -> Self {
        CollectionError::Deserialization {
            context: context.into(),
        }
    }

    /// True for errors caused by calling an operation on a collection that
    /// cannot satisfy it (empty, or too few entries).
    pub fn is_precondition(&self) -> bool {
        matches!(self, CollectionError::Empty { .. } | CollectionError::OutOfRange { .. })
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::Empty { operation } => {
                write!(f, "{} called on an empty collection", operation)
            }
            CollectionError::OutOfRange { operation, requested, size } => {
                write!(f, "{} requested {} entries but collection holds {}", operation, requested, size)
            }
            CollectionError::Serialization { context } => {
                write!(f, "Serialization error: {}", context)
            }
            CollectionError::Deserialization { context } => {
                write!(f, "Deserialization error: {}", context)
            }
        }
    }
}

impl std::error::Error for CollectionError {}

impl From<serde_json::Error> for CollectionError {
    fn from(error: serde_json::Error) -> Self {
        // Encoding paths map their own errors; anything arriving here came from decoding.
        CollectionError::deserialization(error.to_string())
    }
}

/// Result type alias for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Extension trait for functional error handling
pub trait ResultExt<T> {
    /// Replace the error's context, keeping its kind
    fn context(self, context: impl Into<String>) -> CollectionResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<CollectionError>,
{
    fn context(self, context: impl Into<String>) -> CollectionResult<T> {
        self.map_err(|e| {
            let mut err = e.into();
            match &mut err {
                CollectionError::Serialization { context: ctx } => *ctx = context.into(),
                CollectionError::Deserialization { context: ctx } => *ctx = context.into(),
                _ => {}
            }
            err
        })
    }
}
