//! Thread-safe string-keyed collections with functional helpers

#[macro_use]
mod macros;

pub mod collection;
pub mod error;
mod utils;

pub use collection::{Collection, CollectionBuilder, Entry};
pub use error::{CollectionError, CollectionResult, ResultExt};
