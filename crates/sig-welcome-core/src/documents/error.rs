//! Error types for document parsing.

use crate::matching::PatternError;
use thiserror::Error;

/// A document could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The YAML structure is malformed or does not fit the schema.
    #[error("malformed {document}: {source}")]
    Yaml {
        /// Which document was being parsed.
        document: &'static str,
        /// The underlying decoding failure.
        #[source]
        source: serde_yaml::Error,
    },

    /// A path pattern in the relation document is not usable.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl ParseError {
    /// Creates a YAML error for the named document.
    pub fn yaml(document: &'static str, source: serde_yaml::Error) -> Self {
        Self::Yaml { document, source }
    }
}
