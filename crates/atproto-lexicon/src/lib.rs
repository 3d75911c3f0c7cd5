//! AT Protocol Lexicon schema registry and validation
//!
//! This crate loads Lexicon schema documents, resolves references between
//! them and validates untyped values against them: repository records,
//! XRPC parameters and XRPC input/output bodies.
//!
//! # Example
//!
//! ```rust
//! use atproto_lexicon::{LexValue, LexiconDoc, Lexicons};
//! use serde_json::json;
//!
//! let doc = LexiconDoc::from_json(r#"{
//!     "lexicon": 1,
//!     "id": "com.example.getProfile",
//!     "defs": {
//!         "main": {
//!             "type": "query",
//!             "parameters": {
//!                 "type": "params",
//!                 "required": ["actor"],
//!                 "properties": { "actor": { "type": "string", "format": "at-identifier" } }
//!             }
//!         }
//!     }
//! }"#)
//! .unwrap();
//!
//! let lexicons = Lexicons::from_docs([doc]).unwrap();
//!
//! let err = lexicons
//!     .assert_valid_xrpc_params("com.example.getProfile", &LexValue::from(json!({})))
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "Params must have the property \"actor\"");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constraints;
pub mod defaults;
pub mod formats;
pub mod parsing;
pub mod registry;
pub mod resolution;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

pub use constraints::*;
pub use formats::*;
pub use parsing::LexiconParseError;
pub use registry::{Lexicons, LexiconsConfig};
pub use resolution::{LexUri, RefResolutionError};
pub use schema::LexiconDoc;
pub use types::*;
pub use validation::{ValidationError, Violation};
pub use value::LexValue;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for registry operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document with the same id is already registered
    #[error("Lexicon {0} already registered")]
    Registration(String),

    /// A reference does not resolve to a known definition
    #[error(transparent)]
    Resolution(#[from] RefResolutionError),

    /// The value failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A document failed to parse
    #[error(transparent)]
    Parse(#[from] LexiconParseError),

    /// The addressed definition is of the wrong kind for the entry point
    #[error("Lexicon def {uri} is not a {expected}")]
    InvalidDefType {
        /// Canonical `lex:` id of the definition
        uri: String,
        /// The kind the entry point needs
        expected: String,
    },
}

impl Error {
    /// The validation failure, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }
}
