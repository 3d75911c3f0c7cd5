//! Lexicon reference resolution
//!
//! References can be local (`#defName`), global (`nsid` or `nsid#defName`),
//! and may carry an optional `lex:` prefix. A reference is parsed into a
//! [`LexUri`] relative to the document it appears in, then looked up in the
//! registry lazily at validation time.

use crate::schema::MAIN_DEF;
use std::fmt;
use thiserror::Error;

/// URI scheme prefix of canonical definition identifiers
pub const LEX_PREFIX: &str = "lex:";

/// Errors that can occur during reference resolution
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefResolutionError {
    /// Schema not found in registry
    #[error("Lexicon not found: {0}")]
    SchemaNotFound(String),

    /// Definition not found in schema
    #[error("Definition '{def}' not found in lexicon '{nsid}'")]
    DefNotFound {
        /// The NSID of the schema
        nsid: String,
        /// The definition name
        def: String,
    },

    /// Invalid reference format
    #[error("{0}")]
    InvalidRef(String),

    /// Too many consecutive ref/union hops
    #[error("Reference resolution depth exceeded (max: {max}) at {path}")]
    DepthExceeded {
        /// Maximum allowed hops
        max: usize,
        /// Value path where the limit was hit
        path: String,
    },

    /// A definition that cannot describe a field value was reached
    #[error("Unexpected lexicon type \"{kind}\" at {path}")]
    UnexpectedType {
        /// The definition's type discriminator
        kind: String,
        /// Value path where it was reached
        path: String,
    },
}

/// Result type for reference resolution operations
pub type Result<T> = std::result::Result<T, RefResolutionError>;

/// A fully-qualified definition address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexUri {
    /// Document NSID
    pub nsid: String,

    /// Definition name within the document
    pub name: String,
}

impl LexUri {
    /// Create a definition address
    pub fn new(nsid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            nsid: nsid.into(),
            name: name.into(),
        }
    }

    /// Parse a reference string
    ///
    /// `base` is the NSID of the document the reference appears in. It is
    /// required for local `#name` references.
    ///
    /// # Example
    ///
    /// ```
    /// use atproto_lexicon::LexUri;
    ///
    /// let uri = LexUri::parse("#object", Some("com.example.kitchenSink")).unwrap();
    /// assert_eq!(uri.to_string(), "lex:com.example.kitchenSink#object");
    ///
    /// let uri = LexUri::parse("lex:com.example.kitchenSink#main", None).unwrap();
    /// assert_eq!(uri.to_string(), "lex:com.example.kitchenSink");
    /// ```
    pub fn parse(reference: &str, base: Option<&str>) -> Result<Self> {
        let body = reference.strip_prefix(LEX_PREFIX).unwrap_or(reference);

        let mut parts = body.split('#');
        let nsid = parts.next().unwrap_or_default();
        let fragment = parts.next();
        if parts.next().is_some() {
            return Err(RefResolutionError::InvalidRef(
                "Uri can only have one hash segment".to_string(),
            ));
        }

        let nsid = if nsid.is_empty() {
            match base {
                Some(base) if fragment.is_some() => base,
                _ => {
                    return Err(RefResolutionError::InvalidRef(format!(
                        "Unable to resolve uri without anchor: {reference}"
                    )))
                }
            }
        } else {
            nsid
        };

        let name = match fragment {
            None => MAIN_DEF,
            Some("") => {
                return Err(RefResolutionError::InvalidRef(format!(
                    "Empty definition name in {reference}"
                )))
            }
            Some(name) => name,
        };

        Ok(Self::new(nsid, name))
    }

    /// Whether this addresses a document's main definition
    pub fn is_main(&self) -> bool {
        self.name == MAIN_DEF
    }
}

impl fmt::Display for LexUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_main() {
            write!(f, "{}{}", LEX_PREFIX, self.nsid)
        } else {
            write!(f, "{}{}#{}", LEX_PREFIX, self.nsid, self.name)
        }
    }
}

/// Render a reference in canonical `lex:` form
pub fn to_lex_uri(reference: &str, base: Option<&str>) -> Result<String> {
    LexUri::parse(reference, base).map(|uri| uri.to_string())
}
