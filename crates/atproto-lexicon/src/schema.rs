//! Lexicon document structure
//!
//! A document is an identifier, a language version and a map of named
//! definitions. `defs["main"]` is addressable by the bare document id.

use crate::types::LexType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of a document's primary definition
pub const MAIN_DEF: &str = "main";

/// Top-level Lexicon document
///
/// Reference: <https://atproto.com/specs/lexicon>
///
/// # Example
///
/// ```json
/// {
///   "lexicon": 1,
///   "id": "com.example.getRecord",
///   "description": "Get a record by URI",
///   "defs": {
///     "main": {
///       "type": "query",
///       "parameters": { ... },
///       "output": { ... }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconDoc {
    /// Lexicon language version (must be 1)
    pub lexicon: u32,

    /// NSID identifier for this lexicon
    pub id: String,

    /// Revision number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Map of named definitions
    pub defs: IndexMap<String, LexType>,
}

impl LexiconDoc {
    /// Create a new Lexicon document
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            lexicon: 1,
            id: id.into(),
            revision: None,
            description: None,
            defs: IndexMap::new(),
        }
    }

    /// Add a definition to the document
    pub fn with_def(mut self, name: impl Into<String>, def: LexType) -> Self {
        self.defs.insert(name.into(), def);
        self
    }

    /// Get the main definition (if it exists)
    pub fn main_def(&self) -> Option<&LexType> {
        self.defs.get(MAIN_DEF)
    }

    /// Get a definition by name
    pub fn def(&self, name: &str) -> Option<&LexType> {
        self.defs.get(name)
    }
}
