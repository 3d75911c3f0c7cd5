//! Lexicon registry and validation entry points
//!
//! # Example
//!
//! ```rust
//! use atproto_lexicon::{LexValue, LexiconDoc, Lexicons};
//! use serde_json::json;
//!
//! let doc = LexiconDoc::from_value(json!({
//!     "lexicon": 1,
//!     "id": "com.example.post",
//!     "defs": {
//!         "main": {
//!             "type": "record",
//!             "record": {
//!                 "type": "object",
//!                 "required": ["text"],
//!                 "properties": { "text": { "type": "string", "maxGraphemes": 300 } }
//!             }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let mut lexicons = Lexicons::new();
//! lexicons.add(doc).unwrap();
//!
//! let record = LexValue::from(json!({ "$type": "com.example.post", "text": "hello" }));
//! assert!(lexicons.assert_valid_record("com.example.post", &record).is_ok());
//! ```

use crate::resolution::{self, LexUri, RefResolutionError, LEX_PREFIX};
use crate::schema::LexiconDoc;
use crate::types::{LexRecord, LexType};
use crate::validation::{ValidationError, Validator, Violation};
use crate::value::LexValue;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for a [`Lexicons`] registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LexiconsConfig {
    /// Maximum number of consecutive ref/union hops followed before a value
    /// level is consumed
    pub max_ref_depth: usize,
}

impl Default for LexiconsConfig {
    fn default() -> Self {
        Self { max_ref_depth: 32 }
    }
}

impl LexiconsConfig {
    /// Set the maximum ref/union hop count
    pub fn with_max_ref_depth(mut self, max_ref_depth: usize) -> Self {
        self.max_ref_depth = max_ref_depth;
        self
    }
}

/// Collection of registered Lexicon documents
///
/// Documents are added during setup through `&mut self` and are never
/// removed or replaced; afterwards the registry is read-only and can be
/// shared across threads behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Lexicons {
    docs: IndexMap<String, LexiconDoc>,
    config: LexiconsConfig,
}

impl Lexicons {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with a custom configuration
    pub fn with_config(config: LexiconsConfig) -> Self {
        Self {
            docs: IndexMap::new(),
            config,
        }
    }

    /// Create a registry from a batch of documents, failing on the first
    /// duplicate id
    pub fn from_docs(docs: impl IntoIterator<Item = LexiconDoc>) -> Result<Self> {
        let mut lexicons = Self::new();
        for doc in docs {
            lexicons.add(doc)?;
        }
        Ok(lexicons)
    }

    /// The registry configuration
    pub fn config(&self) -> &LexiconsConfig {
        &self.config
    }

    /// Register a document
    ///
    /// Fails without modifying the registry if the id is already present.
    pub fn add(&mut self, doc: LexiconDoc) -> Result<()> {
        if self.docs.contains_key(&doc.id) {
            return Err(Error::Registration(doc.id));
        }
        debug!(nsid = %doc.id, defs = doc.defs.len(), "Registered lexicon");
        self.docs.insert(doc.id.clone(), doc);
        Ok(())
    }

    /// Get a document by NSID, with or without the `lex:` prefix
    pub fn get(&self, nsid: &str) -> Option<&LexiconDoc> {
        self.docs.get(nsid.strip_prefix(LEX_PREFIX).unwrap_or(nsid))
    }

    /// Check if a document is registered
    pub fn contains(&self, nsid: &str) -> bool {
        self.get(nsid).is_some()
    }

    /// Number of registered documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Registered document ids, in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.docs.keys().map(String::as_str)
    }

    /// Look up the definition a parsed URI addresses
    pub fn resolve(&self, uri: &LexUri) -> resolution::Result<&LexType> {
        let doc = self
            .docs
            .get(&uri.nsid)
            .ok_or_else(|| RefResolutionError::SchemaNotFound(uri.nsid.clone()))?;
        doc.def(&uri.name)
            .ok_or_else(|| RefResolutionError::DefNotFound {
                nsid: uri.nsid.clone(),
                def: uri.name.clone(),
            })
    }

    /// Resolve a global reference (`nsid`, `nsid#name`, optionally
    /// `lex:`-prefixed) to its definition
    pub fn get_def(&self, reference: &str) -> Result<&LexType> {
        let uri = LexUri::parse(reference, None)?;
        Ok(self.resolve(&uri)?)
    }

    /// Validate a value against any definition
    ///
    /// A `record` definition validates its record object under the root
    /// label `Record` without checking `$type`; anything else is rooted at
    /// `Object`.
    pub fn validate(&self, reference: &str, value: &LexValue) -> Result<()> {
        let uri = LexUri::parse(reference, None)?;
        let validator = Validator::new(self);
        match self.resolve(&uri)? {
            LexType::Record(record) => {
                validator.validate_object(&uri.nsid, &record.record, value, "Record")
            }
            def => validator.validate(&uri.nsid, def, value, "Object", 0),
        }
    }

    /// Validate a repository record against its collection's `record` def
    pub fn assert_valid_record(&self, nsid: &str, value: &LexValue) -> Result<()> {
        let (uri, record) = self.record_def(nsid)?;

        if value.as_object().is_none() {
            return Err(ValidationError::new("Record", Violation::NotObject).into());
        }
        let type_id = value
            .get("$type")
            .and_then(LexValue::as_str)
            .ok_or_else(|| ValidationError::new("Record/$type", Violation::NotString))?;

        let expected = uri.to_string();
        let matches = LexUri::parse(type_id, None)
            .map(|given| given == uri)
            .unwrap_or(false);
        if !matches {
            return Err(ValidationError::new(
                "",
                Violation::RecordTypeMismatch {
                    expected,
                    actual: type_id.to_string(),
                },
            )
            .into());
        }

        Validator::new(self).validate_object(&uri.nsid, &record.record, value, "Record")
    }

    /// Validate XRPC query-string parameters
    ///
    /// A method without `parameters` accepts any params.
    pub fn assert_valid_xrpc_params(&self, nsid: &str, value: &LexValue) -> Result<()> {
        let uri = LexUri::parse(nsid, None)?;
        let parameters = match self.resolve(&uri)? {
            LexType::Query(query) => query.parameters.as_ref(),
            LexType::Procedure(procedure) => procedure.parameters.as_ref(),
            _ => return Err(invalid_def_type(&uri, "query or procedure")),
        };

        match parameters {
            Some(params) => Validator::new(self).validate_params(&uri.nsid, params, value, "Params"),
            None => Ok(()),
        }
    }

    /// Validate a procedure's input body
    ///
    /// A procedure without an input schema accepts any body.
    pub fn assert_valid_xrpc_input(&self, nsid: &str, value: &LexValue) -> Result<()> {
        let uri = LexUri::parse(nsid, None)?;
        let input = match self.resolve(&uri)? {
            LexType::Procedure(procedure) => procedure.input.as_ref(),
            _ => return Err(invalid_def_type(&uri, "procedure")),
        };

        match input.and_then(|body| body.schema.as_deref()) {
            Some(schema) => Validator::new(self).validate(&uri.nsid, schema, value, "Input", 0),
            None => Ok(()),
        }
    }

    /// Validate a query's or procedure's output body
    ///
    /// A method without an output schema accepts any body.
    pub fn assert_valid_xrpc_output(&self, nsid: &str, value: &LexValue) -> Result<()> {
        let uri = LexUri::parse(nsid, None)?;
        let output = match self.resolve(&uri)? {
            LexType::Query(query) => query.output.as_ref(),
            LexType::Procedure(procedure) => procedure.output.as_ref(),
            _ => return Err(invalid_def_type(&uri, "query or procedure")),
        };

        match output.and_then(|body| body.schema.as_deref()) {
            Some(schema) => Validator::new(self).validate(&uri.nsid, schema, value, "Output", 0),
            None => Ok(()),
        }
    }

    pub(crate) fn record_def(&self, nsid: &str) -> Result<(LexUri, &LexRecord)> {
        let uri = LexUri::parse(nsid, None)?;
        match self.resolve(&uri)? {
            LexType::Record(record) => Ok((uri, record)),
            _ => Err(invalid_def_type(&uri, "record")),
        }
    }
}

fn invalid_def_type(uri: &LexUri, expected: &str) -> Error {
    Error::InvalidDefType {
        uri: uri.to_string(),
        expected: expected.to_string(),
    }
}
