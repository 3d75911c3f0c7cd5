//! Lexicon type descriptors
//!
//! Every definition and every property in a Lexicon document is one
//! `LexType`, discriminated by its `type` field. Field-level kinds
//! (`string`, `object`, `ref`, ...) and top-level kinds (`record`,
//! `query`, `procedure`, `params`, `token`) share the one closed enum so
//! a reference always resolves to something the engine can match on.

use crate::constraints::*;
use crate::formats::StringFormat;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// String type with optional format and constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexString {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// String format (at-uri, did, handle, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,

    /// Constraints
    #[serde(flatten)]
    pub constraints: StringConstraints,
}

/// Integer type with constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexInteger {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Constraints
    #[serde(flatten)]
    pub constraints: IntegerConstraints,
}

/// Boolean type with constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexBoolean {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Constraints
    #[serde(flatten)]
    pub constraints: BooleanConstraints,
}

/// Bytes type (raw binary data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexBytes {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Constraints
    #[serde(flatten)]
    pub constraints: BytesConstraints,
}

/// CID link type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexCidLink {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Blob type (reference to uploaded binary data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexBlob {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Constraints
    #[serde(flatten)]
    pub constraints: BlobConstraints,
}

/// Array type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexArray {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Schema for array items
    pub items: Box<LexType>,

    /// Constraints
    #[serde(flatten)]
    pub constraints: ArrayConstraints,
}

/// Token type (named symbolic value with no data representation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexToken {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Object type with properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexObject {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Property schemas, in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, LexType>,

    /// Required property names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Property names that may be present with a `null` value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nullable: Vec<String>,
}

impl LexObject {
    /// Check if a property may hold `null`
    pub fn is_nullable(&self, name: &str) -> bool {
        self.nullable.iter().any(|n| n == name)
    }
}

/// Union type (one of several referenced object types)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexUnion {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Member references
    pub refs: Vec<String>,

    /// Whether the union is closed (only listed refs allowed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

impl LexUnion {
    /// Whether values with an unlisted `$type` are rejected
    pub fn is_closed(&self) -> bool {
        self.closed.unwrap_or(false)
    }
}

/// Unknown type (accepts any value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexUnknown {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reference to another definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexRef {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Reference string (`#name`, `nsid`, or `nsid#name`)
    #[serde(rename = "ref")]
    pub ref_to: String,
}

impl LexRef {
    /// Create a new reference
    pub fn new(ref_to: impl Into<String>) -> Self {
        Self {
            description: None,
            ref_to: ref_to.into(),
        }
    }

    /// Check if this is a local reference (starts with #)
    pub fn is_local(&self) -> bool {
        self.ref_to.starts_with('#')
    }
}

/// Record definition (storable in repository)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexRecord {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Record key strategy (`tid`, `any`, `nsid`, `literal:self`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Record schema
    pub record: LexObject,
}

/// XRPC parameters (HTTP query string params)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexParams {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Property schemas, limited to primitives and arrays of primitives
    #[serde(default)]
    pub properties: IndexMap<String, LexType>,

    /// Required property names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// XRPC input/output body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexXrpcBody {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Encoding (MIME type, e.g., "application/json")
    pub encoding: String,

    /// Schema for the body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<LexType>>,
}

/// XRPC error definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexXrpcError {
    /// Error name
    pub name: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query definition (HTTP GET endpoint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexQuery {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Query parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<LexParams>,

    /// Output body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<LexXrpcBody>,

    /// Possible errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<LexXrpcError>>,
}

/// Procedure definition (HTTP POST endpoint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LexProcedure {
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Query parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<LexParams>,

    /// Input body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<LexXrpcBody>,

    /// Output body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<LexXrpcBody>,

    /// Possible errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<LexXrpcError>>,
}

/// All possible Lexicon types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LexType {
    /// Boolean type
    Boolean(LexBoolean),

    /// Integer type
    Integer(LexInteger),

    /// String type
    String(LexString),

    /// Bytes type
    Bytes(LexBytes),

    /// CID link type
    #[serde(rename = "cid-link")]
    CidLink(LexCidLink),

    /// Blob type
    Blob(LexBlob),

    /// Array type
    Array(LexArray),

    /// Object type
    Object(LexObject),

    /// Token type
    Token(LexToken),

    /// Union type
    Union(LexUnion),

    /// Unknown type
    Unknown(LexUnknown),

    /// Reference to another definition
    Ref(LexRef),

    /// Record definition
    Record(LexRecord),

    /// XRPC parameters
    Params(LexParams),

    /// Query definition (GET endpoint)
    Query(LexQuery),

    /// Procedure definition (POST endpoint)
    Procedure(LexProcedure),
}

impl LexType {
    /// The `type` discriminator of this descriptor
    pub fn kind(&self) -> &'static str {
        match self {
            LexType::Boolean(_) => "boolean",
            LexType::Integer(_) => "integer",
            LexType::String(_) => "string",
            LexType::Bytes(_) => "bytes",
            LexType::CidLink(_) => "cid-link",
            LexType::Blob(_) => "blob",
            LexType::Array(_) => "array",
            LexType::Object(_) => "object",
            LexType::Token(_) => "token",
            LexType::Union(_) => "union",
            LexType::Unknown(_) => "unknown",
            LexType::Ref(_) => "ref",
            LexType::Record(_) => "record",
            LexType::Params(_) => "params",
            LexType::Query(_) => "query",
            LexType::Procedure(_) => "procedure",
        }
    }

    /// Whether this kind may only appear as a top-level definition
    pub fn is_top_level_only(&self) -> bool {
        matches!(
            self,
            LexType::Record(_) | LexType::Params(_) | LexType::Query(_) | LexType::Procedure(_)
        )
    }

    /// Whether this kind is allowed as an XRPC parameter value
    pub fn is_param_primitive(&self) -> bool {
        matches!(
            self,
            LexType::Boolean(_) | LexType::Integer(_) | LexType::String(_) | LexType::Unknown(_)
        )
    }
}
