//! Lexicon value validation
//!
//! The engine walks a [`LexValue`] against a [`LexType`], following `ref`
//! and `union` hops through the registry. It stops at the first violation,
//! in object-property declaration order and then array order, and reports
//! it with the slash-separated path from the root label to the offending
//! value.

use crate::formats::StringFormat;
use crate::registry::Lexicons;
use crate::resolution::{LexUri, RefResolutionError};
use crate::types::{LexObject, LexParams, LexType, LexUnion};
use crate::value::LexValue;
use crate::{Error, Result};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Why a value was rejected, with the raw template parameters
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Violation {
    /// Value is not an object
    #[error("must be an object")]
    NotObject,

    /// Union value is not an object carrying `$type`
    #[error("must be an object which includes the \"$type\" property")]
    MissingTypeProperty,

    /// A required property is absent
    #[error("must have the property \"{0}\"")]
    MissingProperty(String),

    /// Value is not an array
    #[error("must be an array")]
    NotArray,

    /// Array has fewer elements than `minLength`
    #[error("must not have fewer than {0} elements")]
    TooFewElements(usize),

    /// Array has more elements than `maxLength`
    #[error("must not have more than {0} elements")]
    TooManyElements(usize),

    /// Value is not a string
    #[error("must be a string")]
    NotString,

    /// String does not match its declared format
    #[error("{}", .0.expectation())]
    InvalidFormat(StringFormat),

    /// String is shorter than `minLength` UTF-16 code units
    #[error("must not be shorter than {0} characters")]
    StringTooShort(usize),

    /// String is longer than `maxLength` UTF-16 code units
    #[error("must not be longer than {0} characters")]
    StringTooLong(usize),

    /// String has fewer grapheme clusters than `minGraphemes`
    #[error("must not be shorter than {0} characters")]
    TooFewGraphemes(usize),

    /// String has more grapheme clusters than `maxGraphemes`
    #[error("must not be longer than {0} characters")]
    TooManyGraphemes(usize),

    /// Value is not one of the declared enum values
    #[error("must be one of ({})", .0.join("|"))]
    NotInEnum(Vec<String>),

    /// Value differs from the declared constant
    #[error("must be {0}")]
    ConstMismatch(String),

    /// Value is not a number
    #[error("must be a number")]
    NotNumber,

    /// Number has a fractional part
    #[error("must be an integer")]
    NotInteger,

    /// Integer is below `minimum`
    #[error("can not be less than {0}")]
    BelowMinimum(i64),

    /// Integer is above `maximum`
    #[error("can not be greater than {0}")]
    AboveMaximum(i64),

    /// Value is not a boolean
    #[error("must be a boolean")]
    NotBoolean,

    /// Value is not a byte string
    #[error("must be a byte array")]
    NotBytes,

    /// Byte string is shorter than `minLength`
    #[error("must not be smaller than {0} bytes")]
    BytesTooShort(usize),

    /// Byte string is longer than `maxLength`
    #[error("must not be larger than {0} bytes")]
    BytesTooLong(usize),

    /// Value is not a CID link
    #[error("must be a CID")]
    NotCidLink,

    /// Value is not a well-formed blob reference
    #[error("must be a blob ref")]
    NotBlob,

    /// Blob is larger than `maxSize`
    #[error("must not be larger than {0} bytes")]
    BlobTooLarge(u64),

    /// Blob MIME type is not in `accept`
    #[error("mimeType must be one of {}", .0.join(", "))]
    MimeTypeNotAccepted(Vec<String>),

    /// Closed union received an unlisted `$type`
    #[error("$type must be one of {}", .0.join(", "))]
    UnionTypeNotAllowed(Vec<String>),

    /// Record `$type` names another collection
    #[error("Invalid $type: must be {expected}, got {actual}")]
    RecordTypeMismatch {
        /// Canonical `lex:` id of the record
        expected: String,
        /// `$type` as given
        actual: String,
    },
}

/// A rejected value: where, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Slash-separated path from the root label, empty for document-level errors
    pub path: String,

    /// The violated rule
    pub violation: Violation,
}

impl ValidationError {
    /// Create a validation error at `path`
    pub fn new(path: impl Into<String>, violation: Violation) -> Self {
        Self {
            path: path.into(),
            violation,
        }
    }

    /// The rendered, human-readable message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.violation)
        } else {
            write!(f, "{} {}", self.path, self.violation)
        }
    }
}

impl std::error::Error for ValidationError {}

fn fail(path: &str, violation: Violation) -> Error {
    Error::Validation(ValidationError::new(path, violation))
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}/{name}")
    }
}

/// MIME type and size of a `{$type: "blob", ref, mimeType, size}` object
fn blob_ref(value: &LexValue) -> Option<(&str, u64)> {
    let map = value.as_object()?;
    if map.len() != 4 || map.get("$type")?.as_str()? != "blob" {
        return None;
    }
    if !matches!(map.get("ref")?, LexValue::CidLink(_)) {
        return None;
    }
    let mime_type = map.get("mimeType")?.as_str().filter(|m| !m.is_empty())?;
    let size = match map.get("size")? {
        LexValue::Integer(n) => u64::try_from(*n).ok()?,
        _ => return None,
    };
    Some((mime_type, size))
}

/// Recursive validator bound to a registry
///
/// `nsid` is the document the current descriptor belongs to; local `#name`
/// references resolve against it. `hops` counts consecutive ref/union
/// hops and resets whenever a property or array element is entered.
pub(crate) struct Validator<'a> {
    lexicons: &'a Lexicons,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(lexicons: &'a Lexicons) -> Self {
        Self { lexicons }
    }

    /// Validate `value` against any field-level descriptor
    pub(crate) fn validate(
        &self,
        nsid: &str,
        def: &LexType,
        value: &LexValue,
        path: &str,
        hops: usize,
    ) -> Result<()> {
        match def {
            LexType::Boolean(boolean) => match value {
                LexValue::Bool(b) => boolean.constraints.check(*b).map_err(|v| fail(path, v)),
                _ => Err(fail(path, Violation::NotBoolean)),
            },
            LexType::Integer(integer) => {
                let checked = match (value, value.as_integer()) {
                    (_, Some(n)) => integer.constraints.check(n),
                    (LexValue::Float(f), None) if f.is_finite() && f.fract() == 0.0 => {
                        integer.constraints.check_beyond_i64(*f > 0.0)
                    }
                    (LexValue::Float(_), None) => Err(Violation::NotInteger),
                    _ => Err(Violation::NotNumber),
                };
                checked.map_err(|v| fail(path, v))
            }
            LexType::String(string) => {
                let s = value.as_str().ok_or_else(|| fail(path, Violation::NotString))?;
                if let Some(format) = string.format {
                    if !format.validate(s) {
                        return Err(fail(path, Violation::InvalidFormat(format)));
                    }
                }
                string.constraints.check(s).map_err(|v| fail(path, v))
            }
            LexType::Bytes(bytes) => match value {
                LexValue::Bytes(b) => bytes.constraints.check(b.len()).map_err(|v| fail(path, v)),
                _ => Err(fail(path, Violation::NotBytes)),
            },
            LexType::CidLink(_) => match value {
                LexValue::CidLink(_) => Ok(()),
                _ => Err(fail(path, Violation::NotCidLink)),
            },
            LexType::Blob(blob) => {
                let (mime_type, size) =
                    blob_ref(value).ok_or_else(|| fail(path, Violation::NotBlob))?;
                blob.constraints.check(mime_type, size).map_err(|v| fail(path, v))
            }
            LexType::Unknown(_) => Ok(()),
            LexType::Array(array) => {
                let LexValue::Array(items) = value else {
                    return Err(fail(path, Violation::NotArray));
                };
                array
                    .constraints
                    .check(items.len())
                    .map_err(|v| fail(path, v))?;
                for item in items {
                    self.validate(nsid, &array.items, item, path, 0)?;
                }
                Ok(())
            }
            LexType::Object(object) => self.validate_object(nsid, object, value, path),
            LexType::Ref(reference) => {
                let uri = LexUri::parse(&reference.ref_to, Some(nsid))?;
                let target = self.follow(&uri, path, hops)?;
                self.validate(&uri.nsid, target, value, path, hops + 1)
            }
            LexType::Union(union) => self.validate_union(nsid, union, value, path, hops),
            LexType::Token(_)
            | LexType::Record(_)
            | LexType::Params(_)
            | LexType::Query(_)
            | LexType::Procedure(_) => Err(RefResolutionError::UnexpectedType {
                kind: def.kind().to_string(),
                path: path.to_string(),
            }
            .into()),
        }
    }

    /// Validate `value` as an object: required names first, then each
    /// present property in declaration order
    pub(crate) fn validate_object(
        &self,
        nsid: &str,
        object: &LexObject,
        value: &LexValue,
        path: &str,
    ) -> Result<()> {
        let map = value
            .as_object()
            .ok_or_else(|| fail(path, Violation::NotObject))?;

        for name in &object.required {
            if !map.contains_key(name) {
                return Err(fail(path, Violation::MissingProperty(name.clone())));
            }
        }

        for (name, prop) in &object.properties {
            let Some(field) = map.get(name) else {
                continue;
            };
            if matches!(field, LexValue::Null) && object.is_nullable(name) {
                continue;
            }
            self.validate(nsid, prop, field, &join_path(path, name), 0)?;
        }

        Ok(())
    }

    /// Validate XRPC parameters
    ///
    /// Missing required names are reported under `label`; a wrongly typed
    /// parameter is reported under its bare name.
    pub(crate) fn validate_params(
        &self,
        nsid: &str,
        params: &LexParams,
        value: &LexValue,
        label: &str,
    ) -> Result<()> {
        let map = value
            .as_object()
            .ok_or_else(|| fail(label, Violation::NotObject))?;

        for name in &params.required {
            if !map.contains_key(name) {
                return Err(fail(label, Violation::MissingProperty(name.clone())));
            }
        }

        for (name, prop) in &params.properties {
            if let Some(field) = map.get(name) {
                self.validate(nsid, prop, field, name, 0)?;
            }
        }

        Ok(())
    }

    fn validate_union(
        &self,
        nsid: &str,
        union: &LexUnion,
        value: &LexValue,
        path: &str,
        hops: usize,
    ) -> Result<()> {
        let type_id = value
            .get("$type")
            .and_then(LexValue::as_str)
            .ok_or_else(|| fail(path, Violation::MissingTypeProperty))?;

        let members = union
            .refs
            .iter()
            .map(|r| LexUri::parse(r, Some(nsid)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let given = LexUri::parse(type_id, None)?;

        match members.iter().find(|member| **member == given) {
            Some(member) => {
                let target = self.follow(member, path, hops)?;
                self.validate(&member.nsid, target, value, path, hops + 1)
            }
            None if union.is_closed() => Err(fail(
                path,
                Violation::UnionTypeNotAllowed(members.iter().map(LexUri::to_string).collect()),
            )),
            None => {
                debug!(path, type_id, "Passing unrecognized union member through");
                Ok(())
            }
        }
    }

    /// Resolve one ref/union hop, enforcing the hop limit
    fn follow(&self, uri: &LexUri, path: &str, hops: usize) -> Result<&'a LexType> {
        let max = self.lexicons.config().max_ref_depth;
        if hops >= max {
            return Err(RefResolutionError::DepthExceeded {
                max,
                path: path.to_string(),
            }
            .into());
        }
        trace!(%uri, path, "Resolving reference");
        Ok(self.lexicons.resolve(uri)?)
    }
}
