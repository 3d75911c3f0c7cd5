//! JSON parsing for Lexicon schemas
//!
//! Raw JSON is first checked for keys no descriptor declares, so a typo
//! such as `maxLenght` fails loudly instead of dropping a constraint.
//! Deserialization then checks shape, and the structural pass afterwards
//! checks the rules serde cannot express: the language version, the
//! document id, `required` names, params property kinds, reference syntax
//! and where top-level definitions may appear.

use crate::formats::is_valid_nsid;
use crate::schema::LexiconDoc;
use crate::types::{LexObject, LexParams, LexType, LexXrpcBody};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during Lexicon parsing
#[derive(Debug, Error)]
pub enum LexiconParseError {
    /// Invalid JSON syntax or shape
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// IO error reading file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid lexicon version
    #[error("Invalid lexicon version: expected 1, got {0}")]
    InvalidVersion(u32),

    /// Invalid NSID format
    #[error("Invalid NSID format: {0}")]
    InvalidNsid(String),

    /// A `required` name has no property schema
    #[error("Required field \"{name}\" not defined at {location}")]
    RequiredNotDefined {
        /// The undeclared name
        name: String,
        /// Where the `required` list appears
        location: String,
    },

    /// A params property is not a primitive or an array of primitives
    #[error("Params property at {location} must be a boolean, integer, string, unknown or an array of those, got {kind}")]
    InvalidParamsProperty {
        /// Where the property appears
        location: String,
        /// The property's type discriminator
        kind: String,
    },

    /// Malformed reference string
    #[error("Invalid reference \"{reference}\" at {location}: Uri can only have one hash segment")]
    InvalidRef {
        /// The reference as written
        reference: String,
        /// Where the reference appears
        location: String,
    },

    /// A descriptor carries keys its kind does not declare
    #[error("Unrecognized key(s) in object: {} at {location}", quoted(.keys))]
    UnrecognizedKeys {
        /// The undeclared keys
        keys: Vec<String>,
        /// Where the object appears
        location: String,
    },

    /// A top-level-only kind nested inside another descriptor
    #[error("\"{kind}\" definitions may only appear at the top level, found at {location}")]
    MisplacedDef {
        /// The nested descriptor's type discriminator
        kind: String,
        /// Where it appears
        location: String,
    },
}

/// Result type for Lexicon parsing operations
pub type Result<T> = std::result::Result<T, LexiconParseError>;

impl LexiconDoc {
    /// Parse a Lexicon document from a JSON string
    ///
    /// # Examples
    ///
    /// ```
    /// use atproto_lexicon::LexiconDoc;
    ///
    /// let json = r#"{
    ///   "lexicon": 1,
    ///   "id": "com.example.test",
    ///   "defs": {
    ///     "main": {
    ///       "type": "token"
    ///     }
    ///   }
    /// }"#;
    ///
    /// let doc = LexiconDoc::from_json(json).unwrap();
    /// assert_eq!(doc.id, "com.example.test");
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Parse a Lexicon document from an already-decoded JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        check_doc_keys(&value)?;
        let doc: LexiconDoc = serde_json::from_value(value)?;
        doc.check_structure()?;
        Ok(doc)
    }

    /// Parse a Lexicon document from a JSON file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use atproto_lexicon::LexiconDoc;
    ///
    /// let doc = LexiconDoc::from_file("lexicons/app.bsky.feed.post.json").unwrap();
    /// println!("Loaded lexicon: {}", doc.id);
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Run the structural checks on a deserialized document
    pub fn check_structure(&self) -> Result<()> {
        if self.lexicon != 1 {
            return Err(LexiconParseError::InvalidVersion(self.lexicon));
        }

        if !is_valid_nsid(&self.id) {
            return Err(LexiconParseError::InvalidNsid(self.id.clone()));
        }

        for (name, def) in &self.defs {
            check_def(def, &format!("{}#{}", self.id, name), true)?;
        }

        Ok(())
    }
}

fn quoted(keys: &[String]) -> String {
    keys.iter()
        .map(|key| format!("'{key}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keys a descriptor of `kind` may carry besides `type` and `description`
fn declared_keys(kind: &str) -> Option<&'static [&'static str]> {
    let keys: &'static [&'static str] = match kind {
        "boolean" => &["default", "const"],
        "integer" => &["default", "minimum", "maximum", "enum", "const"],
        "string" => &[
            "format",
            "default",
            "minLength",
            "maxLength",
            "minGraphemes",
            "maxGraphemes",
            "enum",
            "const",
            "knownValues",
        ],
        "bytes" => &["minLength", "maxLength"],
        "blob" => &["accept", "maxSize"],
        "array" => &["items", "minLength", "maxLength"],
        "object" => &["required", "nullable", "properties"],
        "union" => &["refs", "closed"],
        "ref" => &["ref"],
        "record" => &["key", "record"],
        "params" => &["required", "properties"],
        "query" => &["parameters", "output", "errors"],
        "procedure" => &["parameters", "input", "output", "errors"],
        "cid-link" | "token" | "unknown" => &[],
        _ => return None,
    };
    Some(keys)
}

fn check_keys(object: &Map<String, Value>, declared: &[&str], location: &str) -> Result<()> {
    let keys: Vec<String> = object
        .keys()
        .filter(|key| !declared.contains(&key.as_str()))
        .cloned()
        .collect();
    if keys.is_empty() {
        Ok(())
    } else {
        Err(LexiconParseError::UnrecognizedKeys {
            keys,
            location: location.to_string(),
        })
    }
}

fn check_doc_keys(doc: &Value) -> Result<()> {
    let id = doc.get("id").and_then(Value::as_str).unwrap_or_default();
    if let Some(defs) = doc.get("defs").and_then(Value::as_object) {
        for (name, def) in defs {
            check_def_keys(def, &format!("{id}#{name}"))?;
        }
    }
    Ok(())
}

/// Recursively reject undeclared keys; shapes serde will reject anyway
/// are skipped
fn check_def_keys(def: &Value, location: &str) -> Result<()> {
    let Some(object) = def.as_object() else {
        return Ok(());
    };
    let Some(kind) = object.get("type").and_then(Value::as_str) else {
        return Ok(());
    };
    let Some(extra) = declared_keys(kind) else {
        return Ok(());
    };

    let mut declared = vec!["type", "description"];
    declared.extend_from_slice(extra);
    check_keys(object, &declared, location)?;

    if let Some(items) = object.get("items") {
        check_def_keys(items, &format!("{location}/items"))?;
    }
    if let Some(record) = object.get("record") {
        check_def_keys(record, &format!("{location}/record"))?;
    }
    if let Some(parameters) = object.get("parameters") {
        check_def_keys(parameters, &format!("{location}/parameters"))?;
    }
    if let Some(properties) = object.get("properties").and_then(Value::as_object) {
        for (name, prop) in properties {
            check_def_keys(prop, &format!("{location}/{name}"))?;
        }
    }
    for field in ["input", "output"] {
        if let Some(body) = object.get(field).and_then(Value::as_object) {
            let body_location = format!("{location}/{field}");
            check_keys(body, &["description", "encoding", "schema"], &body_location)?;
            if let Some(schema) = body.get("schema") {
                check_def_keys(schema, &format!("{body_location}/schema"))?;
            }
        }
    }
    if let Some(errors) = object.get("errors").and_then(Value::as_array) {
        for error in errors.iter().filter_map(Value::as_object) {
            check_keys(error, &["name", "description"], &format!("{location}/errors"))?;
        }
    }
    Ok(())
}

fn check_def(def: &LexType, location: &str, top_level: bool) -> Result<()> {
    if def.is_top_level_only() && !top_level {
        return Err(LexiconParseError::MisplacedDef {
            kind: def.kind().to_string(),
            location: location.to_string(),
        });
    }

    match def {
        LexType::Object(object) => check_object(object, location),
        LexType::Array(array) => check_def(&array.items, &format!("{location}/items"), false),
        LexType::Ref(reference) => check_ref(&reference.ref_to, location),
        LexType::Union(union) => union
            .refs
            .iter()
            .try_for_each(|reference| check_ref(reference, location)),
        LexType::Record(record) => check_object(&record.record, &format!("{location}/record")),
        LexType::Params(params) => check_params(params, location),
        LexType::Query(query) => {
            if let Some(params) = &query.parameters {
                check_params(params, &format!("{location}/parameters"))?;
            }
            check_body(query.output.as_ref(), &format!("{location}/output"))
        }
        LexType::Procedure(procedure) => {
            if let Some(params) = &procedure.parameters {
                check_params(params, &format!("{location}/parameters"))?;
            }
            check_body(procedure.input.as_ref(), &format!("{location}/input"))?;
            check_body(procedure.output.as_ref(), &format!("{location}/output"))
        }
        LexType::Boolean(_)
        | LexType::Integer(_)
        | LexType::String(_)
        | LexType::Bytes(_)
        | LexType::CidLink(_)
        | LexType::Blob(_)
        | LexType::Token(_)
        | LexType::Unknown(_) => Ok(()),
    }
}

fn check_object(object: &LexObject, location: &str) -> Result<()> {
    check_required(&object.required, |name| object.properties.contains_key(name), location)?;
    for (name, prop) in &object.properties {
        check_def(prop, &format!("{location}/{name}"), false)?;
    }
    Ok(())
}

fn check_params(params: &LexParams, location: &str) -> Result<()> {
    check_required(&params.required, |name| params.properties.contains_key(name), location)?;
    for (name, prop) in &params.properties {
        let prop_location = format!("{location}/{name}");
        let allowed = match prop {
            LexType::Array(array) => array.items.is_param_primitive(),
            other => other.is_param_primitive(),
        };
        if !allowed {
            return Err(LexiconParseError::InvalidParamsProperty {
                location: prop_location,
                kind: prop.kind().to_string(),
            });
        }
    }
    Ok(())
}

fn check_body(body: Option<&LexXrpcBody>, location: &str) -> Result<()> {
    match body.and_then(|body| body.schema.as_deref()) {
        Some(schema) => check_def(schema, &format!("{location}/schema"), false),
        None => Ok(()),
    }
}

fn check_required(
    required: &[String],
    declared: impl Fn(&str) -> bool,
    location: &str,
) -> Result<()> {
    match required.iter().find(|name| !declared(name.as_str())) {
        Some(name) => Err(LexiconParseError::RequiredNotDefined {
            name: name.clone(),
            location: location.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_ref(reference: &str, location: &str) -> Result<()> {
    if reference.matches('#').count() > 1 {
        return Err(LexiconParseError::InvalidRef {
            reference: reference.to_string(),
            location: location.to_string(),
        });
    }
    Ok(())
}
