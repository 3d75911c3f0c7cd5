//! Shared fixtures for the integration tests

#![allow(dead_code)]

use atproto_lexicon::{LexValue, LexiconDoc, Lexicons};
use cid::Cid;
use serde_json::{json, Value};

pub const CID_STR: &str = "bafyreidfayvfuwqa7qlnopdjiqrxzs6blmoeu4rujcjtnci5beludirz2a";

/// Install a test subscriber once; `RUST_LOG=atproto_lexicon=trace` shows
/// ref resolution
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn cid() -> Cid {
    Cid::try_from(CID_STR).unwrap()
}

/// Convert JSON to a value, then set extra non-JSON properties
pub fn value_with(json: Value, extra: Vec<(&str, LexValue)>) -> LexValue {
    let mut value = LexValue::from(json);
    let map = value.as_object_mut().expect("fixture must be an object");
    for (key, field) in extra {
        map.insert(key.to_string(), field);
    }
    value
}

pub fn lexicons() -> Lexicons {
    init_tracing();
    Lexicons::from_docs(
        lexicon_docs()
            .into_iter()
            .map(|doc| LexiconDoc::from_value(doc).unwrap()),
    )
    .unwrap()
}

/// A record with a single property of the given descriptor
fn single_prop_record(id: &str, name: &str, prop: Value) -> Value {
    json!({
        "lexicon": 1,
        "id": id,
        "defs": {
            "main": {
                "type": "record",
                "record": {
                    "type": "object",
                    "properties": { name: prop }
                }
            }
        }
    })
}

fn format_record(id: &str, name: &str, format: &str) -> Value {
    single_prop_record(id, name, json!({ "type": "string", "format": format }))
}

pub fn lexicon_docs() -> Vec<Value> {
    vec![
        json!({
            "lexicon": 1,
            "id": "com.example.kitchenSink",
            "defs": {
                "main": {
                    "type": "record",
                    "description": "A record",
                    "key": "tid",
                    "record": {
                        "type": "object",
                        "required": ["object", "array", "boolean", "integer", "string"],
                        "properties": {
                            "object": { "type": "ref", "ref": "#object" },
                            "array": { "type": "array", "items": { "type": "string" } },
                            "boolean": { "type": "boolean" },
                            "integer": { "type": "integer" },
                            "string": { "type": "string" },
                            "datetime": { "type": "string", "format": "datetime" },
                            "atUri": { "type": "string", "format": "at-uri" },
                            "did": { "type": "string", "format": "did" },
                            "cid": { "type": "string", "format": "cid" },
                            "bytes": { "type": "bytes" },
                            "cidLink": { "type": "cid-link" }
                        }
                    }
                },
                "object": {
                    "type": "object",
                    "required": ["object", "array", "boolean", "integer", "string"],
                    "properties": {
                        "object": { "type": "ref", "ref": "#subobject" },
                        "array": { "type": "array", "items": { "type": "string" } },
                        "boolean": { "type": "boolean" },
                        "integer": { "type": "integer" },
                        "string": { "type": "string" }
                    }
                },
                "subobject": {
                    "type": "object",
                    "required": ["boolean"],
                    "properties": {
                        "boolean": { "type": "boolean" }
                    }
                }
            }
        }),
        json!({
            "lexicon": 1,
            "id": "com.example.query",
            "defs": {
                "main": {
                    "type": "query",
                    "description": "A query",
                    "parameters": {
                        "type": "params",
                        "required": ["boolean", "integer"],
                        "properties": {
                            "boolean": { "type": "boolean" },
                            "integer": { "type": "integer" },
                            "string": { "type": "string" },
                            "array": { "type": "array", "items": { "type": "string" } },
                            "def": { "type": "integer", "default": 0 }
                        }
                    },
                    "output": {
                        "encoding": "application/json",
                        "schema": { "type": "ref", "ref": "com.example.kitchenSink#object" }
                    }
                }
            }
        }),
        json!({
            "lexicon": 1,
            "id": "com.example.procedure",
            "defs": {
                "main": {
                    "type": "procedure",
                    "description": "A procedure",
                    "parameters": {
                        "type": "params",
                        "required": ["boolean", "integer"],
                        "properties": {
                            "boolean": { "type": "boolean" },
                            "integer": { "type": "integer" },
                            "string": { "type": "string" },
                            "array": { "type": "array", "items": { "type": "string" } }
                        }
                    },
                    "input": {
                        "encoding": "application/json",
                        "schema": { "type": "ref", "ref": "com.example.kitchenSink#object" }
                    },
                    "output": {
                        "encoding": "application/json",
                        "schema": { "type": "ref", "ref": "com.example.kitchenSink#object" }
                    },
                    "errors": [{ "name": "NotFound" }]
                }
            }
        }),
        json!({
            "lexicon": 1,
            "id": "com.example.blobUpload",
            "defs": {
                "main": {
                    "type": "procedure",
                    "input": { "encoding": "*/*" },
                    "output": { "encoding": "application/json" }
                }
            }
        }),
        json!({
            "lexicon": 1,
            "id": "com.example.optional",
            "defs": {
                "main": {
                    "type": "record",
                    "record": {
                        "type": "object",
                        "properties": {
                            "object": { "type": "ref", "ref": "com.example.kitchenSink#object" },
                            "array": { "type": "array", "items": { "type": "string" } },
                            "boolean": { "type": "boolean" },
                            "integer": { "type": "integer" },
                            "string": { "type": "string" }
                        }
                    }
                }
            }
        }),
        json!({
            "lexicon": 1,
            "id": "com.example.default",
            "defs": {
                "main": {
                    "type": "record",
                    "record": {
                        "type": "object",
                        "required": ["boolean"],
                        "properties": {
                            "boolean": { "type": "boolean", "default": false },
                            "integer": { "type": "integer", "default": 0 },
                            "string": { "type": "string", "default": "" },
                            "datetime": { "type": "string", "format": "datetime" },
                            "object": { "type": "ref", "ref": "#object" }
                        }
                    }
                },
                "object": {
                    "type": "object",
                    "properties": {
                        "boolean": { "type": "boolean", "default": true },
                        "integer": { "type": "integer", "default": 1 },
                        "string": { "type": "string", "default": "x" }
                    }
                }
            }
        }),
        json!({
            "lexicon": 1,
            "id": "com.example.union",
            "defs": {
                "main": {
                    "type": "record",
                    "description": "A record",
                    "key": "tid",
                    "record": {
                        "type": "object",
                        "required": ["unionOpen", "unionClosed"],
                        "properties": {
                            "unionOpen": {
                                "type": "union",
                                "refs": [
                                    "com.example.kitchenSink#object",
                                    "com.example.kitchenSink#subobject"
                                ]
                            },
                            "unionClosed": {
                                "type": "union",
                                "closed": true,
                                "refs": [
                                    "com.example.kitchenSink#object",
                                    "com.example.kitchenSink#subobject"
                                ]
                            }
                        }
                    }
                }
            }
        }),
        json!({
            "lexicon": 1,
            "id": "com.example.unknown",
            "defs": {
                "main": {
                    "type": "record",
                    "description": "A record",
                    "key": "tid",
                    "record": {
                        "type": "object",
                        "required": ["unknown"],
                        "properties": {
                            "unknown": { "type": "unknown" },
                            "optUnknown": { "type": "unknown" }
                        }
                    }
                }
            }
        }),
        single_prop_record(
            "com.example.arrayLength",
            "array",
            json!({ "type": "array", "minLength": 2, "maxLength": 4, "items": { "type": "integer" } }),
        ),
        single_prop_record(
            "com.example.boolConst",
            "boolean",
            json!({ "type": "boolean", "const": false }),
        ),
        single_prop_record(
            "com.example.integerRange",
            "integer",
            json!({ "type": "integer", "minimum": 2, "maximum": 4 }),
        ),
        single_prop_record(
            "com.example.integerEnum",
            "integer",
            json!({ "type": "integer", "enum": [1, 2] }),
        ),
        single_prop_record(
            "com.example.integerConst",
            "integer",
            json!({ "type": "integer", "const": 0 }),
        ),
        single_prop_record(
            "com.example.stringLength",
            "string",
            json!({ "type": "string", "minLength": 2, "maxLength": 4 }),
        ),
        single_prop_record(
            "com.example.stringLengthGrapheme",
            "string",
            json!({ "type": "string", "minGraphemes": 2, "maxGraphemes": 4 }),
        ),
        single_prop_record(
            "com.example.stringEnum",
            "string",
            json!({ "type": "string", "enum": ["a", "b"] }),
        ),
        single_prop_record(
            "com.example.stringConst",
            "string",
            json!({ "type": "string", "const": "a" }),
        ),
        single_prop_record(
            "com.example.byteLength",
            "bytes",
            json!({ "type": "bytes", "minLength": 2, "maxLength": 4 }),
        ),
        single_prop_record(
            "com.example.blob",
            "blob",
            json!({ "type": "blob", "accept": ["image/*", "video/mp4"], "maxSize": 1000 }),
        ),
        format_record("com.example.datetime", "datetime", "datetime"),
        format_record("com.example.uri", "uri", "uri"),
        format_record("com.example.atUri", "atUri", "at-uri"),
        format_record("com.example.did", "did", "did"),
        format_record("com.example.handle", "handle", "handle"),
        format_record("com.example.atIdentifier", "atIdentifier", "at-identifier"),
        format_record("com.example.nsid", "nsid", "nsid"),
        format_record("com.example.cid", "cid", "cid"),
        format_record("com.example.language", "language", "language"),
        format_record("com.example.tid", "tid", "tid"),
        format_record("com.example.recordKey", "recordKey", "record-key"),
    ]
}
