//! String format validators for Lexicon schemas
//!
//! Each format is a total predicate over `&str`, expressed as a regex plus
//! a length limit so that every implementation accepts the same strings.
//!
//! Reference: <https://atproto.com/specs/lexicon#string-formats>

use cid::Cid;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HANDLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$",
    )
    .expect("handle regex")
});

static NSID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+(\.[a-zA-Z]([a-zA-Z0-9-]{0,126}[a-zA-Z0-9])?)$",
    )
    .expect("nsid regex")
});

static DID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^did:[a-z]+:[a-zA-Z0-9._:%-]*[a-zA-Z0-9._-]$").expect("did regex"));

static AT_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^at://([a-zA-Z0-9._:%-]+)(/([a-zA-Z0-9.-]+)(/([a-zA-Z0-9._~:@!$&%')(*+,;=-]+))?)?(#(/[a-zA-Z0-9._~:@!$&%')(*+,;=\-\[\]/\\]*))?$",
    )
    .expect("at-uri regex")
});

static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[01][0-9]-[0-3][0-9]T[0-2][0-9]:[0-6][0-9]:[0-6][0-9](\.[0-9]{1,20})?(Z|[+-][0-2][0-9]:[0-5][0-9])$")
        .expect("datetime regex")
});

static TID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[234567abcdefghij][234567abcdefghijklmnopqrstuvwxyz]{12}$").expect("tid regex")
});

static RECORD_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_~.:-]{1,512}$").expect("record key regex"));

static LANGUAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(",
        // grandfathered
        r"(en-GB-oed|i-ami|i-bnn|i-default|i-enochian|i-hak|i-klingon|i-lux|i-mingo|i-navajo|i-pwn|i-tao|i-tay|i-tsu|sgn-BE-FR|sgn-BE-NL|sgn-CH-DE)",
        r"|(art-lojban|cel-gaulish|no-bok|no-nyn|zh-guoyu|zh-hakka|zh-min|zh-min-nan|zh-xiang)",
        // langtag
        r"|(([A-Za-z]{2,3}(-[A-Za-z]{3}(-[A-Za-z]{3}){0,2})?|[A-Za-z]{4}|[A-Za-z]{5,8})",
        r"(-[A-Za-z]{4})?",
        r"(-([A-Za-z]{2}|[0-9]{3}))?",
        r"(-([A-Za-z0-9]{5,8}|[0-9][A-Za-z0-9]{3}))*",
        r"(-[0-9A-WY-Za-wy-z](-[A-Za-z0-9]{2,8})+)*",
        r"(-x(-[A-Za-z0-9]{1,8})+)?)",
        // private use
        r"|(x(-[A-Za-z0-9]{1,8})+)",
        r")$",
    ))
    .expect("language regex")
});

const MAX_HANDLE_LEN: usize = 253;
const MAX_NSID_LEN: usize = 253 + 1 + 128;
const MAX_DID_LEN: usize = 8 * 1024;
const MAX_AT_URI_LEN: usize = 8 * 1024;

/// String format types defined by AT Protocol
///
/// These formats provide semantic meaning and validation rules for string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    /// AT Protocol identifier (DID or handle)
    ///
    /// Examples: `did:plc:abc123`, `alice.bsky.social`
    AtIdentifier,

    /// AT Protocol URI
    ///
    /// Format: `at://authority/collection/rkey`
    AtUri,

    /// Content Identifier (CID) in string form
    Cid,

    /// RFC 3339 / ISO 8601 datetime with timezone
    ///
    /// Format: `YYYY-MM-DDTHH:MM:SS.sssZ` or `YYYY-MM-DDTHH:MM:SS.sss±HH:MM`
    Datetime,

    /// Decentralized Identifier (DID)
    ///
    /// Examples: `did:plc:abc123`, `did:web:example.com`
    Did,

    /// Domain name handle
    ///
    /// Examples: `alice.bsky.social`, `bob.com`
    Handle,

    /// Namespaced Identifier (NSID)
    ///
    /// Reverse-DNS format: `com.example.recordType`
    Nsid,

    /// Timestamp Identifier (TID)
    ///
    /// 13-character base32-sortable timestamp
    Tid,

    /// Record key (rkey)
    RecordKey,

    /// Generic absolute URI
    Uri,

    /// BCP 47 language tag
    ///
    /// Examples: `en`, `en-US`, `pt-BR`
    Language,
}

impl StringFormat {
    /// Get the string representation of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::AtIdentifier => "at-identifier",
            StringFormat::AtUri => "at-uri",
            StringFormat::Cid => "cid",
            StringFormat::Datetime => "datetime",
            StringFormat::Did => "did",
            StringFormat::Handle => "handle",
            StringFormat::Nsid => "nsid",
            StringFormat::Tid => "tid",
            StringFormat::RecordKey => "record-key",
            StringFormat::Uri => "uri",
            StringFormat::Language => "language",
        }
    }

    /// Parse a string format from its string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "at-identifier" => Some(StringFormat::AtIdentifier),
            "at-uri" => Some(StringFormat::AtUri),
            "cid" => Some(StringFormat::Cid),
            "datetime" => Some(StringFormat::Datetime),
            "did" => Some(StringFormat::Did),
            "handle" => Some(StringFormat::Handle),
            "nsid" => Some(StringFormat::Nsid),
            "tid" => Some(StringFormat::Tid),
            "record-key" => Some(StringFormat::RecordKey),
            "uri" => Some(StringFormat::Uri),
            "language" => Some(StringFormat::Language),
            _ => None,
        }
    }

    /// Check a string against this format
    pub fn validate(&self, value: &str) -> bool {
        match self {
            StringFormat::AtIdentifier => is_valid_at_identifier(value),
            StringFormat::AtUri => is_valid_at_uri(value),
            StringFormat::Cid => is_valid_cid(value),
            StringFormat::Datetime => is_valid_datetime(value),
            StringFormat::Did => is_valid_did(value),
            StringFormat::Handle => is_valid_handle(value),
            StringFormat::Nsid => is_valid_nsid(value),
            StringFormat::Tid => is_valid_tid(value),
            StringFormat::RecordKey => is_valid_record_key(value),
            StringFormat::Uri => is_valid_uri(value),
            StringFormat::Language => is_valid_language(value),
        }
    }

    /// The expectation reported when a value fails this format,
    /// e.g. "must be a valid did"
    pub fn expectation(&self) -> &'static str {
        match self {
            StringFormat::AtIdentifier => "must be a valid did or a handle",
            StringFormat::AtUri => "must be a valid at-uri",
            StringFormat::Cid => "must be a cid string",
            StringFormat::Datetime => "must be an iso8601 formatted datetime",
            StringFormat::Did => "must be a valid did",
            StringFormat::Handle => "must be a valid handle",
            StringFormat::Nsid => "must be a valid nsid",
            StringFormat::Tid => "must be a valid TID",
            StringFormat::RecordKey => "must be a valid Record Key",
            StringFormat::Uri => "must be a uri",
            StringFormat::Language => "must be a well-formed BCP 47 language tag",
        }
    }
}

impl std::fmt::Display for StringFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate a handle (domain name)
pub fn is_valid_handle(value: &str) -> bool {
    value.len() <= MAX_HANDLE_LEN && HANDLE_RE.is_match(value)
}

/// Validate a DID
pub fn is_valid_did(value: &str) -> bool {
    value.len() <= MAX_DID_LEN && DID_RE.is_match(value)
}

/// Validate an AT identifier (DID or handle)
pub fn is_valid_at_identifier(value: &str) -> bool {
    if value.starts_with("did:") {
        is_valid_did(value)
    } else {
        is_valid_handle(value)
    }
}

/// Validate an NSID
///
/// At least three dot-separated labels, each starting with an ASCII letter.
/// Only the final (name) label may exceed 63 characters.
pub fn is_valid_nsid(value: &str) -> bool {
    value.len() <= MAX_NSID_LEN && NSID_RE.is_match(value)
}

/// Validate an AT URI
///
/// `at://` followed by a handle or DID authority, then optionally an NSID
/// collection and a record key, then optionally a `#/json/pointer` fragment.
pub fn is_valid_at_uri(value: &str) -> bool {
    if value.len() > MAX_AT_URI_LEN {
        return false;
    }
    let Some(caps) = AT_URI_RE.captures(value) else {
        return false;
    };

    let authority = caps.get(1).map_or("", |m| m.as_str());
    if !is_valid_handle(authority) && !is_valid_did(authority) {
        return false;
    }

    match caps.get(3) {
        Some(collection) => is_valid_nsid(collection.as_str()),
        None => true,
    }
}

/// Validate an RFC 3339 datetime
///
/// The string must have the strict `YYYY-MM-DDTHH:MM:SS[.frac](Z|±HH:MM)`
/// shape and also parse as a real instant, which rules out things like
/// month 13 or February 30th.
pub fn is_valid_datetime(value: &str) -> bool {
    DATETIME_RE.is_match(value) && chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

/// Validate a generic absolute URI
pub fn is_valid_uri(value: &str) -> bool {
    !value.chars().any(char::is_whitespace) && url::Url::parse(value).is_ok()
}

/// Validate a CID string
pub fn is_valid_cid(value: &str) -> bool {
    !value.is_empty() && Cid::try_from(value).is_ok()
}

/// Validate a BCP 47 language tag
pub fn is_valid_language(value: &str) -> bool {
    LANGUAGE_RE.is_match(value)
}

/// Validate a TID
pub fn is_valid_tid(value: &str) -> bool {
    TID_RE.is_match(value)
}

/// Validate a record key
pub fn is_valid_record_key(value: &str) -> bool {
    value != "." && value != ".." && RECORD_KEY_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_string_format_as_str() {
        assert_eq!(StringFormat::AtUri.as_str(), "at-uri");
        assert_eq!(StringFormat::Did.as_str(), "did");
        assert_eq!(StringFormat::Handle.as_str(), "handle");
        assert_eq!(StringFormat::Datetime.as_str(), "datetime");
    }

    #[test]
    fn test_string_format_parse() {
        assert_eq!(StringFormat::parse("at-uri"), Some(StringFormat::AtUri));
        assert_eq!(StringFormat::parse("record-key"), Some(StringFormat::RecordKey));
        assert_eq!(StringFormat::parse("invalid"), None);
    }

    #[test]
    fn test_string_format_serde() {
        let json = serde_json::to_string(&StringFormat::AtIdentifier).unwrap();
        assert_eq!(json, "\"at-identifier\"");

        let format: StringFormat = serde_json::from_str("\"language\"").unwrap();
        assert_eq!(format, StringFormat::Language);
    }

    #[test]
    fn test_handle() {
        assert!(is_valid_handle("test.bsky.social"));
        assert!(is_valid_handle("bsky.test"));
        assert!(is_valid_handle("4chan.org"));
        assert!(is_valid_handle("xn--ls8h.test"));

        assert!(!is_valid_handle("bad handle"));
        assert!(!is_valid_handle("-bad-.test"));
        assert!(!is_valid_handle("nodot"));
        assert!(!is_valid_handle("example.4com"));
        assert!(!is_valid_handle(".startsdot.com"));
        assert!(!is_valid_handle("endsdot.com."));
        assert!(!is_valid_handle(&format!("{}.com", "a".repeat(64))));
    }

    #[test]
    fn test_did() {
        assert!(is_valid_did("did:web:example.com"));
        assert!(is_valid_did("did:plc:12345678abcdefghijklmnop"));
        assert!(is_valid_did("did:key:z6MkpTHR8VNsBxYAAWHut2Geadd9jSwuBV8xRoAnwWsdvktH"));

        assert!(!is_valid_did("bad did"));
        assert!(!is_valid_did("did:short"));
        assert!(!is_valid_did("did:PLC:abc"));
        assert!(!is_valid_did("did:plc:abc:"));
        assert!(!is_valid_did("did:plc:abc%"));
    }

    #[test]
    fn test_at_identifier() {
        assert!(is_valid_at_identifier("bsky.test"));
        assert!(is_valid_at_identifier("did:plc:12345678abcdefghijklmnop"));
        assert!(!is_valid_at_identifier("bad id"));
        assert!(!is_valid_at_identifier("-bad-.test"));
    }

    #[test]
    fn test_nsid() {
        assert!(is_valid_nsid("com.atproto.test"));
        assert!(is_valid_nsid("app.bsky.nested.test"));
        assert!(is_valid_nsid("com.example.kitchenSink"));

        assert!(!is_valid_nsid("bad nsid"));
        assert!(!is_valid_nsid("com.bad-.foo"));
        assert!(!is_valid_nsid("com.example"));
        assert!(!is_valid_nsid("com..example.foo"));
        assert!(!is_valid_nsid("com.4chan.foo"));
    }

    #[test]
    fn test_at_uri() {
        assert!(is_valid_at_uri("at://did:web:example.com/com.example.test/self"));
        assert!(is_valid_at_uri("at://bsky.social"));
        assert!(is_valid_at_uri("at://did:plc:abc123/app.bsky.feed.post/3jui7kd54zh2y"));
        assert!(is_valid_at_uri("at://bsky.social/com.example.test/self#/text"));

        assert!(!is_valid_at_uri("http://not-atproto.com"));
        assert!(!is_valid_at_uri("at://"));
        assert!(!is_valid_at_uri("at://bad authority/com.example.test"));
        assert!(!is_valid_at_uri("at://bsky.social/notansid"));
        assert!(!is_valid_at_uri("at://bsky.social/com.example.test/self/extra"));
    }

    #[test]
    fn test_datetime() {
        for datetime in [
            "2022-12-12T00:50:36.809Z",
            "2022-12-12T00:50:36Z",
            "2022-12-12T00:50:36.8Z",
            "2022-12-12T00:50:36.80Z",
            "2022-12-12T00:50:36+00:00",
            "2022-12-12T00:50:36.8+00:00",
            "2022-12-11T19:50:36-05:00",
            "2022-12-11T19:50:36.8-05:00",
            "2022-12-11T19:50:36.80-05:00",
            "2022-12-11T19:50:36.809-05:00",
        ] {
            assert!(is_valid_datetime(datetime), "{datetime} should be valid");
        }

        assert!(!is_valid_datetime("bad date"));
        assert!(!is_valid_datetime("2022-12-12"));
        assert!(!is_valid_datetime("2022-12-12T00:50:36"));
        assert!(!is_valid_datetime("2022-12-12t00:50:36Z"));
        assert!(!is_valid_datetime("2022-02-30T00:00:00Z"));
        assert!(!is_valid_datetime("12/12/2022 00:50:36Z"));
    }

    #[test]
    fn test_uri() {
        for uri in [
            "https://example.com",
            "https://example.com/with/path",
            "https://example.com/with/path?and=query",
            "at://bsky.social",
            "did:example:test",
        ] {
            assert!(is_valid_uri(uri), "{uri} should be valid");
        }
        assert!(!is_valid_uri("not a uri"));
        assert!(!is_valid_uri("/relative/path"));
    }

    #[test]
    fn test_cid() {
        assert!(is_valid_cid("bafyreidfayvfuwqa7qlnopdjiqrxzs6blmoeu4rujcjtnci5beludirz2a"));
        assert!(!is_valid_cid("abapsdofiuwrpoiasdfuaspdfoiu"));
        assert!(!is_valid_cid(""));
    }

    #[test]
    fn test_language() {
        assert!(is_valid_language("en"));
        assert!(is_valid_language("en-US"));
        assert!(is_valid_language("pt-BR"));
        assert!(is_valid_language("en-US-boont"));
        assert!(is_valid_language("zh-Hant-TW"));
        assert!(is_valid_language("i-klingon"));
        assert!(is_valid_language("x-private"));

        assert!(!is_valid_language("not-a-language-"));
        assert!(!is_valid_language(""));
        assert!(!is_valid_language("e"));
    }

    #[test]
    fn test_tid_and_record_key() {
        assert!(is_valid_tid("3jui7kd54zh2y"));
        assert!(!is_valid_tid("tooshort"));
        assert!(!is_valid_tid("UPPERCASE1234"));

        assert!(is_valid_record_key("self"));
        assert!(is_valid_record_key("3jui7kd54zh2y"));
        assert!(!is_valid_record_key("."));
        assert!(!is_valid_record_key(".."));
        assert!(!is_valid_record_key("has space"));
    }

    #[test]
    fn test_format_validate_dispatch() {
        assert!(StringFormat::Did.validate("did:web:example.com"));
        assert!(!StringFormat::Handle.validate("did:web:example.com"));
        assert_eq!(StringFormat::Datetime.expectation(), "must be an iso8601 formatted datetime");
    }

    proptest! {
        #[test]
        fn prop_dotted_lowercase_labels_are_handles(
            labels in proptest::collection::vec("[a-z][a-z0-9]{0,10}", 2..5)
        ) {
            let handle = labels.join(".");
            prop_assert!(is_valid_handle(&handle));
            prop_assert!(is_valid_at_identifier(&handle));
        }

        #[test]
        fn prop_whitespace_never_forms_an_identifier(s in "[a-z]{1,8} [a-z]{1,8}") {
            prop_assert!(!is_valid_handle(&s));
            prop_assert!(!is_valid_did(&s));
            prop_assert!(!is_valid_nsid(&s));
            prop_assert!(!is_valid_uri(&s));
        }
    }
}
