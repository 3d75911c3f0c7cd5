//! Field constraints for Lexicon schema validation
//!
//! Each constraint set deserializes flattened into its type descriptor and
//! knows how to check an already type-checked value. Checks are fail-fast
//! and run in a fixed order so the first reported violation is stable.

use crate::validation::Violation;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Length of a string in UTF-16 code units
pub fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Length of a string in extended grapheme clusters
pub fn grapheme_len(value: &str) -> usize {
    value.graphemes(true).count()
}

/// Constraints for string fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StringConstraints {
    /// Maximum length in UTF-16 code units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Minimum length in UTF-16 code units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Maximum length in Unicode grapheme clusters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_graphemes: Option<usize>,

    /// Minimum length in Unicode grapheme clusters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_graphemes: Option<usize>,

    /// Allowed values (closed set)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<String>>,

    /// Constant value (field must always have this value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#const: Option<String>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Known values (open set, not enforced)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_values: Option<Vec<String>>,
}

impl StringConstraints {
    /// Check a string against the length, grapheme, enum and const constraints
    pub fn check(&self, value: &str) -> Result<(), Violation> {
        if self.min_length.is_some() || self.max_length.is_some() {
            let len = utf16_len(value);
            if let Some(min) = self.min_length {
                if len < min {
                    return Err(Violation::StringTooShort(min));
                }
            }
            if let Some(max) = self.max_length {
                if len > max {
                    return Err(Violation::StringTooLong(max));
                }
            }
        }

        if self.min_graphemes.is_some() || self.max_graphemes.is_some() {
            let len = grapheme_len(value);
            if let Some(min) = self.min_graphemes {
                if len < min {
                    return Err(Violation::TooFewGraphemes(min));
                }
            }
            if let Some(max) = self.max_graphemes {
                if len > max {
                    return Err(Violation::TooManyGraphemes(max));
                }
            }
        }

        if let Some(allowed) = &self.r#enum {
            if !allowed.iter().any(|v| v == value) {
                return Err(Violation::NotInEnum(allowed.clone()));
            }
        }

        if let Some(constant) = &self.r#const {
            if value != constant {
                return Err(Violation::ConstMismatch(constant.clone()));
            }
        }

        Ok(())
    }
}

/// Constraints for integer fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntegerConstraints {
    /// Maximum value (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,

    /// Minimum value (inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,

    /// Allowed values (closed set)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<i64>>,

    /// Constant value (field must always have this value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#const: Option<i64>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<i64>,
}

impl IntegerConstraints {
    /// Check a whole number against range, enum and const constraints
    pub fn check(&self, value: i64) -> Result<(), Violation> {
        if let Some(min) = self.minimum {
            if value < min {
                return Err(Violation::BelowMinimum(min));
            }
        }
        if let Some(max) = self.maximum {
            if value > max {
                return Err(Violation::AboveMaximum(max));
            }
        }

        if let Some(allowed) = &self.r#enum {
            if !allowed.contains(&value) {
                return Err(Violation::NotInEnum(
                    allowed.iter().map(i64::to_string).collect(),
                ));
            }
        }

        if let Some(constant) = self.r#const {
            if value != constant {
                return Err(Violation::ConstMismatch(constant.to_string()));
            }
        }

        Ok(())
    }

    /// Check a whole number too large in magnitude for `i64`
    ///
    /// Such a value exceeds any declared bound on its side and can never
    /// equal an enum member or the constant.
    pub fn check_beyond_i64(&self, positive: bool) -> Result<(), Violation> {
        match (positive, self.minimum, self.maximum) {
            (false, Some(min), _) => return Err(Violation::BelowMinimum(min)),
            (true, _, Some(max)) => return Err(Violation::AboveMaximum(max)),
            _ => {}
        }
        if let Some(allowed) = &self.r#enum {
            return Err(Violation::NotInEnum(
                allowed.iter().map(i64::to_string).collect(),
            ));
        }
        if let Some(constant) = self.r#const {
            return Err(Violation::ConstMismatch(constant.to_string()));
        }
        Ok(())
    }
}

/// Constraints for boolean fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BooleanConstraints {
    /// Constant value (field must always have this value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#const: Option<bool>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

impl BooleanConstraints {
    /// Check a boolean against the const constraint
    pub fn check(&self, value: bool) -> Result<(), Violation> {
        match self.r#const {
            Some(constant) if constant != value => {
                Err(Violation::ConstMismatch(constant.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Constraints for array fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArrayConstraints {
    /// Maximum number of items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Minimum number of items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
}

impl ArrayConstraints {
    /// Check an element count against the bounds
    pub fn check(&self, len: usize) -> Result<(), Violation> {
        if let Some(min) = self.min_length {
            if len < min {
                return Err(Violation::TooFewElements(min));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(Violation::TooManyElements(max));
            }
        }
        Ok(())
    }
}

/// Constraints for bytes fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BytesConstraints {
    /// Maximum length in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Minimum length in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
}

impl BytesConstraints {
    /// Check a byte count against the bounds
    pub fn check(&self, len: usize) -> Result<(), Violation> {
        if let Some(min) = self.min_length {
            if len < min {
                return Err(Violation::BytesTooShort(min));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(Violation::BytesTooLong(max));
            }
        }
        Ok(())
    }
}

/// Constraints for blob fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlobConstraints {
    /// Accepted MIME types; `type/*` and `*/*` wildcards are allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<Vec<String>>,

    /// Maximum blob size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

impl BlobConstraints {
    /// Check a blob's size, then its MIME type
    pub fn check(&self, mime_type: &str, size: u64) -> Result<(), Violation> {
        if let Some(max) = self.max_size {
            if size > max {
                return Err(Violation::BlobTooLarge(max));
            }
        }
        if let Some(accept) = &self.accept {
            if !accept.iter().any(|pattern| mime_matches(pattern, mime_type)) {
                return Err(Violation::MimeTypeNotAccepted(accept.clone()));
            }
        }
        Ok(())
    }
}

fn mime_matches(pattern: &str, mime_type: &str) -> bool {
    match pattern.strip_suffix("/*") {
        Some("*") => true,
        Some(top) => mime_type
            .split_once('/')
            .is_some_and(|(kind, _)| kind.eq_ignore_ascii_case(top)),
        None => pattern.eq_ignore_ascii_case(mime_type),
    }
}
