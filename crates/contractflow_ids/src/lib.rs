//! Shared identifier wrappers for ContractFlow.
//!
//! Identifiers are opaque strings. Freshly generated ones carry a short type
//! prefix (`bp_`, `ct_`, `f_`) followed by random hex, but any non-blank token
//! without whitespace is accepted so that built-in sample ids like `bp_1` parse.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of random hex characters appended after the prefix.
const RANDOM_SUFFIX_LEN: usize = 12;

/// Error returned when parsing an identifier fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

fn random_suffix() -> String {
    let mut simple = Uuid::new_v4().simple().to_string();
    simple.truncate(RANDOM_SUFFIX_LEN);
    simple
}

macro_rules! define_prefixed_id {
    ($name:ident, $prefix:expr, $label:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used for generated identifiers.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(format!("{}_{}", Self::PREFIX, random_suffix()))
            }

            pub fn parse(value: &str) -> Result<Self, IdParseError> {
                if value.trim().is_empty() {
                    return Err(IdParseError::new(format!("Invalid {}: empty", $label)));
                }
                if value.chars().any(char::is_whitespace) {
                    return Err(IdParseError::new(format!(
                        "Invalid {}: '{}' contains whitespace",
                        $label, value
                    )));
                }
                Ok(Self(value.to_string()))
            }

            /// Wrap a literal known to be well-formed, such as a built-in sample id.
            pub fn from_static(value: &'static str) -> Self {
                debug_assert!(Self::parse(value).is_ok(), "malformed {}: {}", $label, value);
                Self(value.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_prefixed_id!(BlueprintId, "bp", "blueprint ID");
define_prefixed_id!(ContractId, "ct", "contract ID");
define_prefixed_id!(FieldId, "f", "field ID");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_carry_prefix() {
        let bp = BlueprintId::generate();
        let ct = ContractId::generate();
        assert!(bp.as_str().starts_with("bp_"));
        assert!(ct.as_str().starts_with("ct_"));
        assert_eq!(bp.as_str().len(), "bp_".len() + RANDOM_SUFFIX_LEN);
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(ContractId::generate(), ContractId::generate());
    }

    #[test]
    fn test_parse_accepts_sample_ids() {
        let id: BlueprintId = "bp_1".parse().unwrap();
        assert_eq!(id.as_str(), "bp_1");
        assert_eq!(id.to_string(), "bp_1");
    }

    #[test]
    fn test_parse_rejects_blank_and_whitespace() {
        assert!(FieldId::parse("").is_err());
        assert!(FieldId::parse("   ").is_err());
        let err = ContractId::parse("ct 1").unwrap_err();
        assert!(err.to_string().contains("whitespace"));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = FieldId::parse("f_3").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"f_3\"");
        let back: FieldId = serde_json::from_str("\"f_3\"").unwrap();
        assert_eq!(back, id);
    }
}
