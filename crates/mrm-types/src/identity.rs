use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Key prefix reserved for registry-owned entries (index record, init marker).
///
/// No merchant identifier may start with it, so a registry key can never
/// shadow a merchant record.
pub const RESERVED_PREFIX: char = '_';

/// Identifier of a merchant record.
///
/// The identifier doubles as the record's key in the external store. It is
/// immutable for the lifetime of the record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MerchantId(String);

impl MerchantId {
    /// Parse and validate a merchant identifier.
    ///
    /// Rejects the empty string and anything in the reserved namespace.
    pub fn parse(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidMerchantId {
                id,
                reason: "merchant id must not be empty".into(),
            });
        }
        if id.starts_with(RESERVED_PREFIX) {
            return Err(TypeError::InvalidMerchantId {
                id,
                reason: format!("merchant id must not start with {RESERVED_PREFIX:?}"),
            });
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice (also the store key).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `key` could name a merchant record.
    pub fn is_merchant_key(key: &str) -> bool {
        !key.is_empty() && !key.starts_with(RESERVED_PREFIX)
    }
}

impl TryFrom<String> for MerchantId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MerchantId> for String {
    fn from(id: MerchantId) -> Self {
        id.0
    }
}

impl AsRef<str> for MerchantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MerchantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for MerchantId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MerchantId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Debug for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MerchantId({})", self.0)
    }
}

impl fmt::Display for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_accepts_plain_ids() {
        assert!(MerchantId::parse("m1").is_ok());
        assert!(MerchantId::parse("merchant-42").is_ok());
        assert!(MerchantId::parse("ACME Corp").is_ok());
    }

    #[test]
    fn parse_rejects_empty() {
        let err = MerchantId::parse("").unwrap_err();
        assert!(matches!(err, TypeError::InvalidMerchantId { .. }));
    }

    #[test]
    fn parse_rejects_reserved_prefix() {
        assert!(MerchantId::parse("_Merchantindex").is_err());
        assert!(MerchantId::parse("_").is_err());
        // Only a leading underscore is reserved.
        assert!(MerchantId::parse("m_1").is_ok());
    }

    #[test]
    fn merchant_key_predicate() {
        assert!(MerchantId::is_merchant_key("m1"));
        assert!(!MerchantId::is_merchant_key("_init"));
        assert!(!MerchantId::is_merchant_key(""));
    }

    #[test]
    fn serde_is_a_plain_string() {
        let id = MerchantId::parse("m1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m1\"");
        let parsed: MerchantId = serde_json::from_str("\"m1\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_rejects_reserved_ids() {
        assert!(serde_json::from_str::<MerchantId>("\"_x\"").is_err());
        assert!(serde_json::from_str::<MerchantId>("\"\"").is_err());
    }

    #[test]
    fn display_and_compare_with_str() {
        let id = MerchantId::parse("m7").unwrap();
        assert_eq!(id.to_string(), "m7");
        assert_eq!(id, "m7");
        assert_eq!(format!("{id:?}"), "MerchantId(m7)");
    }

    proptest! {
        #[test]
        fn any_non_reserved_string_parses(s in "[a-zA-Z0-9][a-zA-Z0-9_ .-]{0,24}") {
            let id = MerchantId::parse(s.clone()).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }
    }
}
