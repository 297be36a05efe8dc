use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::MerchantId;

/// Number of positional arguments that describe a full merchant record:
/// the identifier followed by the seven payload fields.
pub const MERCHANT_ARG_COUNT: usize = 8;

/// The mutable payload of a merchant record.
///
/// All values are free-form strings; the ledger does not type numbers or
/// dates. Wire names follow the ledger's established record layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantFields {
    #[serde(rename = "merchantName")]
    pub name: String,
    #[serde(rename = "merchantLogo")]
    pub logo: String,
    #[serde(rename = "merchantIndustry")]
    pub industry: String,
    /// Loyalty points granted per currency unit spent.
    #[serde(rename = "pointsPerDollarSpent")]
    pub points_rate: String,
    #[serde(rename = "merchantCurrency")]
    pub currency: String,
    #[serde(rename = "exchangeRate")]
    pub exchange_rate: String,
    /// Timestamp of the last create or update, as supplied by the caller.
    #[serde(rename = "merchantCU_date")]
    pub updated_at: String,
}

impl MerchantFields {
    /// Build the payload from the seven positional values that follow the
    /// identifier, in wire order.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, TypeError> {
        let expected = MERCHANT_ARG_COUNT - 1;
        if args.len() != expected {
            return Err(TypeError::FieldCount {
                expected,
                actual: args.len(),
            });
        }
        let field = |i: usize| args[i].as_ref().to_string();
        Ok(Self {
            name: field(0),
            logo: field(1),
            industry: field(2),
            points_rate: field(3),
            currency: field(4),
            exchange_rate: field(5),
            updated_at: field(6),
        })
    }
}

/// A merchant record as stored on the ledger.
///
/// Identity is fixed at creation; only [`MerchantFields`] change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    /// Records written by older clients spell the key `merchantID`.
    #[serde(rename = "merchantId", alias = "merchantID")]
    pub id: MerchantId,
    #[serde(flatten)]
    pub fields: MerchantFields,
}

impl Merchant {
    pub fn new(id: MerchantId, fields: MerchantFields) -> Self {
        Self { id, fields }
    }

    /// Build a record from the full positional argument list
    /// (`id, name, logo, industry, pointsRate, currency, exchangeRate, date`).
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, TypeError> {
        if args.len() != MERCHANT_ARG_COUNT {
            return Err(TypeError::FieldCount {
                expected: MERCHANT_ARG_COUNT,
                actual: args.len(),
            });
        }
        let id = MerchantId::parse(args[0].as_ref())?;
        let fields = MerchantFields::from_args(&args[1..])?;
        Ok(Self { id, fields })
    }

    /// Replace the mutable payload, leaving the identity untouched.
    pub fn apply(&mut self, fields: MerchantFields) {
        self.fields = fields;
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode a stored record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme_args() -> Vec<&'static str> {
        vec![
            "m1",
            "Acme",
            "logo.png",
            "retail",
            "10",
            "USD",
            "1.0",
            "2024-01-01",
        ]
    }

    #[test]
    fn from_args_maps_positions() {
        let m = Merchant::from_args(&acme_args()).unwrap();
        assert_eq!(m.id, "m1");
        assert_eq!(m.fields.name, "Acme");
        assert_eq!(m.fields.logo, "logo.png");
        assert_eq!(m.fields.industry, "retail");
        assert_eq!(m.fields.points_rate, "10");
        assert_eq!(m.fields.currency, "USD");
        assert_eq!(m.fields.exchange_rate, "1.0");
        assert_eq!(m.fields.updated_at, "2024-01-01");
    }

    #[test]
    fn from_args_rejects_wrong_count() {
        let err = Merchant::from_args(&["m1", "Acme"]).unwrap_err();
        assert_eq!(
            err,
            TypeError::FieldCount {
                expected: 8,
                actual: 2
            }
        );
    }

    #[test]
    fn from_args_rejects_reserved_id() {
        let mut args = acme_args();
        args[0] = "_Merchantindex";
        let err = Merchant::from_args(&args).unwrap_err();
        assert!(matches!(err, TypeError::InvalidMerchantId { .. }));
    }

    #[test]
    fn wire_field_names() {
        let m = Merchant::from_args(&acme_args()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&m.to_bytes().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "merchantId",
            "merchantName",
            "merchantLogo",
            "merchantIndustry",
            "pointsPerDollarSpent",
            "merchantCurrency",
            "exchangeRate",
            "merchantCU_date",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 8);
        assert_eq!(obj["merchantId"], "m1");
    }

    #[test]
    fn values_needing_escapes_survive_storage() {
        let mut m = Merchant::from_args(&acme_args()).unwrap();
        m.fields.name = "Acme \"Quoted\" , {Braces}".into();
        let decoded = Merchant::from_bytes(&m.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, m);
    }

    #[test]
    fn legacy_id_spelling_is_accepted() {
        let legacy = br#"{"merchantID":"m9","merchantName":"Old","merchantLogo":"",
            "merchantIndustry":"","pointsPerDollarSpent":"","merchantCurrency":"",
            "exchangeRate":"","merchantCU_date":""}"#;
        let m = Merchant::from_bytes(legacy).unwrap();
        assert_eq!(m.id, "m9");
        assert_eq!(m.fields.name, "Old");
    }

    #[test]
    fn apply_keeps_identity() {
        let mut m = Merchant::from_args(&acme_args()).unwrap();
        let fields = MerchantFields {
            name: "Acme Co".into(),
            ..m.fields.clone()
        };
        m.apply(fields);
        assert_eq!(m.id, "m1");
        assert_eq!(m.fields.name, "Acme Co");
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(Merchant::from_bytes(b"not json").is_err());
        assert!(Merchant::from_bytes(b"").is_err());
    }
}
