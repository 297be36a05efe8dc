use mrm_types::MerchantId;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Configuration for a [`MerchantRegistry`](crate::MerchantRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Store key of the index record.
    pub index_key: String,
    /// Store key that `init` writes its deployment message to.
    pub init_key: String,
    /// Event name for 200 notifications.
    pub success_event: String,
    /// Event name for 503 notifications.
    pub error_event: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            index_key: "_Merchantindex".into(),
            init_key: "_init".into(),
            success_event: "evtsender".into(),
            error_event: "errEvent".into(),
        }
    }
}

impl RegistryConfig {
    /// Check that registry keys cannot collide with merchant records or each
    /// other, and that both event names are usable.
    pub fn validate(&self) -> RegistryResult<()> {
        for (field, key) in [("index_key", &self.index_key), ("init_key", &self.init_key)] {
            if key.is_empty() || MerchantId::is_merchant_key(key) {
                return Err(RegistryError::Config(format!(
                    "{field} {key:?} must start with the reserved prefix"
                )));
            }
        }
        if self.index_key == self.init_key {
            return Err(RegistryError::Config(
                "index_key and init_key must differ".into(),
            ));
        }
        if self.success_event.is_empty() || self.error_event.is_empty() {
            return Err(RegistryError::Config("event names must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = RegistryConfig::default();
        assert_eq!(c.index_key, "_Merchantindex");
        assert_eq!(c.success_event, "evtsender");
        assert_eq!(c.error_event, "errEvent");
        c.validate().unwrap();
    }

    #[test]
    fn merchant_like_keys_are_rejected() {
        let c = RegistryConfig {
            index_key: "merchants".into(),
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(RegistryError::Config(_))));

        let c = RegistryConfig {
            init_key: "abc".into(),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn keys_must_differ() {
        let c = RegistryConfig {
            init_key: "_Merchantindex".into(),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn event_names_required() {
        let c = RegistryConfig {
            error_event: String::new(),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c: RegistryConfig = toml::from_str("index_key = \"_idx\"").unwrap();
        assert_eq!(c.index_key, "_idx");
        assert_eq!(c.init_key, "_init");
        c.validate().unwrap();
    }
}
