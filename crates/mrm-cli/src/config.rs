use std::path::{Path, PathBuf};

use anyhow::Context;
use mrm_registry::RegistryConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORE_PATH: &str = "merchants.json";

/// Contents of the optional `--config` TOML file.
///
/// ```toml
/// store_path = "data/merchants.json"
///
/// [registry]
/// index_key = "_Merchantindex"
/// error_event = "errEvent"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store_path: Option<PathBuf>,
    pub registry: RegistryConfig,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.registry.validate()?;
        Ok(config)
    }

    /// Store location: the flag wins over the file, which wins over the default.
    pub fn resolve_store_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.store_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config = CliConfig::parse("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(
            config.resolve_store_path(None),
            PathBuf::from(DEFAULT_STORE_PATH)
        );
    }

    #[test]
    fn reads_store_path_and_registry_section() {
        let config = CliConfig::parse(
            r#"
            store_path = "data/m.json"

            [registry]
            index_key = "_idx"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolve_store_path(None), PathBuf::from("data/m.json"));
        assert_eq!(config.registry.index_key, "_idx");
        assert_eq!(config.registry.success_event, "evtsender");
    }

    #[test]
    fn flag_overrides_file() {
        let config = CliConfig {
            store_path: Some("from-file.json".into()),
            ..Default::default()
        };
        let flag = PathBuf::from("from-flag.json");
        assert_eq!(config.resolve_store_path(Some(&flag)), flag);
    }

    #[test]
    fn invalid_registry_section_is_refused() {
        assert!(CliConfig::parse("[registry]\nindex_key = \"plain\"").is_err());
        assert!(CliConfig::parse("store_path = 3").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }
}
