use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for marine-flow
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MarineFlowConfig {
    /// Where workflow and passthrough records are kept
    pub store: StoreConfig,
    /// Workflow defaults
    pub workflow: WorkflowConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory backing the file store
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Instance used when none is given on the command line
    pub default_instance: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".marine-flow/store"),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_instance: "default".to_string(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl MarineFlowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (marine-flow.toml, .marine-flow-rc)
    /// 3. Environment variables (MARINE_FLOW__SECTION__FIELD)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`MarineFlowConfig::load`], looking for files under `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_path = dir.join("marine-flow.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".marine-flow-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("MARINE_FLOW")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let marine_flow_config: MarineFlowConfig = config.try_deserialize()?;
        Ok(marine_flow_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = MarineFlowConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.workflow.default_instance, "default");
        assert_eq!(config.store.data_dir, PathBuf::from(".marine-flow/store"));
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("marine-flow.toml"),
            "[workflow]\ndefault_instance = \"shipment-9\"\n\n[observability]\njson_logs = true\n",
        )
        .unwrap();

        let config = MarineFlowConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.workflow.default_instance, "shipment-9");
        assert!(config.observability.json_logs);
        assert_eq!(config.observability.log_level, "warn");
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut config = MarineFlowConfig::default();
        config.store.data_dir = PathBuf::from("/var/lib/marine-flow");
        config.save_to_file(dir.path().join("marine-flow.toml")).unwrap();

        let loaded = MarineFlowConfig::load_from(dir.path()).unwrap();
        assert_eq!(loaded.store.data_dir, PathBuf::from("/var/lib/marine-flow"));
    }
}
