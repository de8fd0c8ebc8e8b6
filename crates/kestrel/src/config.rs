//! # Configuration
//!
//! One TOML file, loaded once at startup. Every section and every key is
//! optional:
//!
//! ```toml
//! [dispatch]
//! max_parallelism = 4
//! synchronous = false
//! thread_name_prefix = "kestrel-worker"
//!
//! [bundles]
//! ray_capacity = 4096
//! marker_capacity = 512
//! rigid_body_capacity = 64
//!
//! [pipeline]
//! chunk_size = 256
//! event_capacity = 1024
//! ```

use std::path::Path;

use kestrel_dispatch::DispatchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KestrelConfig {
    /// Worker pool.
    pub dispatch: DispatchConfig,
    /// Initial bundle capacities.
    pub bundles: BundleConfig,
    /// Frame pipeline.
    pub pipeline: PipelineConfig,
}

/// Initial capacities of the per-frame bundles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Camera rays per frame.
    pub ray_capacity: usize,
    /// Markers per frame.
    pub marker_capacity: usize,
    /// Rigid bodies per frame.
    pub rigid_body_capacity: usize,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            ray_capacity: 4096,
            marker_capacity: 512,
            rigid_body_capacity: 64,
        }
    }
}

/// Frame pipeline settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Entities per dispatched task.
    pub chunk_size: usize,
    /// Capacity of the event channel.
    pub event_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            event_capacity: 1024,
        }
    }
}

impl KestrelConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML, [`ConfigError::Invalid`]
    /// for out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad key.
    pub fn validate(&self) -> ConfigResult<()> {
        self.dispatch
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("dispatch.max_parallelism: {e}")))?;
        if self.pipeline.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.chunk_size must be at least 1".to_string(),
            ));
        }
        if self.pipeline.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = KestrelConfig::from_toml_str("").unwrap();
        assert_eq!(config, KestrelConfig::default());
        assert_eq!(config.dispatch.thread_name_prefix, "kestrel-worker");
        assert_eq!(config.pipeline.chunk_size, 256);
    }

    #[test]
    fn test_partial_sections() {
        let config = KestrelConfig::from_toml_str(
            r#"
            [dispatch]
            max_parallelism = 2

            [bundles]
            marker_capacity = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatch.max_parallelism, Some(2));
        assert!(!config.dispatch.synchronous);
        assert_eq!(config.bundles.marker_capacity, 64);
        assert_eq!(config.bundles.ray_capacity, 4096);
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_zero_values_rejected() {
        for text in [
            "[dispatch]\nmax_parallelism = 0",
            "[pipeline]\nchunk_size = 0",
            "[pipeline]\nevent_capacity = 0",
        ] {
            assert!(matches!(
                KestrelConfig::from_toml_str(text),
                Err(ConfigError::Invalid(_))
            ));
        }
    }

    #[test]
    fn test_syntax_errors_reported() {
        assert!(matches!(
            KestrelConfig::from_toml_str("[dispatch"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            KestrelConfig::from_toml_str("[pipeline]\nchunk_size = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = KestrelConfig::load("/nonexistent/kestrel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
