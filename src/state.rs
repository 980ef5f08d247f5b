use std::fs;

use log::{info, warn};

use crate::config::AppConfig;
use crate::oficio::OficioPipeline;

/// Shared application state, cloned into every worker.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: OficioPipeline,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let pipeline = OficioPipeline::new(config.generated_dir.clone());
        Self { config, pipeline }
    }

    /// Create the working directories and build the state.
    ///
    /// A missing template is not fatal here; requests report it.
    pub fn bootstrap(config: AppConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.upload_dir)?;
        fs::create_dir_all(&config.generated_dir)?;
        info!(
            "Uploads in {}, generated documents in {}",
            config.upload_dir.display(),
            config.generated_dir.display()
        );

        if !config.template_path.is_file() {
            warn!(
                "Template {} not found; generation requests will fail until it exists",
                config.template_path.display()
            );
        }

        Ok(Self::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_creates_directories() {
        let root = tempfile::tempdir().unwrap();
        let config = AppConfig {
            upload_dir: root.path().join("in"),
            generated_dir: root.path().join("out").join("runs"),
            template_path: root.path().join("modelo.docx"),
            ..AppConfig::default()
        };

        let state = AppState::bootstrap(config).unwrap();
        assert!(root.path().join("in").is_dir());
        assert!(root.path().join("out").join("runs").is_dir());
        assert_eq!(state.pipeline.generated_root(), root.path().join("out").join("runs"));
    }
}
