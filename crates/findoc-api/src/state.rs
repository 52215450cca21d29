use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use findoc_core::{Analyzer, GenerationBackend, OpenAiBackend};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
    upload_dir: Arc<PathBuf>,
    output_dir: Arc<PathBuf>,
}

impl AppState {
    /// Build production state. Fails fast when the generation credential is
    /// absent so a misconfigured service never accepts uploads.
    pub fn try_new(config: &AppConfig) -> Result<Self> {
        let backend: Arc<dyn GenerationBackend> = Arc::new(OpenAiBackend::from_env()?);
        Ok(Self::with_backend(config, backend))
    }

    /// Build state around any backend implementation (test seam).
    pub fn with_backend(config: &AppConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            analyzer: Arc::new(Analyzer::new(backend)),
            upload_dir: Arc::new(config.upload_dir.clone()),
            output_dir: Arc::new(config.output_dir.clone()),
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
