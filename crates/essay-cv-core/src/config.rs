//! Run configuration for essay-cv
//!
//! Configuration is read from `essay-cv.toml` (or an explicit `--config`
//! path) and falls back to built-in defaults. It is validated once and then
//! passed by reference to every component that needs it.

pub mod types;

use std::fs;
use std::path::Path;

use crate::error::{EssayCvError, Result};
use crate::rubric::RubricSchema;

pub use types::{InputKind, ModelConfig, RunConfig, DEFAULT_CONFIG_FILE};

impl RunConfig {
    /// Load configuration from a file
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| EssayCvError::io_operation("read config", path.display(), e))?;
        let config: RunConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration: explicit path, then `essay-cv.toml` in `dir`,
    /// then defaults.
    ///
    /// Relative paths inside a file are taken relative to that file's
    /// directory; default paths are relative to `dir`.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            let base = path.parent().unwrap_or(dir);
            return Ok(Self::load(path)?.resolved(base));
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using discovered config");
            return Ok(Self::load(&candidate)?.resolved(dir));
        }
        tracing::debug!("no config file found, using defaults");
        Ok(RunConfig::default().resolved(dir))
    }

    /// Anchor every relative path at `base`
    pub fn resolved(mut self, base: &Path) -> Self {
        for path in [
            &mut self.data_path,
            &mut self.features_path,
            &mut self.readability_path,
            &mut self.output_root,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EssayCvError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.folds == 0 {
            crate::bail_config!("folds must be at least 1");
        }
        if self.epochs == 0 {
            crate::bail_config!("epochs must be at least 1");
        }
        if self.batch_size == 0 {
            crate::bail_config!("batch_size must be at least 1");
        }
        // <pad> and <unk> are always reserved
        if self.vocab_size < 3 {
            crate::bail_config!("vocab_size must be at least 3, got {}", self.vocab_size);
        }
        if !(self.model.learning_rate > 0.0 && self.model.learning_rate.is_finite()) {
            crate::bail_config!(
                "model.learning_rate must be positive, got {}",
                self.model.learning_rate
            );
        }
        if self.model.l2.is_nan() || self.model.l2 < 0.0 {
            crate::bail_config!("model.l2 must be non-negative, got {}", self.model.l2);
        }
        Ok(())
    }

    /// The rubric this run scores against
    pub fn rubric(&self) -> Result<RubricSchema> {
        if self.prompts.is_empty() {
            Ok(RubricSchema::asap())
        } else {
            RubricSchema::from_prompts(self.prompts.iter().cloned())
        }
    }
}
