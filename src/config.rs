//! Layered configuration (§6, ambient): defaults, overridden by an optional
//! TOML file, overridden by environment variables. The external YAML-based
//! CLI configuration loader is a separate concern and is not implemented here.

use crate::error::Result;
use crate::extractor::confidence::ConfidenceWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "VEDIC_LORE_";

/**
 * Layered pipeline configuration: defaults -> optional TOML file -> environment.
 *
 * DESIGN DECISION: three layers applied in a fixed order, each layer only
 * overriding the fields it actually sets.
 * WHY: a deployment needs all three control points — a checked-in default
 * so the pipeline runs with no configuration at all, a TOML file for
 * per-install tuning, and environment variables for per-process overrides
 * (container orchestration, CI) without editing a file on disk.
 *
 * REASONING CHAIN:
 * 1. `Default` gives every field a value that makes `RuleExtractor`/
 *    `Corrector` usable with zero configuration.
 * 2. `#[serde(default)]` on the struct means a TOML file only needs to name
 *    the fields it wants to change; everything else falls through to the
 *    struct's `Default` impl instead of deserialization failing.
 * 3. Environment overrides apply last and unconditionally, so they always
 *    win over both the default and the file — the intended precedence for
 *    a value set at process-launch time.
 * 4. `confidence_weights` is config, not a compile-time constant, so a
 *    caller tuning extraction quality for a particular source doesn't need
 *    to recompile; `relaxed_fallback_cap`/`keyword_fallback_cap` are plain
 *    fields here for the same reason, even though `RuleExtractor` itself
 *    treats its own internal fallback caps as fixed.
 *
 * RELATED: `extractor::confidence::ConfidenceWeights`, `corrector::Corrector`
 * (consumes `correction_batch_size`/`correction_timeout_secs`)
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub storage_path: PathBuf,
    pub confidence_weights: ConfidenceWeights,
    pub relaxed_fallback_cap: f64,
    pub keyword_fallback_cap: f64,
    pub min_confidence: f64,
    pub correction_batch_size: usize,
    pub correction_timeout_secs: u64,
    pub lexicon_overrides_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            confidence_weights: ConfidenceWeights::default(),
            relaxed_fallback_cap: 0.55,
            keyword_fallback_cap: 0.40,
            min_confidence: 0.3,
            correction_batch_size: 5,
            correction_timeout_secs: 60,
            lexicon_overrides_path: None,
        }
    }
}

impl PipelineConfig {
    pub fn correction_timeout(&self) -> Duration {
        Duration::from_secs(self.correction_timeout_secs)
    }

    /// Defaults, then an optional TOML file (if it exists), then environment
    /// variables prefixed `VEDIC_LORE_` (e.g. `VEDIC_LORE_MIN_CONFIDENCE=0.4`).
    pub fn load(toml_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = toml_path {
            if path.exists() {
                let text = std::fs::read_to_string(path)?;
                config = toml::from_str(&text)?;
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(format!("{ENV_PREFIX}STORAGE_PATH")) {
            self.storage_path = PathBuf::from(v);
        }
        if let Some(v) = env_f64("MIN_CONFIDENCE") {
            self.min_confidence = v;
        }
        if let Some(v) = env_f64("RELAXED_FALLBACK_CAP") {
            self.relaxed_fallback_cap = v;
        }
        if let Some(v) = env_f64("KEYWORD_FALLBACK_CAP") {
            self.keyword_fallback_cap = v;
        }
        if let Ok(Ok(v)) = std::env::var(format!("{ENV_PREFIX}CORRECTION_BATCH_SIZE")).map(|s| s.parse()) {
            self.correction_batch_size = v;
        }
        if let Ok(Ok(v)) = std::env::var(format!("{ENV_PREFIX}CORRECTION_TIMEOUT_SECS")).map(|s| s.parse()) {
            self.correction_timeout_secs = v;
        }
        if let Ok(v) = std::env::var(format!("{ENV_PREFIX}LEXICON_OVERRIDES_PATH")) {
            self.lexicon_overrides_path = Some(PathBuf::from(v));
        }
    }
}

fn env_f64(suffix: &str) -> Option<f64> {
    std::env::var(format!("{ENV_PREFIX}{suffix}")).ok()?.parse().ok()
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("vedic-lore")
        .join("knowledge.sqlite")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_fallback_caps() {
        let config = PipelineConfig::default();
        assert_eq!(config.relaxed_fallback_cap, 0.55);
        assert_eq!(config.keyword_fallback_cap, 0.40);
        assert_eq!(config.correction_batch_size, 5);
        assert_eq!(config.correction_timeout_secs, 60);
    }

    #[test]
    fn loads_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "min_confidence = 0.45\ncorrection_batch_size = 8\n").unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.min_confidence, 0.45);
        assert_eq!(config.correction_batch_size, 8);
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        std::env::set_var("VEDIC_LORE_MIN_CONFIDENCE", "0.6");
        let config = PipelineConfig::load(None).unwrap();
        assert_eq!(config.min_confidence, 0.6);
        std::env::remove_var("VEDIC_LORE_MIN_CONFIDENCE");
    }
}
