//! Wash configuration module.
//!
//! Handles loading, validating, and merging `imgwash.toml`. Stock defaults
//! are overridden by whatever the user file sets; CLI flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [transform]
//! max_dimension = 1500       # Memory guard: downsample so both edges fit
//! target_width = 1000        # Final width; height keeps the aspect ratio
//! crop_margin = 10           # Max pixels trimmed from each edge
//! min_crop_dimension = 50    # Both edges must exceed this to crop at all
//! enhance_range = [0.9, 1.1] # Brightness/contrast factor range
//! quality = 95               # JPEG quality (1-100)
//!
//! [batch]
//! keywords = ["default"]     # Tags cycled across outputs
//! count = 10                 # Number of derivatives to produce
//! alt_template = "{keyword} 관련 이미지 자료"
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [batch]
//! keywords = ["boiler-cleaning", "window-insulation"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{EnhanceRange, Quality, TransformParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "imgwash.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete wash configuration.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WashConfig {
    /// Pixel pipeline settings.
    pub transform: TransformConfig,
    /// Batch size, keywords, and naming.
    pub batch: BatchConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl WashConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.transform;
        if t.quality == 0 || t.quality > 100 {
            return Err(ConfigError::Validation(
                "transform.quality must be 1-100".into(),
            ));
        }
        if t.target_width == 0 {
            return Err(ConfigError::Validation(
                "transform.target_width must be non-zero".into(),
            ));
        }
        if t.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "transform.max_dimension must be non-zero".into(),
            ));
        }
        let [lo, hi] = t.enhance_range;
        if !(lo > 0.0 && lo <= hi && hi.is_finite()) {
            return Err(ConfigError::Validation(
                "transform.enhance_range must be [min, max] with 0 < min <= max".into(),
            ));
        }
        if self.batch.count == 0 {
            return Err(ConfigError::Validation(
                "batch.count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl BatchConfig {
    /// Trim keywords and drop blank ones, falling back to `["default"]`.
    pub fn normalize(&mut self) {
        self.keywords = crate::naming::normalize_keywords(&self.keywords);
    }
}

/// Pixel pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Both edges are downsampled to at most this before anything else.
    pub max_dimension: u32,
    /// Output width in pixels.
    pub target_width: u32,
    /// Maximum pixels trimmed from each edge.
    pub crop_margin: u32,
    /// Images with an edge at or below this are never cropped.
    pub min_crop_dimension: u32,
    /// `[min, max]` for the brightness and contrast factors.
    pub enhance_range: [f64; 2],
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1500,
            target_width: 1000,
            crop_margin: 10,
            min_crop_dimension: 50,
            enhance_range: [0.9, 1.1],
            quality: 95,
        }
    }
}

impl TransformConfig {
    /// Pipeline parameters for these settings.
    pub fn params(&self) -> TransformParams {
        let range = EnhanceRange::new(self.enhance_range[0], self.enhance_range[1]);
        TransformParams {
            max_dimension: self.max_dimension,
            target_width: self.target_width,
            crop_margin: self.crop_margin,
            min_crop_dimension: self.min_crop_dimension,
            brightness: range,
            contrast: range,
            quality: Quality::new(self.quality),
        }
    }
}

/// Batch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Keywords, assigned round-robin by output index.
    pub keywords: Vec<String>,
    /// Number of derivatives to produce.
    pub count: usize,
    /// ALT text template; `{keyword}` is replaced.
    pub alt_template: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            keywords: vec![crate::naming::DEFAULT_KEYWORD.to_string()],
            count: 10,
            alt_template: "{keyword} 관련 이미지 자료".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(WashConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<WashConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: WashConfig = merged.try_into()?;
    config.batch.normalize();
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when it
/// is absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<WashConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `imgwash.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgwash Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--keywords, --count) override the values here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Pixel pipeline
# ---------------------------------------------------------------------------
[transform]
# Memory guard: images with either edge above this are downsampled first
# (box filter) so both edges fit.
max_dimension = 1500

# Final output width in pixels. Height follows the aspect ratio.
target_width = 1000

# Maximum pixels trimmed from each edge by the random crop.
crop_margin = 10

# Images with either edge at or below this size are never cropped.
min_crop_dimension = 50

# Brightness and contrast are each scaled by a random factor in this range.
enhance_range = [0.9, 1.1]

# JPEG encoding quality (1 = worst, 100 = best).
quality = 95

# ---------------------------------------------------------------------------
# Batch
# ---------------------------------------------------------------------------
[batch]
# Keywords used for output filenames and ALT text, cycled by output index.
keywords = ["default"]

# Number of derivative images to produce.
count = 10

# Suggested ALT text written to the manifest. {keyword} is substituted.
alt_template = "{keyword} 관련 이미지 자료"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn default_config_values() {
        let config = WashConfig::default();
        assert_eq!(config.transform.max_dimension, 1500);
        assert_eq!(config.transform.target_width, 1000);
        assert_eq!(config.transform.crop_margin, 10);
        assert_eq!(config.transform.min_crop_dimension, 50);
        assert_eq!(config.transform.enhance_range, [0.9, 1.1]);
        assert_eq!(config.transform.quality, 95);
        assert_eq!(config.batch.keywords, vec!["default"]);
        assert_eq!(config.batch.count, 10);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn transform_params_from_config() {
        let config = TransformConfig {
            enhance_range: [0.8, 1.2],
            quality: 70,
            ..TransformConfig::default()
        };
        let params = config.params();
        assert_eq!(params.brightness, EnhanceRange::new(0.8, 1.2));
        assert_eq!(params.contrast, EnhanceRange::new(0.8, 1.2));
        assert_eq!(params.quality.value(), 70);
        assert_eq!(params.target_width, 1000);
    }

    #[test]
    fn default_params_match_pipeline_defaults() {
        assert_eq!(
            TransformConfig::default().params(),
            TransformParams::default()
        );
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[transform]
quality = 95
target_width = 1000
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[transform]
quality = 80
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let transform = merged.get("transform").unwrap();
        assert_eq!(transform.get("quality").unwrap().as_integer(), Some(80));
        assert_eq!(
            transform.get("target_width").unwrap().as_integer(),
            Some(1000)
        );
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"keywords = ["a", "b", "c"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"keywords = ["z"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("keywords").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<WashConfig, _> = toml::from_str("[transform]\nqualty = 90\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<WashConfig, _> = toml::from_str("[transfrom]\nquality = 90\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(WashConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = WashConfig::default();
        config.transform.quality = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.transform.quality = 101;
        assert!(config.validate().is_err());
        config.transform.quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_enhance_range() {
        let mut config = WashConfig::default();
        config.transform.enhance_range = [1.1, 0.9];
        assert!(config.validate().is_err());
        config.transform.enhance_range = [0.0, 1.0];
        assert!(config.validate().is_err());
        config.transform.enhance_range = [1.0, 1.0];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_zero_dimensions() {
        let mut config = WashConfig::default();
        config.transform.target_width = 0;
        assert!(config.validate().is_err());

        let mut config = WashConfig::default();
        config.transform.max_dimension = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_batch() {
        let mut config = WashConfig::default();
        config.batch.count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn batch_normalize_trims_and_drops_blanks() {
        let mut batch = BatchConfig {
            keywords: vec![" boiler ".into(), "  ".into(), "window".into()],
            ..BatchConfig::default()
        };
        batch.normalize();
        assert_eq!(batch.keywords, vec!["boiler", "window"]);

        batch.keywords = vec![" ".into(), String::new()];
        batch.normalize();
        assert_eq!(batch.keywords, vec!["default"]);
    }

    // =========================================================================
    // Loading tests
    // =========================================================================

    #[test]
    fn load_config_missing_file_is_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, WashConfig::default());
    }

    #[test]
    fn load_config_reads_sparse_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[batch]
keywords = ["보일러청소", "단열뽁뽁이"]
count = 3
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.batch.keywords, vec!["보일러청소", "단열뽁뽁이"]);
        assert_eq!(config.batch.count, 3);
        // Unspecified values should be defaults
        assert_eq!(config.transform.quality, 95);
        assert_eq!(config.batch.alt_template, "{keyword} 관련 이미지 자료");
    }

    #[test]
    fn load_config_normalizes_keywords() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[batch]\nkeywords = [\" boiler \", \"  \"]\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.batch.keywords, vec!["boiler"]);

        fs::write(&path, "[batch]\nkeywords = [\"\", \" \"]\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.batch.keywords, vec!["default"]);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[transform]\nquality = 250\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_rejects_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[batch]\nkeyword = [\"a\"]\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    // =========================================================================
    // Stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: WashConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, WashConfig::default());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value();
        let table = value.as_table().unwrap();
        for section in ["transform", "batch", "processing"] {
            assert!(table.contains_key(section), "missing [{section}]");
        }
    }
}
