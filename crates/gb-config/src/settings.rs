//! Engine settings: inference precision, path search limits, and logging.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::{check_schema_version, ValidationError, ValidationResult};

/// Complete engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineSettings {
    pub schema_version: String,

    #[serde(default)]
    pub inference: InferenceSettings,

    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Inference engine knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InferenceSettings {
    /// Decimal digits kept in reported probabilities.
    #[serde(default = "default_round_digits")]
    pub round_digits: u32,

    /// Evaluate independent queries (all-variable posteriors) in parallel.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            round_digits: default_round_digits(),
            parallel: true,
        }
    }
}

/// Simple-path enumeration limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PathSettings {
    /// Largest grid (in vertices) for which simple paths are enumerated.
    #[serde(default = "default_max_grid_vertices")]
    pub max_grid_vertices: usize,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            max_grid_vertices: default_max_grid_vertices(),
        }
    }
}

/// Logging output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoggingSettings {
    /// Level name (`trace` through `error`) used when `GB_LOG` is unset.
    /// Per-target directives belong in `GB_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_round_digits() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_max_grid_vertices() -> usize {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl EngineSettings {
    /// Load settings from a JSON file.
    pub fn from_file(path: &std::path::Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse settings from a JSON string.
    pub fn parse_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    pub fn validate(&self) -> ValidationResult<()> {
        check_schema_version(&self.schema_version)?;

        if !(1..=15).contains(&self.inference.round_digits) {
            return Err(ValidationError::InvalidValue {
                field: "inference.round_digits".to_string(),
                message: format!("must be in 1..=15, got {}", self.inference.round_digits),
            });
        }
        if self.paths.max_grid_vertices == 0 {
            return Err(ValidationError::InvalidValue {
                field: "paths.max_grid_vertices".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "logging.level".to_string(),
                message: format!("unknown level '{}'", self.logging.level),
            });
        }
        Ok(())
    }
}

/// Embedded default settings.
const DEFAULT_SETTINGS_JSON: &str = include_str!("schemas/settings.default.json");

impl Default for EngineSettings {
    fn default() -> Self {
        // This should never fail since the JSON is embedded at compile time
        Self::parse_json(DEFAULT_SETTINGS_JSON).expect("Embedded default settings JSON is invalid")
    }
}
