//! Service configuration, read from a TOML file at startup

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::banding::RiskThresholds;
use crate::data::GpaScale;
use crate::error::{Result, RiskError};

pub const DEFAULT_CONFIG_PATH: &str = "config/risk.toml";

/// The two shipped form variants
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// CGPA on 0-10, 35% / 60% thresholds
    Classic,
    /// GPA on 0-4, 45% / 70% thresholds
    Themed,
}

impl Variant {
    pub fn thresholds(&self) -> RiskThresholds {
        match self {
            Variant::Classic => RiskThresholds::CLASSIC,
            Variant::Themed => RiskThresholds::THEMED,
        }
    }

    pub fn gpa_scale(&self) -> GpaScale {
        match self {
            Variant::Classic => GpaScale::TenPoint,
            Variant::Themed => GpaScale::FourPoint,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ArtifactConfig {
    pub model: PathBuf,
    pub schema: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("artifacts/model.json"),
            schema: PathBuf::from("artifacts/feature_names.json"),
        }
    }
}

/// Variant preset with optional overrides
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AssessmentConfig {
    pub variant: Variant,
    pub thresholds: Option<RiskThresholds>,
    pub gpa_scale: Option<GpaScale>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Classic,
            thresholds: None,
            gpa_scale: None,
        }
    }
}

impl AssessmentConfig {
    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds.unwrap_or_else(|| self.variant.thresholds())
    }

    pub fn gpa_scale(&self) -> GpaScale {
        self.gpa_scale.unwrap_or_else(|| self.variant.gpa_scale())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactConfig,
    pub assessment: AssessmentConfig,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RiskError::Startup(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load `path` if given; otherwise the default path, or built-in defaults when it does not exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    info!("No config at {}, using built-in defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.assessment.thresholds().validate()
    }
}
