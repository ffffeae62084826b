//! Probability to risk band, plus the narrative shown for each band

use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn headline(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk Profile",
            RiskBand::Moderate => "Moderate / Borderline Risk",
            RiskBand::High => "High Risk Profile",
        }
    }

    pub fn narrative(&self) -> &'static str {
        match self {
            RiskBand::Low => {
                "Your answers align with low-risk profiles. Keep looking after your sleep, diet and workload."
            }
            RiskBand::Moderate => {
                "Warning: your answers show some vulnerability. This is not a definitive high-risk result, \
                 but it is worth talking to someone you trust or a counsellor."
            }
            RiskBand::High => {
                "Urgent: several key indicators (like Academic Pressure or Financial Stress) strongly align \
                 with at-risk profiles. Please reach out to a mental health professional."
            }
        }
    }

    /// Low reports confidence of safety, the other bands confidence of risk
    pub fn confidence_label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Safe",
            RiskBand::Moderate | RiskBand::High => "Risk",
        }
    }

    /// Display colour for the result panel
    pub fn colour(&self) -> &'static str {
        match self {
            RiskBand::Low => "green",
            RiskBand::Moderate => "amber",
            RiskBand::High => "red",
        }
    }
}

/// Threshold pair: Low below `low_upper`, High above `high_lower`, Moderate in between (inclusive)
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub low_upper: f64,
    pub high_lower: f64,
}

impl RiskThresholds {
    /// Plain form: 35% / 60%
    pub const CLASSIC: RiskThresholds = RiskThresholds { low_upper: 0.35, high_lower: 0.60 };
    /// Themed form: 45% / 70%
    pub const THEMED: RiskThresholds = RiskThresholds { low_upper: 0.45, high_lower: 0.70 };

    pub fn new(low_upper: f64, high_lower: f64) -> Result<Self> {
        let thresholds = Self { low_upper, high_lower };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.low_upper && self.low_upper <= self.high_lower && self.high_lower <= 1.0;
        if ordered {
            Ok(())
        } else {
            Err(RiskError::Config(format!(
                "thresholds must satisfy 0 <= low_upper <= high_lower <= 1, got {} / {}",
                self.low_upper, self.high_lower
            )))
        }
    }

    pub fn band(&self, probability: f64) -> RiskBand {
        if probability < self.low_upper {
            RiskBand::Low
        } else if probability <= self.high_lower {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }

    pub fn classify(&self, probability: f64) -> RiskAssessment {
        RiskAssessment {
            probability,
            band: self.band(probability),
        }
    }

    /// e.g. `Risk Spectrum: 0-35% Low | 35-60% Moderate | 60-100% High`
    pub fn spectrum_caption(&self) -> String {
        let low = (self.low_upper * 100.0).round();
        let high = (self.high_lower * 100.0).round();
        format!(
            "Risk Spectrum: 0-{low}% Low | {low}-{high}% Moderate | {high}-100% High",
            low = low,
            high = high
        )
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds::CLASSIC
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub probability: f64,
    pub band: RiskBand,
}

impl RiskAssessment {
    /// `1 - p` for Low, `p` otherwise
    pub fn confidence(&self) -> f64 {
        match self.band {
            RiskBand::Low => 1.0 - self.probability,
            RiskBand::Moderate | RiskBand::High => self.probability,
        }
    }
}
