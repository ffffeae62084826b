//! Answers -> aligned vector -> probability -> band

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::sync::Arc;

use crate::align::FeatureAligner;
use crate::banding::{RiskAssessment, RiskBand, RiskThresholds};
use crate::config::AppConfig;
use crate::data::{GpaScale, RawAnswers};
use crate::error::Result;
use crate::model::{ModelArtifact, ModelSummary, ProbabilisticModel, RiskClassifier};
use crate::schema::FeatureSchema;

/// What the presentation layer renders for one assessment
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RiskReport {
    pub probability: f64,
    pub band: RiskBand,
    pub headline: String,
    pub narrative: String,
    pub confidence: f64,
    pub confidence_label: String,
    pub colour: String,
    pub spectrum: String,
}

impl RiskReport {
    pub fn new(assessment: &RiskAssessment, thresholds: &RiskThresholds) -> Self {
        let band = assessment.band;
        Self {
            probability: assessment.probability,
            band,
            headline: band.headline().to_string(),
            narrative: band.narrative().to_string(),
            confidence: assessment.confidence(),
            confidence_label: band.confidence_label().to_string(),
            colour: band.colour().to_string(),
            spectrum: thresholds.spectrum_caption(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct PipelineInfo {
    pub model: ModelSummary,
    pub schema_features: usize,
    pub thresholds: RiskThresholds,
    pub gpa_scale: GpaScale,
    pub dropped_features_total: u64,
    pub loaded_at: DateTime<Utc>,
}

/// Loaded once at startup, then shared read-only between requests
pub struct RiskPipeline {
    aligner: FeatureAligner,
    classifier: RiskClassifier,
    thresholds: RiskThresholds,
    gpa_scale: GpaScale,
    loaded_at: DateTime<Utc>,
}

impl RiskPipeline {
    pub fn new(
        schema: Arc<FeatureSchema>,
        model: Box<dyn ProbabilisticModel>,
        thresholds: RiskThresholds,
        gpa_scale: GpaScale,
    ) -> Result<Self> {
        thresholds.validate()?;
        let classifier = RiskClassifier::new(Arc::clone(&schema), model)?;

        Ok(Self {
            aligner: FeatureAligner::new(schema),
            classifier,
            thresholds,
            gpa_scale,
            loaded_at: Utc::now(),
        })
    }

    /// Load schema and model artifacts named in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        info!("Loading feature schema from {}", config.artifacts.schema.display());
        let schema = Arc::new(FeatureSchema::load(&config.artifacts.schema)?);
        info!("Schema has {} features", schema.len());

        info!("Loading model from {}", config.artifacts.model.display());
        let model = ModelArtifact::load(&config.artifacts.model)?;

        Self::new(
            schema,
            Box::new(model),
            config.assessment.thresholds(),
            config.assessment.gpa_scale(),
        )
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds
    }

    pub fn gpa_scale(&self) -> GpaScale {
        self.gpa_scale
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        self.aligner.schema()
    }

    /// Score answers whose CGPA is on this pipeline's GPA scale. Ranges are not checked here.
    pub fn assess(&self, raw: &RawAnswers) -> Result<RiskAssessment> {
        let normalized = raw.normalized(self.gpa_scale);
        let alignment = self.aligner.align(&normalized)?;
        let probability = self.classifier.predict_probability(&alignment.vector)?;
        Ok(self.thresholds.classify(probability))
    }

    /// Validate, assess and render
    pub fn report(&self, raw: &RawAnswers) -> Result<RiskReport> {
        raw.validate(self.gpa_scale)?;
        let assessment = self.assess(raw)?;
        Ok(RiskReport::new(&assessment, &self.thresholds))
    }

    pub fn info(&self) -> PipelineInfo {
        PipelineInfo {
            model: self.classifier.summary(),
            schema_features: self.schema().len(),
            thresholds: self.thresholds,
            gpa_scale: self.gpa_scale,
            dropped_features_total: self.aligner.dropped_total(),
            loaded_at: self.loaded_at,
        }
    }
}
