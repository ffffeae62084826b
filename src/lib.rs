//! Student depression risk assessment.
//!
//! Survey answers are aligned to the column layout a classifier was trained
//! on, scored, and banded into Low / Moderate / High risk.

pub mod align;
pub mod api;
pub mod banding;
pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod schema;

pub use align::{align, AlignedVector, Alignment, FeatureAligner};
pub use banding::{RiskAssessment, RiskBand, RiskThresholds};
pub use config::{AppConfig, Variant};
pub use data::{DietaryHabits, Gender, GpaScale, RawAnswers, SleepDuration};
pub use error::{Result, RiskError};
pub use model::{ModelArtifact, ProbabilisticModel, RiskClassifier};
pub use pipeline::{RiskPipeline, RiskReport};
pub use schema::FeatureSchema;
