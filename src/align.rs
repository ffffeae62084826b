//! Feature alignment: survey answers to the trained column layout
//!
//! Every answer field has exactly one encoding rule that yields one named
//! column. Columns are then projected onto the trained schema: names the
//! schema does not know are dropped, schema names nobody produced stay 0.
//!
//! Column names must match the trained schema byte for byte, including the
//! quotes around sleep-duration values. A mismatch is not an error; the
//! signal is lost and reported through [`Alignment::dropped`] and
//! [`FeatureAligner::dropped_total`].

use log::debug;
use ndarray::Array1;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::data::{DietaryHabits, Gender, RawAnswers, SleepDuration};
use crate::error::{Result, RiskError};
use crate::schema::FeatureSchema;

pub const ACADEMIC_PRESSURE: &str = "Academic Pressure";
pub const AGE: &str = "Age";
pub const STUDY_SATISFACTION: &str = "Study Satisfaction";
pub const CGPA: &str = "CGPA";
pub const WORK_STUDY_HOURS: &str = "Work/Study Hours";
pub const GENDER_MALE: &str = "Gender_Male";
pub const FAMILY_HISTORY_YES: &str = "Family History of Mental Illness_Yes";

/// `Financial Stress_3.0`: the level is written as a float literal
pub fn financial_stress_column(level: f64) -> String {
    format!("Financial Stress_{:?}", level)
}

pub fn dietary_habits_column(habits: DietaryHabits) -> String {
    format!("Dietary Habits_{}", habits.as_str())
}

/// `Sleep Duration_'7-8 hours'`, quotes included
pub fn sleep_duration_column(duration: SleepDuration) -> String {
    format!("Sleep Duration_'{}'", duration)
}

/// One encoding rule per answer field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerField {
    AcademicPressure,
    Age,
    StudySatisfaction,
    Cgpa,
    WorkStudyHours,
    FinancialStress,
    Gender,
    FamilyHistory,
    DietaryHabits,
    SleepDuration,
}

impl AnswerField {
    pub const ALL: [AnswerField; 10] = [
        AnswerField::AcademicPressure,
        AnswerField::Age,
        AnswerField::StudySatisfaction,
        AnswerField::Cgpa,
        AnswerField::WorkStudyHours,
        AnswerField::FinancialStress,
        AnswerField::Gender,
        AnswerField::FamilyHistory,
        AnswerField::DietaryHabits,
        AnswerField::SleepDuration,
    ];

    /// Column name and value this field contributes for `raw`
    pub fn encode(&self, raw: &RawAnswers) -> EncodedFeature {
        let (column, value) = match self {
            AnswerField::AcademicPressure => (ACADEMIC_PRESSURE.to_string(), raw.academic_pressure),
            AnswerField::Age => (AGE.to_string(), raw.age as f64),
            AnswerField::StudySatisfaction => (STUDY_SATISFACTION.to_string(), raw.study_satisfaction),
            AnswerField::Cgpa => (CGPA.to_string(), raw.cgpa),
            AnswerField::WorkStudyHours => (WORK_STUDY_HOURS.to_string(), raw.work_study_hours),
            AnswerField::FinancialStress => (financial_stress_column(raw.financial_stress), 1.0),
            AnswerField::Gender => (
                GENDER_MALE.to_string(),
                if raw.gender == Gender::Male { 1.0 } else { 0.0 },
            ),
            AnswerField::FamilyHistory => (
                FAMILY_HISTORY_YES.to_string(),
                if raw.family_history { 1.0 } else { 0.0 },
            ),
            AnswerField::DietaryHabits => (dietary_habits_column(raw.dietary_habits), 1.0),
            AnswerField::SleepDuration => (sleep_duration_column(raw.sleep_duration), 1.0),
        };

        EncodedFeature { field: *self, column, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedFeature {
    pub field: AnswerField,
    pub column: String,
    pub value: f64,
}

/// Encode every answer field, before projection onto a schema
pub fn encode(raw: &RawAnswers) -> Vec<EncodedFeature> {
    AnswerField::ALL.iter().map(|field| field.encode(raw)).collect()
}

/// Feature values laid out exactly as the trained schema orders them
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    schema: Arc<FeatureSchema>,
    values: Array1<f64>,
}

impl AlignedVector {
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn names(&self) -> &[String] {
        self.schema.names()
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .names()
            .iter()
            .map(|name| name.as_str())
            .zip(self.values.iter().copied())
    }
}

/// Aligned vector plus the encoded columns the schema did not recognise
#[derive(Debug, Clone)]
pub struct Alignment {
    pub vector: AlignedVector,
    pub dropped: Vec<EncodedFeature>,
}

/// Project `raw` onto `schema`: zero-fill, then keep schema columns only
pub fn align(raw: &RawAnswers, schema: &Arc<FeatureSchema>) -> Result<Alignment> {
    if schema.is_empty() {
        return Err(RiskError::Schema("cannot align against an empty schema".to_string()));
    }

    let mut values = Array1::<f64>::zeros(schema.len());
    let mut dropped = Vec::new();

    for feature in encode(raw) {
        match schema.position(&feature.column) {
            Some(idx) => values[idx] = feature.value,
            None => dropped.push(feature),
        }
    }

    Ok(Alignment {
        vector: AlignedVector {
            schema: Arc::clone(schema),
            values,
        },
        dropped,
    })
}

/// Aligner bound to the process-wide schema; counts silently dropped columns
#[derive(Debug)]
pub struct FeatureAligner {
    schema: Arc<FeatureSchema>,
    dropped_total: AtomicU64,
}

impl FeatureAligner {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self {
            schema,
            dropped_total: AtomicU64::new(0),
        }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn align(&self, raw: &RawAnswers) -> Result<Alignment> {
        let alignment = align(raw, &self.schema)?;

        if !alignment.dropped.is_empty() {
            self.dropped_total
                .fetch_add(alignment.dropped.len() as u64, Ordering::Relaxed);
            for feature in &alignment.dropped {
                debug!("column '{}' ({:?}) not in trained schema, dropped", feature.column, feature.field);
            }
        }

        Ok(alignment)
    }

    /// Encoded columns dropped since start, across all requests.
    ///
    /// Schemas trained with drop-first one-hot encoding have no column for the
    /// baseline category of each field (with the shipped schema: financial
    /// stress 1.0, a healthy diet, 5-6 hours of sleep). Answering a baseline
    /// drops that column too, which is harmless: its value would be all-zero
    /// anyway. The count therefore includes ordinary answers, not only drift.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawAnswers {
        RawAnswers {
            academic_pressure: 3.0,
            age: 20,
            study_satisfaction: 3.0,
            cgpa: 7.5,
            work_study_hours: 6.0,
            financial_stress: 3.0,
            gender: Gender::Male,
            family_history: false,
            dietary_habits: DietaryHabits::Moderate,
            sleep_duration: SleepDuration::SevenToEight,
        }
    }

    fn schema(names: &[&str]) -> Arc<FeatureSchema> {
        Arc::new(FeatureSchema::new(names.iter().map(|s| s.to_string()).collect()).unwrap())
    }

    #[test]
    fn test_column_names_match_trained_spelling() {
        assert_eq!(financial_stress_column(3.0), "Financial Stress_3.0");
        assert_eq!(financial_stress_column(1.0), "Financial Stress_1.0");
        assert_eq!(dietary_habits_column(DietaryHabits::Unhealthy), "Dietary Habits_Unhealthy");
        assert_eq!(
            sleep_duration_column(SleepDuration::LessThan5),
            "Sleep Duration_'Less than 5 hours'"
        );
    }

    #[test]
    fn test_one_encoded_feature_per_field() {
        let encoded = encode(&raw());
        assert_eq!(encoded.len(), AnswerField::ALL.len());
        for (feature, field) in encoded.iter().zip(AnswerField::ALL.iter()) {
            assert_eq!(feature.field, *field);
        }
    }

    #[test]
    fn test_female_encodes_gender_male_zero() {
        let schema = schema(&[GENDER_MALE, AGE]);
        let female = RawAnswers { gender: Gender::Female, ..raw() };

        let alignment = align(&female, &schema).unwrap();
        assert_eq!(alignment.vector.get(GENDER_MALE), Some(0.0));

        let alignment = align(&raw(), &schema).unwrap();
        assert_eq!(alignment.vector.get(GENDER_MALE), Some(1.0));
    }

    #[test]
    fn test_family_history_indicator() {
        let schema = schema(&[FAMILY_HISTORY_YES]);
        let yes = RawAnswers { family_history: true, ..raw() };
        assert_eq!(align(&yes, &schema).unwrap().vector.get(FAMILY_HISTORY_YES), Some(1.0));
        assert_eq!(align(&raw(), &schema).unwrap().vector.get(FAMILY_HISTORY_YES), Some(0.0));
    }

    #[test]
    fn test_zero_fill_and_order() {
        let schema = schema(&[
            "Sleep Duration_'5-6 hours'",
            CGPA,
            "Dietary Habits_Healthy",
            "Financial Stress_3.0",
        ]);
        let alignment = align(&raw(), &schema).unwrap();

        assert_eq!(alignment.vector.len(), 4);
        assert_eq!(alignment.vector.values().to_vec(), vec![0.0, 7.5, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_columns_dropped_not_errors() {
        // Schema trained without quotes around sleep values
        let schema = schema(&[AGE, "Sleep Duration_7-8 hours"]);
        let alignment = align(&raw(), &schema).unwrap();

        assert_eq!(alignment.vector.get("Sleep Duration_7-8 hours"), Some(0.0));
        assert!(alignment.vector.get("Sleep Duration_'7-8 hours'").is_none());
        assert!(alignment
            .dropped
            .iter()
            .any(|f| f.column == "Sleep Duration_'7-8 hours'"));
        // Everything except Age is unknown to this schema
        assert_eq!(alignment.dropped.len(), AnswerField::ALL.len() - 1);
    }

    #[test]
    fn test_aligner_counts_drops_across_calls() {
        let aligner = FeatureAligner::new(schema(&[AGE, CGPA]));
        aligner.align(&raw()).unwrap();
        aligner.align(&raw()).unwrap();
        assert_eq!(aligner.dropped_total(), 2 * (AnswerField::ALL.len() as u64 - 2));
    }

    #[test]
    fn test_iter_pairs_names_with_values() {
        let schema = schema(&[AGE, WORK_STUDY_HOURS]);
        let alignment = align(&raw(), &schema).unwrap();
        let pairs: Vec<(&str, f64)> = alignment.vector.iter().collect();
        assert_eq!(pairs, vec![(AGE, 20.0), (WORK_STUDY_HOURS, 6.0)]);
    }
}
