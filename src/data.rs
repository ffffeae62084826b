use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RiskError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DietaryHabits {
    Healthy,
    Moderate,
    Unhealthy,
}

impl DietaryHabits {
    pub const ALL: [DietaryHabits; 3] = [
        DietaryHabits::Healthy,
        DietaryHabits::Moderate,
        DietaryHabits::Unhealthy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryHabits::Healthy => "Healthy",
            DietaryHabits::Moderate => "Moderate",
            DietaryHabits::Unhealthy => "Unhealthy",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SleepDuration {
    #[serde(rename = "Less than 5 hours")]
    LessThan5,
    #[serde(rename = "5-6 hours")]
    FiveToSix,
    #[serde(rename = "7-8 hours")]
    SevenToEight,
    #[serde(rename = "More than 8 hours")]
    MoreThan8,
}

impl SleepDuration {
    pub const ALL: [SleepDuration; 4] = [
        SleepDuration::LessThan5,
        SleepDuration::FiveToSix,
        SleepDuration::SevenToEight,
        SleepDuration::MoreThan8,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SleepDuration::LessThan5 => "Less than 5 hours",
            SleepDuration::FiveToSix => "5-6 hours",
            SleepDuration::SevenToEight => "7-8 hours",
            SleepDuration::MoreThan8 => "More than 8 hours",
        }
    }
}

impl fmt::Display for SleepDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Financial stress levels offered by the survey form
pub const FINANCIAL_STRESS_LEVELS: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];

/// Scale the student reports CGPA on
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GpaScale {
    /// 0-10, fed to the model unchanged
    TenPoint,
    /// 0-4, multiplied by 2.5
    FourPoint,
}

impl GpaScale {
    pub fn max(&self) -> f64 {
        match self {
            GpaScale::TenPoint => 10.0,
            GpaScale::FourPoint => 4.0,
        }
    }

    /// Convert a CGPA on this scale to the 0-10 scale the model was trained on
    pub fn to_ten_point(&self, cgpa: f64) -> f64 {
        match self {
            GpaScale::TenPoint => cgpa,
            GpaScale::FourPoint => cgpa * 2.5,
        }
    }
}

/// Survey answers for one student, as submitted by the form
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RawAnswers {
    pub academic_pressure: f64,
    pub age: u32,
    pub study_satisfaction: f64,
    pub cgpa: f64,
    pub work_study_hours: f64,
    pub financial_stress: f64,
    pub gender: Gender,
    pub family_history: bool,
    pub dietary_habits: DietaryHabits,
    pub sleep_duration: SleepDuration,
}

fn check_range(errors: &mut Vec<String>, field: &str, value: f64, min: f64, max: f64) {
    if !value.is_finite() || value < min || value > max {
        errors.push(format!("{} must be between {} and {}, got {}", field, min, max, value));
    }
}

impl RawAnswers {
    /// Check every numeric answer against its form domain. The CGPA is
    /// checked on `scale`, before normalization.
    pub fn validate(&self, scale: GpaScale) -> Result<()> {
        let mut errors = Vec::new();

        check_range(&mut errors, "academic_pressure", self.academic_pressure, 1.0, 5.0);
        check_range(&mut errors, "age", self.age as f64, 18.0, 35.0);
        check_range(&mut errors, "study_satisfaction", self.study_satisfaction, 1.0, 5.0);
        check_range(&mut errors, "cgpa", self.cgpa, 0.0, scale.max());
        check_range(&mut errors, "work_study_hours", self.work_study_hours, 0.0, 16.0);
        check_range(&mut errors, "financial_stress", self.financial_stress, 1.0, 5.0);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RiskError::InvalidAnswers(errors))
        }
    }

    /// Same answers with CGPA converted to the 0-10 scale
    pub fn normalized(&self, scale: GpaScale) -> RawAnswers {
        RawAnswers {
            cgpa: scale.to_ten_point(self.cgpa),
            ..*self
        }
    }
}
