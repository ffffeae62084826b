use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use student_risk::{
    align, AppConfig, DietaryHabits, FeatureSchema, Gender, GpaScale, RawAnswers, RiskBand,
    RiskError, RiskPipeline, RiskThresholds, SleepDuration, Variant,
};

fn artifact(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts").join(name)
}

fn shipped_config(variant: Variant) -> AppConfig {
    let mut config = AppConfig::default();
    config.artifacts.model = artifact("model.json");
    config.artifacts.schema = artifact("feature_names.json");
    config.assessment.variant = variant;
    config
}

fn scenario() -> RawAnswers {
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

fn full_schema() -> Arc<FeatureSchema> {
    let names = [
        "Age",
        "Academic Pressure",
        "CGPA",
        "Study Satisfaction",
        "Work/Study Hours",
        "Gender_Male",
        "Sleep Duration_'5-6 hours'",
        "Sleep Duration_'7-8 hours'",
        "Sleep Duration_'Less than 5 hours'",
        "Sleep Duration_'More than 8 hours'",
        "Dietary Habits_Healthy",
        "Dietary Habits_Moderate",
        "Dietary Habits_Unhealthy",
        "Family History of Mental Illness_Yes",
        "Financial Stress_1.0",
        "Financial Stress_2.0",
        "Financial Stress_3.0",
        "Financial Stress_4.0",
        "Financial Stress_5.0",
    ];
    Arc::new(FeatureSchema::new(names.iter().map(|s| s.to_string()).collect()).unwrap())
}

#[test]
fn test_scenario_alignment() {
    let schema = full_schema();
    let alignment = align(&scenario(), &schema).unwrap();
    let vector = &alignment.vector;

    assert!(alignment.dropped.is_empty());
    assert_eq!(vector.len(), schema.len());

    let expected = [
        ("Age", 20.0),
        ("Academic Pressure", 3.0),
        ("CGPA", 7.5),
        ("Study Satisfaction", 3.0),
        ("Work/Study Hours", 6.0),
        ("Gender_Male", 1.0),
        ("Family History of Mental Illness_Yes", 0.0),
        ("Financial Stress_3.0", 1.0),
        ("Dietary Habits_Moderate", 1.0),
        ("Sleep Duration_'7-8 hours'", 1.0),
    ];
    for (name, value) in expected {
        assert_eq!(vector.get(name), Some(value), "column {}", name);
    }

    // Everything not listed above is zero-filled
    for (name, value) in vector.iter() {
        if !expected.iter().any(|(n, _)| *n == name) {
            assert_eq!(value, 0.0, "column {} should be zero", name);
        }
    }
}

#[test]
fn test_alignment_length_matches_schema_for_every_option() {
    let schema = full_schema();
    for gender in Gender::ALL {
        for habits in DietaryHabits::ALL {
            for sleep in SleepDuration::ALL {
                let raw = RawAnswers {
                    gender,
                    dietary_habits: habits,
                    sleep_duration: sleep,
                    ..scenario()
                };
                let alignment = align(&raw, &schema).unwrap();
                assert_eq!(alignment.vector.len(), schema.len());
                assert!(alignment.dropped.is_empty());
                let ones = alignment.vector.values().iter().filter(|v| **v == 1.0).count();
                // financial stress, diet and sleep are always set; Gender_Male only for Male
                let expected = if gender == Gender::Male { 4 } else { 3 };
                assert_eq!(ones, expected);
            }
        }
    }
}

#[test]
fn test_drifted_option_is_dropped_not_fatal() {
    let schema = full_schema();
    let raw = RawAnswers { financial_stress: 2.5, ..scenario() };
    let alignment = align(&raw, &schema).unwrap();

    assert_eq!(alignment.dropped.len(), 1);
    assert_eq!(alignment.dropped[0].column, "Financial Stress_2.5");
    assert!(alignment.vector.get("Financial Stress_2.5").is_none());
}

#[test]
fn test_shipped_artifacts_load() {
    let pipeline = RiskPipeline::from_config(&shipped_config(Variant::Classic)).unwrap();
    let info = pipeline.info();
    assert_eq!(info.schema_features, 16);
    assert_eq!(info.model.trees, Some(3));
    assert_eq!(info.thresholds, RiskThresholds::CLASSIC);
}

#[test]
fn test_assessment_is_deterministic() {
    let pipeline = RiskPipeline::from_config(&shipped_config(Variant::Classic)).unwrap();
    let first = pipeline.assess(&scenario()).unwrap();
    for _ in 0..10 {
        assert_eq!(pipeline.assess(&scenario()).unwrap(), first);
    }
}

#[test]
fn test_shipped_model_bands() {
    let pipeline = RiskPipeline::from_config(&shipped_config(Variant::Classic)).unwrap();

    let struggling = RawAnswers {
        academic_pressure: 5.0,
        study_satisfaction: 2.0,
        financial_stress: 5.0,
        family_history: true,
        sleep_duration: SleepDuration::LessThan5,
        ..scenario()
    };
    let report = pipeline.report(&struggling).unwrap();
    assert_eq!(report.band, RiskBand::High);
    assert!((report.probability - 2.05 / 3.0).abs() < 1e-9);
    assert_eq!(report.confidence, report.probability);

    let thriving = RawAnswers {
        academic_pressure: 2.0,
        age: 28,
        study_satisfaction: 4.0,
        financial_stress: 1.0,
        dietary_habits: DietaryHabits::Healthy,
        ..scenario()
    };
    let report = pipeline.report(&thriving).unwrap();
    assert_eq!(report.band, RiskBand::Low);
    assert!((report.probability - 0.25).abs() < 1e-9);
    assert!((report.confidence - 0.75).abs() < 1e-9);
}

#[test]
fn test_themed_variant_takes_four_point_gpa() {
    let pipeline = RiskPipeline::from_config(&shipped_config(Variant::Themed)).unwrap();
    assert_eq!(pipeline.gpa_scale(), GpaScale::FourPoint);

    let raw = RawAnswers { cgpa: 3.0, ..scenario() };
    let report = pipeline.report(&raw).unwrap();
    assert_eq!(report.spectrum, "Risk Spectrum: 0-45% Low | 45-70% Moderate | 70-100% High");

    // 7.5 is a valid 0-10 CGPA but not a valid 0-4 GPA
    assert!(matches!(pipeline.report(&scenario()), Err(RiskError::InvalidAnswers(_))));
}

#[test]
fn test_config_file_drives_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("risk.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        "[artifacts]\nmodel = {:?}\nschema = {:?}\n\n[assessment]\nvariant = \"themed\"\n",
        artifact("model.json").display().to_string(),
        artifact("feature_names.json").display().to_string(),
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    let pipeline = RiskPipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.thresholds(), RiskThresholds::THEMED);
}

#[test]
fn test_missing_model_is_startup_error() {
    let mut config = shipped_config(Variant::Classic);
    config.artifacts.model = PathBuf::from("/nonexistent/model.json");
    assert!(matches!(RiskPipeline::from_config(&config), Err(RiskError::Startup(_))));
}

#[test]
fn test_corrupt_model_is_startup_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"kind": "random_forest", "n_features": 16, "trees": []}}"#).unwrap();

    let mut config = shipped_config(Variant::Classic);
    config.artifacts.model = file.path().to_path_buf();
    assert!(matches!(RiskPipeline::from_config(&config), Err(RiskError::Startup(_))));
}
