use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::banding::RiskBand;
use crate::data::{DietaryHabits, Gender, RawAnswers, SleepDuration};
use crate::error::{Result, RiskError};
use crate::pipeline::{RiskPipeline, RiskReport};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StudentAnswers {
    pub name: String,
    #[serde(flatten)]
    pub answers: RawAnswers,
}

// csv cannot deserialize through #[serde(flatten)], so rows are read flat
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    academic_pressure: f64,
    age: u32,
    study_satisfaction: f64,
    cgpa: f64,
    work_study_hours: f64,
    financial_stress: f64,
    gender: Gender,
    family_history: String,
    dietary_habits: DietaryHabits,
    sleep_duration: SleepDuration,
}

fn parse_yes_no(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// One batch input: a named student whose answers may already have failed to parse
#[derive(Debug)]
pub struct BatchRow {
    pub name: String,
    pub answers: Result<RawAnswers>,
}

impl From<StudentAnswers> for BatchRow {
    fn from(student: StudentAnswers) -> Self {
        BatchRow {
            name: student.name,
            answers: Ok(student.answers),
        }
    }
}

/// Read students from CSV with a header row of field names. `family_history`
/// accepts Yes/No as well as true/false; any other value is kept as a
/// per-row error. Rows that do not decode at all abort the read.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<BatchRow>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let answers = match parse_yes_no(&row.family_history) {
            Some(family_history) => Ok(RawAnswers {
                academic_pressure: row.academic_pressure,
                age: row.age,
                study_satisfaction: row.study_satisfaction,
                cgpa: row.cgpa,
                work_study_hours: row.work_study_hours,
                financial_stress: row.financial_stress,
                gender: row.gender,
                family_history,
                dietary_habits: row.dietary_habits,
                sleep_duration: row.sleep_duration,
            }),
            None => Err(RiskError::InvalidAnswers(vec![format!(
                "row {}: family_history must be Yes or No, got '{}'",
                line + 1,
                row.family_history
            )])),
        };

        rows.push(BatchRow {
            name: row.name,
            answers,
        });
    }

    Ok(rows)
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BatchEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RiskReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BatchSummary {
    pub assessed: usize,
    pub rejected: usize,
    pub low_count: usize,
    pub moderate_count: usize,
    pub high_count: usize,
    pub avg_probability: f64,
    pub high_risk_rate: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BatchResult {
    pub total_students: usize,
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

pub fn assess_batch(pipeline: &RiskPipeline, students: Vec<StudentAnswers>) -> Result<BatchResult> {
    assess_rows(pipeline, students.into_iter().map(BatchRow::from).collect())
}

/// Assess every row. Invalid answers, including rows that failed to parse,
/// are reported on their entry; any other failure aborts the whole batch.
pub fn assess_rows(pipeline: &RiskPipeline, rows: Vec<BatchRow>) -> Result<BatchResult> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut counts = [0usize; 3];
    let mut total_probability = 0.0;

    for BatchRow { name, answers } in rows {
        match answers.and_then(|answers| pipeline.report(&answers)) {
            Ok(report) => {
                total_probability += report.probability;
                counts[match report.band {
                    RiskBand::Low => 0,
                    RiskBand::Moderate => 1,
                    RiskBand::High => 2,
                }] += 1;
                entries.push(BatchEntry {
                    name,
                    report: Some(report),
                    error: None,
                });
            }
            Err(err @ RiskError::InvalidAnswers(_)) => {
                entries.push(BatchEntry {
                    name,
                    report: None,
                    error: Some(err.to_string()),
                });
            }
            Err(err) => return Err(err),
        }
    }

    let total_students = entries.len();
    let assessed: usize = counts.iter().sum();
    let summary = BatchSummary {
        assessed,
        rejected: total_students - assessed,
        low_count: counts[0],
        moderate_count: counts[1],
        high_count: counts[2],
        avg_probability: if assessed > 0 { total_probability / assessed as f64 } else { 0.0 },
        high_risk_rate: if assessed > 0 { counts[2] as f64 / assessed as f64 } else { 0.0 },
    };

    Ok(BatchResult {
        total_students,
        entries,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
name,academic_pressure,age,study_satisfaction,cgpa,work_study_hours,financial_stress,gender,family_history,dietary_habits,sleep_duration
John Doe,3.0,20,3.0,7.5,6.0,3.0,Male,No,Moderate,7-8 hours
Jane Smith, 5.0, 22, 1.0, 5.5, 10.0, 5.0, Female, Yes, Unhealthy, Less than 5 hours
";

    #[test]
    fn test_read_csv_rows() {
        let rows = read_csv(CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "John Doe");
        let john = rows[0].answers.as_ref().unwrap();
        let jane = rows[1].answers.as_ref().unwrap();
        assert!(!john.family_history);
        assert_eq!(jane.gender, Gender::Female);
        assert!(jane.family_history);
        assert_eq!(jane.sleep_duration, SleepDuration::LessThan5);
    }

    #[test]
    fn test_read_csv_keeps_bad_yes_no_as_row_error() {
        let csv = CSV.replace(",No,", ",Maybe,");
        let rows = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        match &rows[0].answers {
            Err(RiskError::InvalidAnswers(msgs)) => assert!(msgs[0].contains("Maybe")),
            other => panic!("expected a row error, got {:?}", other),
        }
        assert!(rows[1].answers.is_ok());
    }

    #[test]
    fn test_read_csv_rejects_unknown_category() {
        let csv = CSV.replace("7-8 hours", "9 hours");
        assert!(matches!(read_csv(csv.as_bytes()), Err(RiskError::Csv(_))));
    }

    #[test]
    fn test_json_student_is_flat() {
        let json = r#"{
            "name": "Mike Johnson",
            "academic_pressure": 2.0, "age": 19, "study_satisfaction": 4.0,
            "cgpa": 8.1, "work_study_hours": 4.0, "financial_stress": 1.0,
            "gender": "Male", "family_history": true,
            "dietary_habits": "Healthy", "sleep_duration": "More than 8 hours"
        }"#;
        let student: StudentAnswers = serde_json::from_str(json).unwrap();
        assert_eq!(student.name, "Mike Johnson");
        assert_eq!(student.answers.cgpa, 8.1);
    }
}
