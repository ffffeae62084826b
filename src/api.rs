//! HTTP front end: the form and JSON endpoints around the pipeline

use actix_web::{web, HttpResponse};
use log::{error, warn};
use serde::Serialize;

use crate::batch::{self, StudentAnswers};
use crate::data::{DietaryHabits, Gender, GpaScale, RawAnswers, SleepDuration, FINANCIAL_STRESS_LEVELS};
use crate::error::RiskError;
use crate::pipeline::RiskPipeline;

pub const GENERIC_FAILURE: &str = "unable to compute risk profile";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct FormOptions {
    genders: Vec<&'static str>,
    dietary_habits: Vec<&'static str>,
    sleep_durations: Vec<&'static str>,
    financial_stress_levels: Vec<f64>,
    gpa_scale: GpaScale,
    gpa_max: f64,
}

/// Caller mistakes come back as 400 with details; anything else is logged
/// and reported as a generic failure
fn error_response(err: RiskError) -> HttpResponse {
    if err.is_client_error() {
        warn!("Rejected request: {}", err);
        HttpResponse::BadRequest().json(ErrorBody { error: err.to_string() })
    } else {
        error!("Assessment failed: {}", err);
        HttpResponse::InternalServerError().json(ErrorBody {
            error: GENERIC_FAILURE.to_string(),
        })
    }
}

async fn assess(req: web::Json<RawAnswers>, pipeline: web::Data<RiskPipeline>) -> HttpResponse {
    match pipeline.report(&req.into_inner()) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_response(err),
    }
}

async fn batch_assess(
    web::Json(students): web::Json<Vec<StudentAnswers>>,
    pipeline: web::Data<RiskPipeline>,
) -> HttpResponse {
    match batch::assess_batch(&pipeline, students) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => error_response(err),
    }
}

async fn batch_assess_csv(body: String, pipeline: web::Data<RiskPipeline>) -> HttpResponse {
    let result = batch::read_csv(body.as_bytes())
        .and_then(|rows| batch::assess_rows(&pipeline, rows));
    match result {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => error_response(err),
    }
}

async fn get_model_info(pipeline: web::Data<RiskPipeline>) -> HttpResponse {
    HttpResponse::Ok().json(pipeline.info())
}

async fn get_schema(pipeline: web::Data<RiskPipeline>) -> HttpResponse {
    HttpResponse::Ok().json(pipeline.schema().names())
}

async fn get_options(pipeline: web::Data<RiskPipeline>) -> HttpResponse {
    let scale = pipeline.gpa_scale();
    HttpResponse::Ok().json(FormOptions {
        genders: Gender::ALL.iter().map(|g| g.as_str()).collect(),
        dietary_habits: DietaryHabits::ALL.iter().map(|d| d.as_str()).collect(),
        sleep_durations: SleepDuration::ALL.iter().map(|s| s.as_str()).collect(),
        financial_stress_levels: FINANCIAL_STRESS_LEVELS.to_vec(),
        gpa_scale: scale,
        gpa_max: scale.max(),
    })
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("Student Risk Assessment API is running!")
}

async fn serve_homepage() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html").body(HOMEPAGE)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(serve_homepage))
        .route("/assess", web::post().to(assess))
        .route("/batch-assess", web::post().to(batch_assess))
        .route("/batch-assess/csv", web::post().to(batch_assess_csv))
        .route("/model/info", web::get().to(get_model_info))
        .route("/schema", web::get().to(get_schema))
        .route("/options", web::get().to(get_options))
        .route("/health", web::get().to(health_check));
}

const HOMEPAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Student Depression Risk Assessment</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        .container { background: #f5f5f5; padding: 25px; border-radius: 10px; }
        .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 10px 25px; }
        label { display: block; margin-bottom: 5px; font-weight: bold; }
        input, select { width: 100%; padding: 8px; border: 1px solid #ddd; border-radius: 4px; }
        button { background: #007bff; color: white; padding: 12px 24px; border: none; border-radius: 4px; cursor: pointer; margin-top: 15px; }
        .result { margin-top: 20px; padding: 20px; border-radius: 5px; display: none; }
        .green { background: #d4edda; color: #155724; }
        .amber { background: #fff3cd; color: #856404; }
        .red { background: #f8d7da; color: #721c24; }
        progress { width: 100%; }
    </style>
</head>
<body>
<div class="container">
    <h1>Student Depression Risk Assessment</h1>
    <form id="form" class="grid">
        <div><label>Academic Pressure (1-5)</label><input name="academic_pressure" type="number" min="1" max="5" step="0.5" value="3"></div>
        <div><label>Work/Study Hours per Day</label><input name="work_study_hours" type="number" min="0" max="16" step="0.5" value="6"></div>
        <div><label>Age</label><input name="age" type="number" min="18" max="35" value="20"></div>
        <div><label>Financial Stress Level</label><select name="financial_stress"></select></div>
        <div><label>Study Satisfaction (1-5)</label><input name="study_satisfaction" type="number" min="1" max="5" step="0.5" value="3"></div>
        <div><label>Gender</label><select name="gender"></select></div>
        <div><label id="cgpa-label">CGPA</label><input name="cgpa" type="number" min="0" step="0.01" value="7.5"></div>
        <div><label>Dietary Habits</label><select name="dietary_habits"></select></div>
        <div><label>Family History of Mental Illness</label><select name="family_history"><option value="true">Yes</option><option value="false" selected>No</option></select></div>
        <div><label>Sleep Duration</label><select name="sleep_duration"></select></div>
    </form>
    <button onclick="analyze()">Analyze Risk Profile</button>
    <div id="result" class="result"></div>
</div>
<script>
    function fill(name, values) {
        document.querySelector(`[name=${name}]`).innerHTML = values.map(v => `<option>${v}</option>`).join('');
    }
    fetch('/options').then(r => r.json()).then(o => {
        fill('gender', o.genders);
        fill('dietary_habits', o.dietary_habits);
        fill('sleep_duration', o.sleep_durations);
        fill('financial_stress', o.financial_stress_levels.map(v => v.toFixed(1)));
        document.getElementById('cgpa-label').innerText = `CGPA (0-${o.gpa_max})`;
        document.querySelector('[name=cgpa]').max = o.gpa_max;
    });
    async function analyze() {
        const f = new FormData(document.getElementById('form'));
        const body = Object.fromEntries(f.entries());
        for (const k of ['academic_pressure', 'study_satisfaction', 'cgpa', 'work_study_hours', 'financial_stress']) body[k] = parseFloat(body[k]);
        body.age = parseInt(body.age);
        body.family_history = body.family_history === 'true';
        const div = document.getElementById('result');
        div.style.display = 'block';
        const response = await fetch('/assess', { method: 'POST', headers: {'Content-Type': 'application/json'}, body: JSON.stringify(body) });
        const data = await response.json();
        if (!response.ok) { div.className = 'result red'; div.innerText = data.error; return; }
        div.className = 'result ' + data.colour;
        div.innerHTML = `<h3>${data.headline}</h3>
            <p>Confidence score: <strong>${(data.confidence * 100).toFixed(2)}%</strong> (${data.confidence_label})</p>
            <p>${data.narrative}</p>
            <progress value="${data.probability}" max="1"></progress>
            <p><small>${data.spectrum}</small></p>`;
    }
</script>
</body>
</html>
"#;
