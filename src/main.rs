use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use std::error::Error;
use std::path::PathBuf;

use student_risk::api;
use student_risk::{AppConfig, RiskPipeline};

async fn start_api(pipeline: RiskPipeline, host: String, port: u16) -> std::io::Result<()> {
    let pipeline_data = web::Data::new(pipeline);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(pipeline_data.clone())
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path.as_deref())?;
    info!("Variant {:?}, thresholds {:?}", config.assessment.variant, config.assessment.thresholds());

    // Artifacts load before the server binds; any failure stops the process here
    let pipeline = RiskPipeline::from_config(&config)?;

    info!(
        "Starting Student Risk Assessment API on http://{}:{}",
        config.server.host, config.server.port
    );
    start_api(pipeline, config.server.host.clone(), config.server.port).await?;

    Ok(())
}
