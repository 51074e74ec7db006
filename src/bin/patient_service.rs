use hospital_mgt::{config::ServerConfig, routes, state::PatientState, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    telemetry::init();

    let server = ServerConfig::from_env(5000)?;
    let state = PatientState::from_env().await?;

    routes::serve("patient-service", routes::patient_router(state), &server).await?;
    Ok(())
}
