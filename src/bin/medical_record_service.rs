use hospital_mgt::{config::ServerConfig, routes, state::RecordState, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    telemetry::init();

    let server = ServerConfig::from_env(6000)?;
    let state = RecordState::from_env().await?;

    routes::serve("medical-record-service", routes::record_router(state), &server).await?;
    Ok(())
}
