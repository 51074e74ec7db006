use hospital_mgt::{config::ServerConfig, routes, state::NurseState, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    telemetry::init();

    let server = ServerConfig::from_env(4000)?;
    let state = NurseState::from_env().await?;

    routes::serve("nurse-service", routes::nurse_router(state), &server).await?;
    Ok(())
}
