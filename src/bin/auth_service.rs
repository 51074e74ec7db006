use hospital_mgt::{config::ServerConfig, routes, state::AuthState, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    telemetry::init();

    let server = ServerConfig::from_env(3000)?;
    let state = AuthState::from_env().await?;

    routes::serve("auth-service", routes::auth_router(state), &server).await?;
    Ok(())
}
