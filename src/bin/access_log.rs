use hospital_mgt::{config::AmqpConfig, events, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    telemetry::init();

    let cfg = AmqpConfig::from_env()?;
    tracing::info!(idle_tick = ?cfg.idle_tick, "access log consumer starting");

    tokio::select! {
        _ = events::run_access_log(cfg) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
