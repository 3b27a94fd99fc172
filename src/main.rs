use longtable::{config::Config, error::AppError, startup, state::AppState};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let config = Config::from_env()?;
    let store = startup::connect_to_store(&config).await?;
    let state = AppState::new(store);

    if config.prune_on_startup {
        startup::prune_listings(&state.store).await?;
    }

    tracing::info!("Persistence core ready");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("Shutting down");
    state.close();

    Ok(())
}
