use fastreel_api::setup;
use fastreel_core::Config;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;
    let shutdown = CancellationToken::new();

    // Initialize the application (database, storage, pipeline, routes)
    let (state, router) = setup::initialize_app(config, shutdown.clone()).await?;

    // Start the server
    setup::server::start_server(&state.config, router, shutdown).await?;

    Ok(())
}
