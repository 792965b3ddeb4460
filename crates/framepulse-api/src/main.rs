mod api_doc;
mod error;
mod handlers;
mod setup;
mod state;
mod telemetry;

use framepulse_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    telemetry::init_tracing(&config);

    // Initialize the application (database, storage, pipeline, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
