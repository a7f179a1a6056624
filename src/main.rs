use metrics_seed::config::AppConfig;
use metrics_seed::seed;
use metrics_seed::store::PostgresStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    metrics_seed::init_logging()?;

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: environment={}, database={}",
        config.environment,
        config.database.describe()
    );

    let store = PostgresStore::connect(&config.database).await?;
    log::info!("Connected to PostgreSQL");

    let report = seed::load_seed_data(&store).await?;
    log::info!(
        "Seed data loaded: {} metadata, {} duplication view(s)",
        report.metadata_inserted,
        report.duplication_inserted
    );

    store.close().await;

    Ok(())
}
