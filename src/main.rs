use house_scout::scrapers::HttpFetcher;
use house_scout::{Config, SyncController, SyncStatus};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 House Scout - casa.sapo.pt");

    let config = Config::from_env()?;
    let fetcher = HttpFetcher::new(config.request_timeout)?;

    let mut controller = SyncController::new(&config, fetcher)?;
    let result = controller.run_cycle(&config.criteria).await?;

    if let SyncStatus::FetchFailed { status } = result.status {
        warn!("Search page unavailable (status {}), store left unchanged", status);
        anyhow::bail!("Failed to query casa.sapo: {}", status);
    }

    for listing in &result.discovered {
        println!("NEW!");
        println!("{}\n", listing);
    }

    println!(
        "({:?}, {}, {})",
        result.status,
        result.new_entries_count,
        result
            .last_entry_date
            .map(|d| d.to_string())
            .unwrap_or_default()
    );
    println!("total listings: {}", controller.store().len());

    Ok(())
}
