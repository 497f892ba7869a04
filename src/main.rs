use std::sync::Arc;

use anyhow::{Context, Result};
use halfway::api::AppState;
use halfway::cache::ResponseCache;
use halfway::{CachedGateway, GoogleMapsClient, HalfwayConfig, MeetingPlanner, PlacesGateway, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = HalfwayConfig::load()?;
    logging::init(&config.logging)?;

    let client = GoogleMapsClient::new(&config.maps)?;
    let urls = client.urls();

    let gateway: Arc<dyn PlacesGateway> = if config.cache.enabled {
        let cache = ResponseCache::open(&config.cache.location)
            .with_context(|| format!("Failed to open cache at {}", config.cache.location))?;
        tracing::info!("Caching provider responses in {}", config.cache.location);
        Arc::new(CachedGateway::new(client, cache, config.cache.ttl()))
    } else {
        Arc::new(client)
    };

    let planner = MeetingPlanner::new(gateway, config.search.clone(), config.fairness);
    let state = AppState {
        planner: Arc::new(planner),
        urls,
    };

    web::run(&config.server.host, config.server.port, state).await
}
