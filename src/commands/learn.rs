//! Learn command - turn flagged attempts into rules

use sentinel_engine::adapters::gemini::GeminiClient;
use sentinel_engine::adapters::mongo::MongoStore;
use sentinel_engine::config::Settings;
use sentinel_engine::core::services::LearningCycle;
use sentinel_engine::output::{CycleReport, OutputMode};

/// Run one learning cycle, or loop until interrupted
pub fn learn(settings: &Settings, once: bool, mode: OutputMode) -> anyhow::Result<()> {
    let api_key = settings.generator.require_api_key()?;
    let mongo_uri = settings.store.require_mongo_uri()?;

    super::runtime()?.block_on(run(settings, api_key, mongo_uri, once, mode))
}

async fn run(
    settings: &Settings,
    api_key: &str,
    mongo_uri: &str,
    once: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let store = MongoStore::connect(mongo_uri, &settings.store.database).await?;
    let generator = GeminiClient::new(&settings.generator, api_key)?;
    let cycle = LearningCycle::new(&store, &store, &generator, settings.learner.retry_policy());

    if once {
        let result = cycle.run_once().await;
        CycleReport::from(&result).render(mode);
        result?;
        return Ok(());
    }

    let interval = settings.learner.interval();
    log::info!("Learning every {}s, press Ctrl-C to stop", interval.as_secs());
    let cycles = cycle.run_until(interval, shutdown_signal()).await;
    log::info!("Learning loop stopped after {cycles} cycle(s)");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C, learning until killed: {e}");
        std::future::pending::<()>().await;
    }
}
