//! Export command - dump every stored attempt as JSON lines

use std::io::{self, Write};

use sentinel_engine::adapters::mongo::MongoStore;
use sentinel_engine::config::StoreSettings;
use sentinel_engine::core::models::AttemptRecord;
use sentinel_engine::core::ports::AttemptStore;

/// Write one JSON object per attempt to stdout
pub fn export_attempts(settings: &StoreSettings) -> anyhow::Result<()> {
    let mongo_uri = settings.require_mongo_uri()?;

    let attempts = super::runtime()?.block_on(async {
        let store = MongoStore::connect(mongo_uri, &settings.database).await?;
        store.all_attempts().await
    })?;

    let mut out = io::stdout().lock();
    for attempt in &attempts {
        serde_json::to_writer(&mut out, &AttemptRecord::from(attempt))?;
        writeln!(out)?;
    }
    out.flush()?;

    log::info!("Exported {} attempt(s)", attempts.len());
    Ok(())
}
