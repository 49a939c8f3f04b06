//! Serve command - host the /predict endpoint

use anyhow::Context;
use tiny_http::Server;

use sentinel_engine::config::ServerSettings;
use sentinel_engine::inference::ModelContext;
use sentinel_engine::server;

/// Load the model and serve until the process is stopped
pub fn serve(settings: &ServerSettings) -> anyhow::Result<()> {
    let context = ModelContext::load(&settings.model_dir).with_context(|| {
        format!(
            "Failed to load model artifacts from {}",
            settings.model_dir.display()
        )
    })?;

    let address = settings.address();
    let listener = Server::http(&address)
        .map_err(|e| anyhow::anyhow!("Failed to bind {address}: {e}"))?;

    log::info!(
        "Serving {} on http://{address} with {} worker(s)",
        server::PREDICT_PATH,
        settings.workers.max(1)
    );
    server::serve(&listener, &context, settings.workers);

    Ok(())
}
