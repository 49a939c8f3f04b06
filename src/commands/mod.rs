//! Command implementations

mod classify;
mod export;
mod learn;
mod serve;

pub use classify::classify;
pub use export::export_attempts;
pub use learn::learn;
pub use serve::serve;

/// Single-threaded runtime for the async commands
fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    use anyhow::Context;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}
