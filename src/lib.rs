//! sentinel-engine - message classification endpoint and rule-learning worker
//!
//! This library provides the two halves of the sentinel verification backend:
//! an inference context that scores free text with a pre-trained classifier,
//! and a learning cycle that turns flagged verification attempts into new
//! moderation rules through a generative-language service.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod inference;
pub mod output;
#[cfg(feature = "server")]
pub mod server;
