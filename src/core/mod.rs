//! Core domain logic for sentinel-engine
//!
//! This module contains business logic with no direct I/O dependencies.
//! All external interactions are abstracted through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (`VerificationAttempt`, `Rule`)
//! - `services/` - Business logic orchestration (learning cycle)
//! - `ports/` - Trait definitions for external dependencies

pub mod models;
pub mod ports;
pub mod services;
