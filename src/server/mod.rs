//! HTTP server adapters
//!
//! This module provides adapters that translate between HTTP frameworks
//! and the HTTP-agnostic API layer.
//!
//! Currently supported:
//! - `tiny_http` - Lightweight blocking HTTP server with a small worker pool

pub mod tiny_http;

pub use self::tiny_http::{HttpReply, PREDICT_PATH, dispatch, handle_request, serve};
