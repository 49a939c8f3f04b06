//! `tiny_http` server adapter
//!
//! Handles routing, body parsing, and response conversion for `tiny_http`.

use std::io::{Cursor, Read};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::api::{self, ApiError, ApiErrorData, PredictRequest};
use crate::core::ports::TextClassifier;

/// Path of the prediction endpoint
pub const PREDICT_PATH: &str = "/predict";

/// Framework-neutral reply: status code plus JSON body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code
    pub status: u16,
    /// Serialized JSON body
    pub body: String,
}

// =============================================================================
// SERVING
// =============================================================================

/// Serve requests on `workers` threads until the listener closes
///
/// Every worker pulls from the same listener and shares `classifier`.
pub fn serve(server: &Server, classifier: &dyn TextClassifier, workers: usize) {
    std::thread::scope(|scope| {
        for worker in 0..workers.max(1) {
            scope.spawn(move || {
                for mut request in server.incoming_requests() {
                    let response = handle_request(&mut request, classifier);
                    if let Err(e) = request.respond(response) {
                        log::warn!("Failed to send response: {e}");
                    }
                }
                log::debug!("Worker {worker} stopped");
            });
        }
    });
}

/// Handle one `tiny_http` request
pub fn handle_request(
    request: &mut Request,
    classifier: &dyn TextClassifier,
) -> Response<Cursor<Vec<u8>>> {
    let method = request.method().clone();
    let url = request.url().to_string();
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let reply = dispatch(
        classifier,
        &method,
        &url,
        content_type.as_deref(),
        request.as_reader(),
    );
    log::debug!("{method} {url} -> {}", reply.status);
    into_response(reply)
}

// =============================================================================
// ROUTING
// =============================================================================

/// Route a request to its handler
///
/// This is the main routing function that maps URL paths to handlers.
pub fn dispatch(
    classifier: &dyn TextClassifier,
    method: &Method,
    url: &str,
    content_type: Option<&str>,
    body: &mut dyn Read,
) -> HttpReply {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Post, PREDICT_PATH) => {
            if !is_json(content_type) {
                return error_reply(&ApiError::bad_request("Request must be JSON"));
            }
            match read_json_body::<PredictRequest>(body) {
                Ok(req) => handle_result(api::predict(classifier, &req)),
                Err(e) => error_reply(&e),
            }
        },
        (_, PREDICT_PATH) => error_reply(&ApiError::method_not_allowed(format!(
            "Method {method} not allowed for {PREDICT_PATH}"
        ))),
        _ => error_reply(&ApiError::not_found(format!(
            "Endpoint not found: {method} {path}"
        ))),
    }
}

// =============================================================================
// BODY PARSING
// =============================================================================

/// Whether a `Content-Type` value denotes JSON
fn is_json(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Read and parse a JSON object body
fn read_json_body<T: DeserializeOwned>(body: &mut dyn Read) -> Result<T, ApiError> {
    let mut raw = String::new();
    body.read_to_string(&mut raw)
        .map_err(|e| ApiError::bad_request(format!("Failed to read request body: {e}")))?;

    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}

// =============================================================================
// RESPONSE CONVERSION
// =============================================================================

/// Convert a handler result to a reply
fn handle_result<T: Serialize>(result: Result<T, ApiError>) -> HttpReply {
    match result {
        Ok(data) => json_reply(&data, 200),
        Err(e) => error_reply(&e),
    }
}

/// Create an error reply with the error's status code
fn error_reply(error: &ApiError) -> HttpReply {
    json_reply(&ApiErrorData::from(error), error.status_code())
}

/// Serialize data to a JSON reply
fn json_reply<T: Serialize>(data: &T, status: u16) -> HttpReply {
    let body = serde_json::to_string(data)
        .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, api::INTERNAL_ERROR_MESSAGE));
    HttpReply { status, body }
}

/// Convert a reply into a `tiny_http` response
fn into_response(reply: HttpReply) -> Response<Cursor<Vec<u8>>> {
    let mut response =
        Response::from_data(reply.body.into_bytes()).with_status_code(StatusCode(reply.status));
    match Header::from_bytes("Content-Type", "application/json") {
        Ok(header) => response.add_header(header),
        Err(()) => log::warn!("Could not build Content-Type header"),
    }
    response
}
