//! Response builders shared by the API and static routes

use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE,
};
use hyper::http::response::Builder;
use hyper::{Body, Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::data::ErrorBody;

/// Finishes a builder, degrading to a bare 500 if a header was invalid
fn finish(builder: Builder, body: Body) -> Response<Body> {
    builder.body(body).unwrap_or_else(|e| {
        error!(error = %e, "failed to build response");
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

/// Serializes `body` as a JSON response
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => finish(
            Response::builder()
                .status(status)
                .header(CONTENT_TYPE, "application/json"),
            Body::from(bytes),
        ),
        Err(e) => {
            error!(error = %e, "failed to serialize response body");
            finish(
                Response::builder().status(StatusCode::INTERNAL_SERVER_ERROR),
                Body::empty(),
            )
        }
    }
}

/// JSON `{"error": message}` response
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response<Body> {
    json(status, &ErrorBody::new(message))
}

/// Raw bytes with an explicit content type
pub fn bytes(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response<Body> {
    finish(
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, content_type),
        Body::from(body),
    )
}

pub fn not_found() -> Response<Body> {
    finish(
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8"),
        Body::from("Not Found"),
    )
}

/// Answer to a CORS preflight request
pub fn preflight() -> Response<Body> {
    finish(
        Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS")
            .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
            .header(ACCESS_CONTROL_MAX_AGE, "86400"),
        Body::empty(),
    )
}

/// Allows every origin to read the response
pub fn with_cors(mut response: Response<Body>) -> Response<Body> {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
