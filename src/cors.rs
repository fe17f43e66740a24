use anyhow::Result;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use hyper::{Body, Response};

// One flat list shared by Access-Control-Allow-Methods and the plain
// OPTIONS Allow response.
pub const ALLOWED_METHODS: &str = "GET,HEAD,POST,OPTIONS,PUT,DELETE,PATCH";

const MAX_AGE: &str = "86400";

/// Overlay the fixed CORS header set onto `headers`. Same-named upstream
/// headers are replaced, never appended to.
pub fn overlay(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE),
    );
}

/// Answer an OPTIONS request under the proxy endpoint. A request carrying
/// both `Origin` and `Access-Control-Request-Method` is a browser preflight;
/// anything else is treated as a generic OPTIONS probe.
pub fn handle_options(headers: &HeaderMap) -> Result<Response<Body>> {
    let is_preflight = headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    let response = if is_preflight {
        let allow_headers = headers
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"));

        Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            )
            .header(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            )
            .header(header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers)
            .header(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE))
            .body(Body::empty())?
    } else {
        Response::builder()
            .header(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS))
            .body(Body::empty())?
    };

    Ok(response)
}
