use anyhow::{anyhow, Result};
use axum::http::header;
use hyper::client::HttpConnector;
use hyper::http::HeaderValue;
use hyper::{Body, Method, Request, Response, Uri};
use hyper_rustls::HttpsConnector;

pub type Client = hyper::client::Client<HttpsConnector<HttpConnector>, Body>;

pub fn client() -> Client {
    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .https_or_http()
        .enable_http1()
        .build();

    hyper::client::Client::builder().build(https)
}

/// Resolve the upstream target from the request query string. `apiurl` is
/// percent-decoded; when absent the configured fallback is used. The target
/// must be an absolute URL.
pub fn target_uri(query: Option<&str>, fallback: &str) -> Result<Uri> {
    let apiurl = query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(key, _)| key.as_ref() == "apiurl")
            .map(|(_, value)| value.into_owned())
    });

    let target = apiurl.unwrap_or_else(|| fallback.to_string());

    let uri = Uri::try_from(&target)
        .map_err(|e| anyhow!("Failed to parse apiurl {}: {}", target, e))?;

    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(anyhow!("apiurl is not an absolute URL: {}", target));
    }

    Ok(uri)
}

/// Forward `req` to `uri` and hand back the upstream response untouched.
/// Headers are copied over except `Host`, which the client derives from the
/// target. `Origin` is rewritten to the target's own origin. GET and HEAD
/// requests are forwarded without a body.
pub async fn forward(client: &Client, uri: Uri, req: Request<Body>) -> Result<Response<Body>> {
    let (parts, body) = req.into_parts();

    let drop_body = parts.method == Method::GET || parts.method == Method::HEAD;
    let body = if drop_body { Body::empty() } else { body };

    let origin = origin_of(&uri)?;

    let mut new_req = Request::builder()
        .method(parts.method)
        .uri(&uri)
        .body(body)?;

    let headers = new_req.headers_mut();
    for (name, value) in parts.headers.iter() {
        if *name == header::HOST {
            continue;
        }
        // the body was dropped, so its framing headers must not leak upstream
        if drop_body && (*name == header::CONTENT_LENGTH || *name == header::TRANSFER_ENCODING) {
            continue;
        }
        headers.append(name, value.clone());
    }
    headers.insert(header::ORIGIN, origin);

    let response = client.request(new_req).await?;

    tracing::debug!("Proxy --> {} with {} response", &uri, response.status());

    Ok(response)
}

fn origin_of(uri: &Uri) -> Result<HeaderValue> {
    let scheme = uri
        .scheme_str()
        .ok_or_else(|| anyhow!("Missing scheme: {}", uri))?;
    let authority = uri
        .authority()
        .ok_or_else(|| anyhow!("Missing authority: {}", uri))?;

    Ok(HeaderValue::from_str(&format!("{}://{}", scheme, authority))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "https://examples.cloudflareworkers.com/demos/demoapi";

    #[test]
    fn target_uri_decodes_apiurl() {
        let uri = target_uri(
            Some("apiurl=https%3A%2F%2Fexample.com%2Fdata%3Fid%3D1"),
            FALLBACK,
        )
        .unwrap();
        assert_eq!(uri.to_string(), "https://example.com/data?id=1");
    }

    #[test]
    fn target_uri_falls_back_when_apiurl_missing() {
        let uri = target_uri(None, FALLBACK).unwrap();
        assert_eq!(uri.to_string(), FALLBACK);

        let uri = target_uri(Some("other=1"), FALLBACK).unwrap();
        assert_eq!(uri.to_string(), FALLBACK);
    }

    #[test]
    fn target_uri_rejects_relative_urls() {
        assert!(target_uri(Some("apiurl=not-a-url"), FALLBACK).is_err());
        assert!(target_uri(Some("apiurl=%2Fjust%2Fa%2Fpath"), FALLBACK).is_err());
    }

    #[test]
    fn origin_of_strips_path_and_query() {
        let uri = Uri::try_from("https://example.com:8443/deep/path?x=1").unwrap();
        assert_eq!(origin_of(&uri).unwrap(), "https://example.com:8443");
    }
}
