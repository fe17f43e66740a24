pub mod cors;
pub mod demo;
pub mod error;
pub mod proxy;

use std::result::Result as StdResult;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Extension, State};
use axum::http::{Request, StatusCode};
use axum::{routing::any, Router};
use hyper::Response;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::{json_error, AppError};
use crate::proxy::Client;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listener: String,
    pub proxy_endpoint: String,
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listener: "0.0.0.0:3000".to_string(),
            proxy_endpoint: "/corsproxy/".to_string(),
            // demo upstream used when the request carries no apiurl
            api_url: "https://examples.cloudflareworkers.com/demos/demoapi".to_string(),
        }
    }
}

pub fn app(config: Config) -> Router {
    let client = proxy::client();

    Router::new()
        .route("/", any(handler))
        .route("/*path", any(handler))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(config)))
        .with_state(client)
}

#[tracing::instrument(level = "trace", "proxy", skip_all)]
async fn handler(
    State(client): State<Client>,
    Extension(config): Extension<Arc<Config>>,
    req: Request<Body>,
) -> StdResult<Response<Body>, AppError> {
    if !req.uri().path().starts_with(&config.proxy_endpoint) {
        return Ok(demo::demo_page()?);
    }

    match req.method().as_str() {
        "OPTIONS" => Ok(cors::handle_options(req.headers())?),
        "GET" | "HEAD" | "POST" | "PUT" | "DELETE" | "PATCH" => {
            let uri = match proxy::target_uri(req.uri().query(), &config.api_url) {
                Ok(uri) => uri,
                Err(err) => {
                    tracing::debug!("Rejecting apiurl: {}", err);
                    return Ok(json_error(
                        StatusCode::BAD_REQUEST,
                        json!({
                            "error": "Invalid apiurl",
                            "message": err.to_string(),
                        }),
                    )?);
                }
            };

            // transport failures surface through AppError as the JSON 500
            let mut response = proxy::forward(&client, uri, req).await?;
            cors::overlay(response.headers_mut());
            Ok(response)
        }
        _ => Ok(json_error(
            StatusCode::METHOD_NOT_ALLOWED,
            json!({
                "error": "Method not allowed",
                "allow": cors::ALLOWED_METHODS,
            }),
        )?),
    }
}
