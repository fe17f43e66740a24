use anyhow::Result;
use axum::http::header;
use hyper::{Body, Response};

pub const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>CORS proxy demo</title>
</head>
<body>
  <h1>CORS proxy</h1>
  <p>
    Requests under <code>/corsproxy/</code> are forwarded to the URL given in
    the <code>apiurl</code> query parameter and returned with permissive CORS
    headers, so browser pages on any origin can read the response.
  </p>
  <p>Example:</p>
  <pre>GET /corsproxy/?apiurl=https://httpbin.org/json</pre>
  <p id="result">Waiting for fetch...</p>
  <script>
    const url = "/corsproxy/?apiurl=" + encodeURIComponent("https://httpbin.org/json");
    fetch(url)
      .then((response) => response.text())
      .then((body) => {
        document.getElementById("result").textContent = body;
      })
      .catch((err) => {
        document.getElementById("result").textContent = "Fetch failed: " + err;
      });
  </script>
</body>
</html>
"#;

pub fn demo_page() -> Result<Response<Body>> {
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/html;charset=UTF-8")
        .body(Body::from(DEMO_PAGE))?;

    Ok(response)
}
