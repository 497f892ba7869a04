//! Request logging for the maps HTTP client

use std::time::Instant;

use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Error, Middleware, Next, Result};
use tracing::{debug, warn};

/// Logs each HTTP exchange with the provider. Only the path is recorded:
/// the query string carries the API key.
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let path = req.url().path().to_string();
        let start = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(response) => debug!(
                %method,
                %path,
                status = response.status().as_u16(),
                elapsed,
                "Maps HTTP exchange"
            ),
            Err(err) => warn!(
                %method,
                %path,
                elapsed,
                kind = failure_kind(err),
                "Maps HTTP request failed"
            ),
        }
        result
    }
}

fn failure_kind(err: &Error) -> &'static str {
    match err {
        Error::Reqwest(err) if err.is_timeout() => "timeout",
        Error::Reqwest(err) if err.is_connect() => "connect",
        Error::Reqwest(_) => "transport",
        Error::Middleware(_) => "middleware",
    }
}
