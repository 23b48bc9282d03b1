//! Outbound request construction.
//!
//! [`new_request`] builds the GET request every fetch issues and ties it to
//! the caller's [`CancellationToken`], so the exchange can be abandoned
//! promptly when the caller gives up.

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, Method, Request, Response};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::error::FetchError;
use crate::user_agent;

/// A GET request bound to a cancellation token.
#[derive(Debug)]
pub struct ContextRequest {
    request: Request,
    cancel: CancellationToken,
}

/// Builds a GET request for `url` carrying the bot's User-Agent.
///
/// # Panics
///
/// Panics if `url` is not an absolute URL. Callers only ever pass URLs built
/// from the configured base URL or taken from API responses, so a malformed
/// one is a programming error rather than a runtime condition.
#[must_use]
pub fn new_request(url: &str, cancel: &CancellationToken) -> ContextRequest {
    let parsed =
        Url::parse(url).unwrap_or_else(|e| panic!("malformed request URL {url:?}: {e}"));

    let mut request = Request::new(Method::GET, parsed);
    request
        .headers_mut()
        .insert(USER_AGENT, user_agent_header());

    ContextRequest {
        request,
        cancel: cancel.clone(),
    }
}

#[allow(clippy::expect_used)]
fn user_agent_header() -> HeaderValue {
    HeaderValue::from_str(&user_agent::default_user_agent())
        .expect("static User-Agent is a valid header value")
}

impl ContextRequest {
    /// The underlying request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Target URL of the request.
    #[must_use]
    pub fn url(&self) -> &Url {
        self.request.url()
    }

    /// Executes the request on `client`, racing the bound cancellation token.
    ///
    /// Transport errors are turned into a [`FetchError`] by `map_err`, which
    /// lets the caller name the stage that failed.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cancelled`] if the token fires before response
    /// headers arrive, or the result of `map_err` on transport failure.
    pub async fn send<F>(self, client: &Client, map_err: F) -> Result<Response, FetchError>
    where
        F: FnOnce(reqwest::Error) -> FetchError,
    {
        let Self { request, cancel } = self;
        debug!(url = %request.url(), "sending request");
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled),
            result = client.execute(request) => result.map_err(map_err),
        }
    }
}
