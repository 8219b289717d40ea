//! HTTP implementation of [`SnippetApi`] over `reqwest::blocking`.

use super::{api_url, parse_server_url, ApiFailure, ApiOutcome, SnippetApi};
use crate::error::ClientError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vaultpaste_core::config::session_cookie_pair;
use vaultpaste_core::models::{CreateSnippetRequest, CreatedSnippet, Snippet, SnippetSummary};
use vaultpaste_core::{Config, SESSION_COOKIE_NAME};

/// Blocking HTTP client for the snippet service.
#[derive(Debug, Clone)]
///
/// Cookies set by the service are kept for the transport's lifetime, so a
/// session from [`HttpTransport::login`] or [`HttpTransport::set_session`]
/// rides along on every later call.
pub struct HttpTransport {
    client: Client,
    base: Url,
    jar: Arc<Jar>,
    log_requests: bool,
}

fn no_store(builder: RequestBuilder) -> RequestBuilder {
    builder
        .header(CACHE_CONTROL, "no-cache, no-store")
        .header(PRAGMA, "no-cache")
}

fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    response
        .json::<T>()
        .map_err(|err| format!("response decode error: {}", err))
}

impl HttpTransport {
    /// Build a transport for `server`.
    ///
    /// # Errors
    /// Returns an error for an unusable server URL or when the HTTP client
    /// cannot be constructed.
    pub fn new(server: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = parse_server_url(server)?;
        // Fail fast on cannot-be-a-base URLs instead of on the first request.
        api_url(&base, &["api"])?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        Ok(Self {
            client,
            base,
            jar,
            log_requests: false,
        })
    }

    /// Build a transport from loaded configuration.
    ///
    /// # Errors
    /// See [`HttpTransport::new`].
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let mut transport = Self::new(&config.server_url, config.request_timeout())?;
        transport.log_requests = config.http_log;
        if let Some(session) = &config.session {
            transport.set_session(session);
        }
        Ok(transport)
    }

    /// Attach an existing signed-in session to every request.
    ///
    /// Accepts `NAME=value` or a bare servlet session id.
    pub fn set_session(&self, session: &str) {
        if let Some(pair) = session_cookie_pair(session) {
            self.jar.add_cookie_str(&format!("{}; Path=/", pair), &self.base);
        }
    }

    /// The session cookie currently held for the service, as `NAME=value`.
    pub fn session_cookie(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let cookies = header.to_str().ok()?;
        cookies
            .split(';')
            .map(str::trim)
            .find(|pair| {
                pair.split_once('=')
                    .is_some_and(|(name, _)| name == SESSION_COOKIE_NAME)
            })
            .map(str::to_string)
    }

    /// Sign in through the service's form login and keep the session.
    ///
    /// The service answers both outcomes with a redirect; a landing URL that
    /// carries an `error` query parameter means the credentials were refused.
    ///
    /// # Returns
    /// The session cookie as `NAME=value` on success.
    pub fn login(&self, username: &str, password: &str) -> ApiOutcome<String> {
        let url = match self.endpoint(&["login"]) {
            Ok(url) => url,
            Err(message) => return ApiOutcome::NetworkError(message),
        };
        let started = Instant::now();
        let form = [("username", username), ("password", password)];
        let response = match self.client.post(url.clone()).form(&form).send() {
            Ok(response) => response,
            Err(err) => {
                warn!(op = "login", url = %url, "request failed: {}", err);
                return ApiOutcome::NetworkError(err.to_string());
            }
        };
        let status = response.status();
        let landed = response.url().clone();
        debug!(
            op = "login",
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "api request"
        );

        if landed.query_pairs().any(|(key, _)| key == "error") {
            warn!(user = %username, "login refused");
            return ApiOutcome::Failed(ApiFailure::redirected(status.as_u16(), landed));
        }
        if !status.is_success() {
            return ApiOutcome::Failed(ApiFailure::status(status.as_u16()));
        }
        match self.session_cookie() {
            Some(cookie) => {
                info!(user = %username, "signed in");
                ApiOutcome::Ok(cookie)
            }
            None => ApiOutcome::NetworkError("login response carried no session cookie".to_string()),
        }
    }

    /// Normalized service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, String> {
        api_url(&self.base, segments).map_err(|err| err.to_string())
    }

    fn execute<T>(
        &self,
        op: &'static str,
        url: Url,
        build: impl FnOnce(&Client, Url) -> RequestBuilder,
        decode: impl FnOnce(Response) -> Result<T, String>,
    ) -> ApiOutcome<T> {
        let started = Instant::now();
        let response = match build(&self.client, url.clone()).send() {
            Ok(response) => response,
            Err(err) => {
                warn!(op, url = %url, "request failed: {}", err);
                return ApiOutcome::NetworkError(err.to_string());
            }
        };
        let status = response.status();
        let final_url = response.url().clone();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if self.log_requests {
            info!(op, status = status.as_u16(), elapsed_ms, "api request");
        } else {
            debug!(op, status = status.as_u16(), elapsed_ms, "api request");
        }

        // A response for a different resource is a redirect, whatever its status.
        if final_url != url {
            warn!(op, status = status.as_u16(), target = %final_url, "request redirected");
            return ApiOutcome::Failed(ApiFailure::redirected(status.as_u16(), final_url));
        }
        if !status.is_success() {
            return ApiOutcome::Failed(ApiFailure::status(status.as_u16()));
        }
        match decode(response) {
            Ok(payload) => ApiOutcome::Ok(payload),
            Err(message) => {
                warn!(op, "{}", message);
                ApiOutcome::NetworkError(message)
            }
        }
    }
}

impl SnippetApi for HttpTransport {
    fn create(&self, request: &CreateSnippetRequest) -> ApiOutcome<CreatedSnippet> {
        let url = match self.endpoint(&["api", "snippets"]) {
            Ok(url) => url,
            Err(message) => return ApiOutcome::NetworkError(message),
        };
        self.execute(
            "create",
            url,
            |client, url| client.post(url).json(request),
            |response| {
                let created: CreatedSnippet = decode_json(response)?;
                if created.id.trim().is_empty() {
                    return Err("response missing 'id' field".to_string());
                }
                Ok(created)
            },
        )
    }

    fn fetch(&self, id: &str) -> ApiOutcome<Snippet> {
        let url = match self.endpoint(&["api", "snippets", id]) {
            Ok(url) => url,
            Err(message) => return ApiOutcome::NetworkError(message),
        };
        self.execute(
            "fetch",
            url,
            |client, url| no_store(client.get(url)),
            decode_json,
        )
    }

    fn history(&self) -> ApiOutcome<Vec<SnippetSummary>> {
        let url = match self.endpoint(&["api", "snippets", "history"]) {
            Ok(url) => url,
            Err(message) => return ApiOutcome::NetworkError(message),
        };
        self.execute(
            "history",
            url,
            |client, url| no_store(client.get(url)),
            decode_json,
        )
    }

    fn delete(&self, id: &str) -> ApiOutcome<()> {
        let url = match self.endpoint(&["api", "snippets", id]) {
            Ok(url) => url,
            Err(message) => return ApiOutcome::NetworkError(message),
        };
        self.execute("delete", url, |client, url| client.delete(url), |_| Ok(()))
    }
}
