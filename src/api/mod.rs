//! HTTP helpers for the logistics JSON API. Feature clients go through
//! [`ApiClient`] so request setup, bearer handling and error decoding stay in
//! one place. The client never stores tokens; callers pass the bearer per
//! request and must avoid logging it.

mod errors;

pub use errors::ApiError;

use crate::APP_USER_AGENT;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Backend origin used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// JSON error payload returned by the backend on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, alias = "requiresToken")]
    requires_token: bool,
}

/// Thin wrapper over `reqwest::Client` bound to one backend origin.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Builds a client for `base_url`. `timeout` of `None` means requests may
    /// wait indefinitely.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;

        let mut builder = Client::builder().user_agent(APP_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        build_url_with_base(self.base_url.as_str(), path)
    }

    /// GETs JSON, optionally with a bearer token. The path stays out of the
    /// span since verification links carry a token in it.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure, non-2xx status or bad JSON.
    #[instrument(skip_all)]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = with_bearer(self.http.get(self.url(path)), bearer);
        let response = send(request).await?;
        handle_json_response(response).await
    }

    /// POSTs a JSON body and parses a JSON response.
    ///
    /// # Errors
    /// Returns an `ApiError` on encoding, transport, status or decoding failure.
    #[instrument(skip(self, body, bearer))]
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = with_json_body(self.http.post(self.url(path)), body)?;
        let response = send(with_bearer(request, bearer)).await?;
        handle_json_response(response).await
    }

    /// POSTs a JSON body and ignores the response body.
    ///
    /// # Errors
    /// Returns an `ApiError` on encoding, transport or status failure.
    #[instrument(skip(self, body, bearer))]
    pub async fn post_json_empty<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<(), ApiError> {
        let request = with_json_body(self.http.post(self.url(path)), body)?;
        let response = send(with_bearer(request, bearer)).await?;
        handle_empty_response(response).await
    }

    /// PUTs a JSON body and parses a JSON response.
    ///
    /// # Errors
    /// Returns an `ApiError` on encoding, transport, status or decoding failure.
    #[instrument(skip(self, body, bearer))]
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = with_json_body(self.http.put(self.url(path)), body)?;
        let response = send(with_bearer(request, bearer)).await?;
        handle_json_response(response).await
    }

    /// PUTs without a body, used by action endpoints such as approve/reject.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport, status or decoding failure.
    #[instrument(skip(self, bearer))]
    pub async fn put_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = self
            .http
            .put(self.url(path))
            .header(CONTENT_TYPE, "application/json");
        let response = send(with_bearer(request, bearer)).await?;
        handle_json_response(response).await
    }

    /// DELETEs a resource and ignores the response body.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport or status failure.
    #[instrument(skip(self, bearer))]
    pub async fn delete(&self, path: &str, bearer: Option<&str>) -> Result<(), ApiError> {
        let request = with_bearer(self.http.delete(self.url(path)), bearer);
        let response = send(request).await?;
        handle_empty_response(response).await
    }
}

/// Builds an absolute API path from its segments, percent-encoding each one so
/// `/`, `?` and `#` in caller input cannot change the endpoint.
///
/// # Errors
/// Returns `ApiError::Config` for blank, `.` or `..` segments.
pub fn encode_path(segments: &[&str]) -> Result<String, ApiError> {
    let mut path = String::new();
    for segment in segments {
        if matches!(segment.trim(), "" | "." | "..") {
            return Err(ApiError::Config(format!(
                "{segment:?} is not a valid path segment."
            )));
        }
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
    }
    Ok(path)
}

fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Config("API base URL is not configured.".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|err| ApiError::Config(format!("Invalid API base URL {trimmed}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ApiError::Config(format!(
            "Unsupported API URL scheme: {scheme}"
        ))),
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn with_bearer(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn with_json_body<B: Serialize>(
    request: RequestBuilder,
    body: &B,
) -> Result<RequestBuilder, ApiError> {
    let payload = serde_json::to_vec(body)
        .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))?;
    Ok(request
        .header(CONTENT_TYPE, "application/json")
        .body(payload))
}

/// Maps transport errors into `ApiError` variants with timeout detection.
fn map_request_error(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Config(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(|err| map_request_error(&err))?;
    debug!(status = response.status().as_u16(), "response received");
    Ok(response)
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

/// Handles empty responses and returns sanitized HTTP errors when needed.
async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    decode_error_body(status, &body)
}

fn decode_error_body(status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .or(parsed.message)
        .map(|message| sanitize_body(&message))
        .unwrap_or_else(|| sanitize_body(body));

    ApiError::Http {
        status,
        message,
        requires_token: parsed.requires_token,
    }
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
