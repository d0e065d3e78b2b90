//! REST client for the CRM API.
//!
//! One file per resource, mirroring the server's route groups. All calls return
//! [`CrmResult`]; nothing here touches local state.

mod auth;
mod dashboard;
mod leads;
mod profile;
mod teams;

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::auth::bearer_header;
use crate::errors::{CrmError, CrmResult, ServerErrorBody};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client bound to one API base URL and, optionally, a bearer token.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: &str, timeout: Duration) -> CrmResult<Self> {
        let base_url = if base_url.starts_with("http") {
            base_url.to_string()
        } else {
            format!("http://{}", base_url)
        };
        let base_url = Url::parse(&base_url)
            .map_err(|e| CrmError::Validation(format!("Invalid API URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CrmError::Validation(format!("Invalid API URL {}", base_url)));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrmError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `{base}/api/{segments...}`. Each segment is percent-encoded on its own, so opaque
    /// ids never add path components, queries or fragments.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4().to_string();
        let url = self.url(segments);
        tracing::debug!(%request_id, %method, %url, "Sending request");

        self.client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id)
    }

    /// Request that does not need a credential. The token is still sent when present.
    fn public(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.request(method, segments);
        match bearer_header(self.token()) {
            Ok(value) => builder.header(AUTHORIZATION, value),
            Err(_) => builder,
        }
    }

    /// Request that requires a credential; fails locally when signed out.
    fn authorized(&self, method: Method, segments: &[&str]) -> CrmResult<RequestBuilder> {
        let value = bearer_header(self.token())?;
        Ok(self.request(method, segments).header(AUTHORIZATION, value))
    }
}

/// Turn a failure status into an error, using the server's `message` when it sent one.
async fn check_status(response: Response) -> CrmResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<ServerErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message);
    Err(CrmError::from_status(status, message))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> CrmResult<T> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> CrmResult<T> {
    read_json(request.send().await?).await
}

async fn send_empty(request: RequestBuilder) -> CrmResult<()> {
    check_status(request.send().await?).await?;
    Ok(())
}
