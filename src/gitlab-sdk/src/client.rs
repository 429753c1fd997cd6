use std::time::Duration;

use gitlab_api::ApiError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::{RetryPolicy, SdkError};

/// Header GitLab reads personal and impersonation access tokens from
pub const TOKEN_HEADER: &str = "private-token";

/// Tuning knobs for [`GitLabClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Items requested per page on every paged listing
    pub page_size: u32,
    /// Deadline for a single request, including reading the body
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// HTTP client for the GitLab REST v4 API
///
/// One instance holds one connection pool and is shared by reference for the
/// whole run.
pub struct GitLabClient {
    base_url: String,
    page_size: u32,
    retry: RetryPolicy,
    http: reqwest::Client,
}

impl GitLabClient {
    /// Create a client for the instance at `instance_url` (e.g.
    /// `https://gitlab.example.com`), authenticating with `token`
    pub fn new(instance_url: &str, token: &str, options: ClientOptions) -> Result<Self, SdkError> {
        let mut token = HeaderValue::from_str(token)?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(TOKEN_HEADER), token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self {
            base_url: format!("{}/api/v4", instance_url.trim_end_matches('/')),
            page_size: options.page_size,
            retry: options.retry,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch one page of a listing and deserialize its items
    pub(crate) async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
    ) -> Result<Vec<T>, SdkError> {
        let url = format!("{}{path}", self.base_url);
        let what = format!("GET {path} page {page}");
        self.retry
            .run(&what, || async {
                debug!(%url, page, per_page = self.page_size, "Requesting page");
                let resp = self
                    .http
                    .get(&url)
                    .query(&[("page", page), ("per_page", self.page_size)])
                    .send()
                    .await?;
                handle_response(resp).await
            })
            .await
    }

    /// Send a DELETE request exactly once; only `204 No Content` counts as
    /// success. Removals never go through the retry policy.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), SdkError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "Sending delete");
        let resp = self.http.delete(&url).send().await?;

        if resp.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(api_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, SdkError> {
    if resp.status() == StatusCode::OK {
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        Err(api_error(resp).await)
    }
}

async fn api_error(resp: reqwest::Response) -> SdkError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&text)
        .ok()
        .and_then(|e| e.describe())
        .unwrap_or(text);
    SdkError::Api { status, message }
}
