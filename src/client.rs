use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    retry::{self, Outcome},
    runtime::BackgroundRuntime,
    task::CallTask,
    MatchResultRequest, MatchResultResponse, PreMatchRequest, PreMatchResponse, Result,
    RetryConfig, SkillError,
};

/// Header carrying the configured API secret on every outbound request.
pub const API_KEY_HEADER: &str = "x-ivk-apikey";

/// Default service root targeted when the builder is given no base URL.
pub const DEFAULT_BASE_URL: &str = "https://skill.ivk.dev";

/// Default routing/tenancy environment sent with every call.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// HTTP client for the IVK Skill rating API.
///
/// Cloning is cheap and shares the connection pool, configuration and
/// background runtime; [`SkillClient::shutdown`] therefore affects every
/// clone.
#[derive(Clone)]
pub struct SkillClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    environment: String,
    retry: RetryConfig,
    runtime: BackgroundRuntime,
}

impl fmt::Debug for SkillClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillClient")
            .field("base_url", &self.inner.base_url)
            .field("api_key", &"<redacted>")
            .field("environment", &self.inner.environment)
            .field("retry", &self.inner.retry)
            .finish()
    }
}

impl SkillClient {
    /// Starts building a client. `api_key` is the only required option.
    pub fn builder() -> SkillClientBuilder {
        SkillClientBuilder::new()
    }

    /// Submits a finished match to update player skill ratings.
    ///
    /// Suspends on the caller's runtime; transient failures are retried
    /// with exponential backoff per the configured [`RetryConfig`].
    pub async fn submit_match_result(
        &self,
        model_id: &str,
        request: &MatchResultRequest,
    ) -> Result<MatchResultResponse> {
        self.inner.post(model_id, "match-result", request).await
    }

    /// Computes expected match outcomes before play starts.
    pub async fn compute_pre_match(
        &self,
        model_id: &str,
        request: &PreMatchRequest,
    ) -> Result<PreMatchResponse> {
        self.inner.post(model_id, "pre-match", request).await
    }

    /// Blocking variant of [`SkillClient::submit_match_result`].
    ///
    /// Drives the same retried call to completion on the calling thread.
    /// Must not be invoked from within an async context; use the async
    /// method there instead.
    pub fn submit_match_result_blocking(
        &self,
        model_id: &str,
        request: &MatchResultRequest,
    ) -> Result<MatchResultResponse> {
        self.inner
            .runtime
            .block_on(self.submit_match_result(model_id, request))
    }

    /// Blocking variant of [`SkillClient::compute_pre_match`].
    ///
    /// Must not be invoked from within an async context.
    pub fn compute_pre_match_blocking(
        &self,
        model_id: &str,
        request: &PreMatchRequest,
    ) -> Result<PreMatchResponse> {
        self.inner
            .runtime
            .block_on(self.compute_pre_match(model_id, request))
    }

    /// Starts [`SkillClient::submit_match_result`] on the client's
    /// background runtime and returns a handle immediately.
    pub fn submit_match_result_task(
        &self,
        model_id: &str,
        request: &MatchResultRequest,
    ) -> CallTask<MatchResultResponse> {
        let client = self.clone();
        let model_id = model_id.to_owned();
        let request = request.clone();
        self.inner
            .runtime
            .spawn(async move { client.submit_match_result(&model_id, &request).await })
    }

    /// Starts [`SkillClient::compute_pre_match`] on the client's background
    /// runtime and returns a handle immediately.
    pub fn compute_pre_match_task(
        &self,
        model_id: &str,
        request: &PreMatchRequest,
    ) -> CallTask<PreMatchResponse> {
        let client = self.clone();
        let model_id = model_id.to_owned();
        let request = request.clone();
        self.inner
            .runtime
            .spawn(async move { client.compute_pre_match(&model_id, &request).await })
    }

    /// Cancels in-flight calls, rejects new blocking/task submissions and
    /// releases the background runtime. Safe to call more than once; also
    /// runs on drop of the last clone.
    pub fn shutdown(&self) {
        self.inner.runtime.shutdown();
    }

    /// Whether [`SkillClient::shutdown`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.inner.runtime.is_closed()
    }
}

impl ClientInner {
    /// The single choke point every operation and call style funnels
    /// through: one authenticated POST per attempt, driven by the retry
    /// engine.
    async fn post<Req, Resp>(&self, model_id: &str, operation: &str, payload: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = self.operation_url(model_id, operation);
        retry::execute_with_retry(&self.retry, self.runtime.cancel_token(), || {
            self.attempt(&url, payload)
        })
        .await
    }

    async fn attempt<Req, Resp>(&self, url: &str, payload: &Req) -> Outcome<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("environment", self.environment.as_str())])
            .json(payload)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            // Connectivity failures are always worth another attempt.
            Err(err) => return Outcome::Retryable(SkillError::Transport(err)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Outcome::Retryable(SkillError::Transport(err)),
        };

        if !status.is_success() {
            let error = SkillError::Api {
                status: status.as_u16(),
                body,
            };
            return if retry::retryable_status(status) {
                Outcome::Retryable(error)
            } else {
                Outcome::NonRetryable(error)
            };
        }

        match serde_json::from_str::<Resp>(&body) {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::NonRetryable(SkillError::Decode(format!(
                "invalid response JSON: {err}; body: {body}"
            ))),
        }
    }

    fn operation_url(&self, model_id: &str, operation: &str) -> String {
        format!(
            "{}/v1/models/{model_id}/{operation}",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.runtime.shutdown();
    }
}

/// Builder for [`SkillClient`].
///
/// All validation happens in [`SkillClientBuilder::build`], before any
/// network activity; the resulting client is immutable.
#[derive(Clone, Default)]
pub struct SkillClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    environment: Option<String>,
    retry: Option<RetryConfig>,
    http: Option<reqwest::Client>,
}

impl SkillClientBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Sets the API key injected as the `x-ivk-apikey` header (required).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the service root (defaults to [`DEFAULT_BASE_URL`]).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Overrides the environment sent with every call (defaults to
    /// [`DEFAULT_ENVIRONMENT`]).
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Overrides retry behavior (defaults to [`RetryConfig::default`]).
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Supplies a caller-owned transport client. The API key header is
    /// still injected on every request.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Validates the configuration and constructs the client.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::Config`] for a missing/blank API key or a
    /// blank base URL or environment, [`SkillError::Transport`] if the
    /// internal transport client cannot be built, and
    /// [`SkillError::Runtime`] if the background runtime cannot start.
    pub fn build(self) -> Result<SkillClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SkillError::Config("api key is required".to_owned()))?;

        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        if base_url.trim().is_empty() {
            return Err(SkillError::Config("base url cannot be blank".to_owned()));
        }

        let environment = self
            .environment
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned());
        if environment.trim().is_empty() {
            return Err(SkillError::Config(
                "environment cannot be blank".to_owned(),
            ));
        }

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(30))
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(SkillError::Transport)?,
        };

        let runtime = BackgroundRuntime::start()?;

        Ok(SkillClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                api_key,
                environment,
                retry: self.retry.unwrap_or_default(),
                runtime,
            }),
        })
    }
}
