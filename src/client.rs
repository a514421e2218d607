use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use http_cache_reqwest::{CACacheManager, Cache, HttpCache};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::fallback;
use crate::news::{ApiStatus, HealthResponse, NewsResponse};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("news item #{0} was not found")]
    NotFound(i64),

    #[error("the news service responded with {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Network(#[from] anyhow::Error),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Access to the remote news service that falls back to the embedded dataset.
///
/// Built once at start-up and shared by reference; the underlying HTTP client is never
/// reconfigured afterwards.
pub struct NewsClient {
    http: ClientWithMiddleware,
    /// Health checks bypass the HTTP cache.
    uncached: ClientWithMiddleware,
    base_url: Url,
    health_url: Url,
    fetch_timeout: Duration,
    health_timeout: Duration,
}

impl NewsClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let fetch_timeout = cfg.fetch_timeout.into();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("newsgrid/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(fetch_timeout)
            .build()
            .context("could not create an HTTP client")?;
        let uncached = ClientWithMiddleware::from(client.clone());
        let builder = ClientBuilder::new(client);

        let http = if let Some(path) = cfg.cache_dir.clone() {
            debug!("Using an HTTP cache at {}", path.display());
            builder
                .with(Cache(HttpCache {
                    mode: Default::default(),
                    manager: CACacheManager { path },
                    options: Default::default(),
                }))
                .build()
        } else {
            builder.build()
        };

        let mut base_url = cfg.api_url.clone();

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let health_url = base_url
            .join("health")
            .with_context(|| anyhow!("`{}` cannot be used as a base URL", cfg.api_url))?;

        info!("Using the news service at {base_url}");

        Ok(Self {
            http,
            uncached,
            base_url,
            health_url,
            fetch_timeout,
            health_timeout: cfg.health_timeout.into(),
        })
    }

    /// Fetches the top `limit` news items.
    ///
    /// Never fails: any problem with the service is logged and answered with the fallback
    /// dataset instead.
    #[instrument(skip(self))]
    pub async fn fetch_news(&self, limit: NonZeroUsize) -> NewsResponse {
        match self.try_fetch_news(limit).await {
            Ok(response) => {
                debug!(count = response.data.len(), "Received news from the service");

                response
            }

            Err(e) => {
                warn!("Could not fetch news, serving the fallback dataset: {e:#}");

                fallback::news(limit.get())
            }
        }
    }

    async fn try_fetch_news(&self, limit: NonZeroUsize) -> Result<NewsResponse, FetchError> {
        let url = self.endpoint("news")?;
        let request = self
            .http
            .get(url.clone())
            .query(&[("limit", limit.get())])
            .timeout(self.fetch_timeout);

        receive(request, &url).await
    }

    /// Fetches a single news item.
    ///
    /// The service is asked only when a health probe succeeds first; otherwise the item is looked
    /// up in the fallback dataset.
    #[instrument(skip(self))]
    pub async fn fetch_news_by_id(&self, id: i64) -> Result<NewsResponse, FetchError> {
        if self.is_online().await {
            let url = self.endpoint(&format!("news/{id}"))?;
            let request = self.http.get(url.clone()).timeout(self.fetch_timeout);

            return receive(request, &url).await.map_err(|e| match e {
                FetchError::Status(StatusCode::NOT_FOUND) => FetchError::NotFound(id),
                e => e,
            });
        }

        debug!("The news service is offline, looking the item up in the fallback dataset");

        fallback::news_by_id(id).ok_or(FetchError::NotFound(id))
    }

    /// A lightweight probe: whether `GET /health` answers with 200 in time.
    pub async fn is_online(&self) -> bool {
        let result = self
            .uncached
            .get(self.health_url.clone())
            .timeout(self.health_timeout)
            .send()
            .await;

        match result {
            Ok(response) => response.status() == StatusCode::OK,

            Err(e) => {
                debug!("The health probe failed: {e:#}");

                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn api_status(&self) -> ApiStatus {
        let request = self
            .uncached
            .get(self.health_url.clone())
            .timeout(self.fetch_timeout);

        match receive::<HealthResponse>(request, &self.health_url).await {
            Ok(health) => health.into(),

            Err(e) => {
                warn!("The news service is unavailable: {e:#}");

                ApiStatus::offline()
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .with_context(|| anyhow!("could not build the URL for `{path}`"))
            .map_err(Into::into)
    }
}

async fn receive<T: DeserializeOwned>(
    request: reqwest_middleware::RequestBuilder,
    url: &Url,
) -> Result<T, FetchError> {
    let response = request
        .send()
        .await
        .with_context(|| anyhow!("could not fetch `{url}`"))?;

    let status = response.status();

    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response
        .bytes()
        .await
        .with_context(|| anyhow!("could not read the response when fetching `{url}`"))?;

    serde_json::from_slice(&body)
        .with_context(|| anyhow!("the response from `{url}` has an unexpected shape"))
        .map_err(Into::into)
}
