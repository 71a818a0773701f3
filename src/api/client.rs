use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::*;
use super::TrackerApi;
use crate::config::Config;
use crate::token::{TokenStore, AUTH_TOKEN_KEY};

const FALLBACK_ERROR: &str = "Request failed";

/// A non-2xx answer from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// `detail` from a JSON error body, `HTTP <status>` when the body has
    /// none, and a generic message when the body is not JSON at all.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<Value>(body) {
            Ok(value) => match value.get("detail") {
                Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
                Some(Value::Null) | None => format!("HTTP {status}"),
                Some(Value::String(_)) => format!("HTTP {status}"),
                Some(other) => other.to_string(),
            },
            Err(_) => FALLBACK_ERROR.to_string(),
        };
        Self { status, message }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token().is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_timeout(base_url, store, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self> {
        let user_agent = format!("showtrack/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build tracker HTTP client")?;
        let token = store
            .get(AUTH_TOKEN_KEY)
            .context("Failed to load stored auth token")?
            .filter(|t| !t.is_empty());
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(
            "Tracker client for {} ({} stored token)",
            base_url,
            if token.is_some() { "with" } else { "without" }
        );
        Ok(Self {
            client,
            base_url,
            store,
            token: RwLock::new(token),
        })
    }

    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_timeout(&config.api_url, store, config.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.token() {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!("{} {}", method, endpoint);
        let res = req
            .send()
            .await
            .with_context(|| format!("{method} {endpoint} failed"))?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            let err = ApiError::from_body(status.as_u16(), &text);
            warn!("{} {} -> {}: {}", method, endpoint, status, err.message);
            return Err(err.into());
        }
        serde_json::from_str(&text)
            .with_context(|| format!("JSON parse failed for {method} {endpoint}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }
}

#[async_trait]
impl TrackerApi for ApiClient {
    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_token(&self, token: Option<String>) -> Result<()> {
        let token = token.filter(|t| !t.is_empty());
        match &token {
            Some(value) => self.store.set(AUTH_TOKEN_KEY, value)?,
            None => self.store.remove(AUTH_TOKEN_KEY)?,
        }
        info!(
            "Auth token {}",
            if token.is_some() { "stored" } else { "cleared" }
        );
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
        Ok(())
    }

    async fn login_url(&self) -> Result<LoginUrl> {
        self.get_json("/api/auth/login").await
    }

    async fn search_shows(&self, query: &str, page: u32) -> Result<SearchPage> {
        let endpoint = format!(
            "/api/shows/search?q={}&page={}",
            urlencoding::encode(query),
            page
        );
        self.get_json(&endpoint).await
    }

    async fn trending_shows(&self, window: TrendingWindow) -> Result<TrendingPage> {
        let endpoint = format!("/api/shows/trending?time_window={}", window.as_str());
        self.get_json(&endpoint).await
    }

    async fn show_details(&self, show_id: ShowId) -> Result<ShowDetails> {
        self.get_json(&format!("/api/shows/{show_id}")).await
    }

    async fn season_details(&self, show_id: ShowId, season: u32) -> Result<SeasonDetails> {
        self.get_json(&format!("/api/shows/{show_id}/seasons/{season}"))
            .await
    }

    async fn add_show(
        &self,
        show_id: ShowId,
        status: ShowStatus,
        favorite: bool,
    ) -> Result<Message> {
        let body = AddShowRequest {
            show_id,
            status,
            favorite,
        };
        self.request(Method::POST, "/api/shows/add", Some(&body))
            .await
    }

    async fn user_shows(&self) -> Result<UserShowList> {
        self.get_json("/api/shows/user/list").await
    }

    async fn update_show_status(&self, show_id: ShowId, status: ShowStatus) -> Result<Message> {
        let endpoint = format!("/api/shows/{show_id}/status?status={}", status.as_str());
        self.request::<_, ()>(Method::PATCH, &endpoint, None).await
    }

    async fn remove_show(&self, show_id: ShowId) -> Result<Message> {
        self.request::<_, ()>(Method::DELETE, &format!("/api/shows/{show_id}"), None)
            .await
    }

    async fn mark_episode_watched(
        &self,
        show_id: ShowId,
        season: u32,
        episode: u32,
    ) -> Result<Message> {
        let body = EpisodeRef {
            show_id,
            season,
            episode,
        };
        self.request(Method::POST, "/api/episodes/mark-watched", Some(&body))
            .await
    }

    async fn unmark_episode_watched(
        &self,
        show_id: ShowId,
        season: u32,
        episode: u32,
    ) -> Result<Message> {
        let body = EpisodeRef {
            show_id,
            season,
            episode,
        };
        self.request(Method::DELETE, "/api/episodes/unmark-watched", Some(&body))
            .await
    }

    async fn watched_episodes(&self, show_id: ShowId) -> Result<WatchedEpisodes> {
        self.get_json(&format!("/api/episodes/show/{show_id}")).await
    }

    async fn show_progress(&self, show_id: ShowId) -> Result<ShowProgress> {
        self.get_json(&format!("/api/episodes/show/{show_id}/progress"))
            .await
    }

    async fn all_progress(&self) -> Result<ProgressOverview> {
        self.get_json("/api/episodes/progress").await
    }

    async fn mark_season_watched(
        &self,
        show_id: ShowId,
        season: u32,
        episode_count: u32,
    ) -> Result<Message> {
        let body = SeasonMarkRequest {
            show_id,
            season,
            episode_count,
        };
        self.request(
            Method::POST,
            "/api/episodes/mark-season-watched",
            Some(&body),
        )
        .await
    }
}
