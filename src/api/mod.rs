use anyhow::Result;
use async_trait::async_trait;

mod client;
mod types;

pub use client::{ApiClient, ApiError};
pub use types::{
    AddShowRequest, EpisodeInfo, EpisodeRef, Genre, Genres, LoginUrl, Message, ProgressEntry,
    ProgressOverview, SearchPage, SeasonDetails, SeasonMarkRequest, SeasonSummary, ShowDetails,
    ShowId, ShowProgress, ShowSearchResult, ShowStatus, TrendingPage, TrendingWindow, UserShow,
    UserShowList, WatchedEpisode, WatchedEpisodes,
};

/// Every endpoint of the tracking backend the client consumes.
///
/// The token accessors are synchronous: they only touch the in-memory copy
/// and the token store, never the network.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: Option<String>) -> Result<()>;

    async fn login_url(&self) -> Result<LoginUrl>;

    async fn search_shows(&self, query: &str, page: u32) -> Result<SearchPage>;
    async fn trending_shows(&self, window: TrendingWindow) -> Result<TrendingPage>;
    async fn show_details(&self, show_id: ShowId) -> Result<ShowDetails>;
    async fn season_details(&self, show_id: ShowId, season: u32) -> Result<SeasonDetails>;

    async fn add_show(&self, show_id: ShowId, status: ShowStatus, favorite: bool)
        -> Result<Message>;
    async fn user_shows(&self) -> Result<UserShowList>;
    async fn update_show_status(&self, show_id: ShowId, status: ShowStatus) -> Result<Message>;
    async fn remove_show(&self, show_id: ShowId) -> Result<Message>;

    async fn mark_episode_watched(&self, show_id: ShowId, season: u32, episode: u32)
        -> Result<Message>;
    async fn unmark_episode_watched(
        &self,
        show_id: ShowId,
        season: u32,
        episode: u32,
    ) -> Result<Message>;
    async fn watched_episodes(&self, show_id: ShowId) -> Result<WatchedEpisodes>;
    async fn show_progress(&self, show_id: ShowId) -> Result<ShowProgress>;
    async fn all_progress(&self) -> Result<ProgressOverview>;
    async fn mark_season_watched(
        &self,
        show_id: ShowId,
        season: u32,
        episode_count: u32,
    ) -> Result<Message>;
}

/// Message shown to the user for a failed call: the error's own message,
/// or `fallback` when it has none.
pub fn error_message(err: &anyhow::Error, fallback: &str) -> String {
    let msg = err.to_string();
    if msg.trim().is_empty() {
        fallback.to_string()
    } else {
        msg
    }
}
