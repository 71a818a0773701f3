#![allow(dead_code)]

use anyhow::Result;
use serde_json::json;
use showtrack::api::{
    ApiError, LoginUrl, Message, ProgressEntry, ProgressOverview, SearchPage, SeasonDetails,
    ShowDetails, ShowId, ShowProgress, ShowSearchResult, ShowStatus, TrackerApi, TrendingPage,
    TrendingWindow, UserShow, UserShowList, WatchedEpisode, WatchedEpisodes,
};
use std::collections::HashSet;
use std::sync::Mutex;

/// In-memory backend. Operations listed in `failing` answer with a 500.
#[derive(Default)]
pub struct FakeTracker {
    pub calls: Mutex<Vec<String>>,
    pub failing: Mutex<HashSet<&'static str>>,
    pub token: Mutex<Option<String>>,
    pub show: Mutex<Option<ShowDetails>>,
    pub watched: Mutex<Vec<WatchedEpisode>>,
    pub user_shows: Mutex<Vec<UserShow>>,
    pub progress: Mutex<Vec<ProgressEntry>>,
    pub search_results: Mutex<Vec<ShowSearchResult>>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .count()
    }

    pub fn set_watched(&self, pairs: &[(u32, u32)]) {
        *self.watched.lock().unwrap() = pairs
            .iter()
            .map(|(season, episode)| WatchedEpisode {
                season: *season,
                episode: *episode,
                watched_at: None,
            })
            .collect();
    }

    fn record(&self, op: &'static str, detail: String) -> Result<()> {
        let entry = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{op} {detail}")
        };
        self.calls.lock().unwrap().push(entry);
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::new(500, format!("{op} failed")).into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TrackerApi for FakeTracker {
    fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn set_token(&self, token: Option<String>) -> Result<()> {
        *self.token.lock().unwrap() = token;
        Ok(())
    }

    async fn login_url(&self) -> Result<LoginUrl> {
        self.record("login_url", String::new())?;
        Ok(LoginUrl {
            url: "https://accounts.example.com/o/oauth2/auth".to_string(),
        })
    }

    async fn search_shows(&self, query: &str, page: u32) -> Result<SearchPage> {
        self.record("search_shows", format!("{query}:{page}"))?;
        let results = self.search_results.lock().unwrap().clone();
        Ok(SearchPage {
            total_results: results.len() as u32,
            results,
            page,
            total_pages: 3,
        })
    }

    async fn trending_shows(&self, window: TrendingWindow) -> Result<TrendingPage> {
        self.record("trending_shows", window.as_str().to_string())?;
        Ok(TrendingPage {
            results: self.search_results.lock().unwrap().clone(),
        })
    }

    async fn show_details(&self, show_id: ShowId) -> Result<ShowDetails> {
        self.record("show_details", show_id.to_string())?;
        self.show
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::new(404, "Show not found").into())
    }

    async fn season_details(&self, show_id: ShowId, season: u32) -> Result<SeasonDetails> {
        self.record("season_details", format!("{show_id}:{season}"))?;
        Ok(SeasonDetails { episodes: vec![] })
    }

    async fn add_show(
        &self,
        show_id: ShowId,
        status: ShowStatus,
        favorite: bool,
    ) -> Result<Message> {
        self.record("add_show", format!("{show_id}:{status}:{favorite}"))?;
        self.user_shows.lock().unwrap().push(UserShow {
            show_id,
            title: format!("Show {show_id}"),
            poster_path: None,
            status,
            favorite,
            total_episodes: 10,
            total_seasons: Some(1),
            watched_episodes: None,
            percentage: None,
        });
        Ok(Message::default())
    }

    async fn user_shows(&self) -> Result<UserShowList> {
        self.record("user_shows", String::new())?;
        Ok(UserShowList {
            shows: self.user_shows.lock().unwrap().clone(),
        })
    }

    async fn update_show_status(&self, show_id: ShowId, status: ShowStatus) -> Result<Message> {
        self.record("update_show_status", format!("{show_id}:{status}"))?;
        Ok(Message::default())
    }

    async fn remove_show(&self, show_id: ShowId) -> Result<Message> {
        self.record("remove_show", show_id.to_string())?;
        self.user_shows
            .lock()
            .unwrap()
            .retain(|s| s.show_id != show_id);
        self.watched.lock().unwrap().clear();
        Ok(Message::default())
    }

    async fn mark_episode_watched(
        &self,
        show_id: ShowId,
        season: u32,
        episode: u32,
    ) -> Result<Message> {
        self.record("mark_episode_watched", format!("{show_id}:{season}:{episode}"))?;
        self.watched.lock().unwrap().push(WatchedEpisode {
            season,
            episode,
            watched_at: None,
        });
        Ok(Message::default())
    }

    async fn unmark_episode_watched(
        &self,
        show_id: ShowId,
        season: u32,
        episode: u32,
    ) -> Result<Message> {
        self.record(
            "unmark_episode_watched",
            format!("{show_id}:{season}:{episode}"),
        )?;
        self.watched
            .lock()
            .unwrap()
            .retain(|w| !(w.season == season && w.episode == episode));
        Ok(Message::default())
    }

    async fn watched_episodes(&self, show_id: ShowId) -> Result<WatchedEpisodes> {
        self.record("watched_episodes", show_id.to_string())?;
        Ok(WatchedEpisodes {
            show_id,
            episodes: self.watched.lock().unwrap().clone(),
        })
    }

    async fn show_progress(&self, show_id: ShowId) -> Result<ShowProgress> {
        self.record("show_progress", show_id.to_string())?;
        let watched = self.watched.lock().unwrap().len() as u32;
        Ok(ShowProgress {
            show_id,
            watched,
            total: 10,
            percentage: f64::from(watched) * 10.0,
        })
    }

    async fn all_progress(&self) -> Result<ProgressOverview> {
        self.record("all_progress", String::new())?;
        Ok(ProgressOverview {
            shows: self.progress.lock().unwrap().clone(),
        })
    }

    async fn mark_season_watched(
        &self,
        show_id: ShowId,
        season: u32,
        episode_count: u32,
    ) -> Result<Message> {
        self.record(
            "mark_season_watched",
            format!("{show_id}:{season}:{episode_count}"),
        )?;
        let mut watched = self.watched.lock().unwrap();
        for episode in 1..=episode_count {
            if !watched
                .iter()
                .any(|w| w.season == season && w.episode == episode)
            {
                watched.push(WatchedEpisode {
                    season,
                    episode,
                    watched_at: None,
                });
            }
        }
        Ok(Message {
            marked_count: Some(episode_count),
            ..Message::default()
        })
    }
}

pub fn show_details(value: serde_json::Value) -> ShowDetails {
    serde_json::from_value(value).expect("show details fixture")
}

/// A 2-season show with an explicit season list including specials.
pub fn sample_show() -> ShowDetails {
    show_details(json!({
        "id": 1399,
        "name": "Game of Thrones",
        "overview": "Seven noble families fight for control of Westeros.",
        "poster_path": "/got.jpg",
        "number_of_episodes": 20,
        "number_of_seasons": 2,
        "genres": [{ "id": 10765, "name": "Sci-Fi & Fantasy" }],
        "vote_average": 8.4,
        "seasons": [
            { "season_number": 0, "episode_count": 3, "name": "Specials" },
            { "season_number": 1, "episode_count": 10, "name": "Season 1" },
            { "season_number": 2, "episode_count": 10, "name": "Season 2" }
        ]
    }))
}

pub fn user_show(show_id: ShowId, title: &str, status: ShowStatus, poster: Option<&str>) -> UserShow {
    UserShow {
        show_id,
        title: title.to_string(),
        poster_path: poster.map(str::to_string),
        status,
        favorite: false,
        total_episodes: 10,
        total_seasons: Some(1),
        watched_episodes: None,
        percentage: None,
    }
}

pub fn progress_entry(
    show_id: ShowId,
    title: &str,
    watched: u32,
    total: u32,
    status: ShowStatus,
) -> ProgressEntry {
    ProgressEntry {
        show_id,
        title: title.to_string(),
        total_episodes: total,
        watched_episodes: watched,
        percentage: if total == 0 {
            0.0
        } else {
            f64::from(watched) * 100.0 / f64::from(total)
        },
        status,
    }
}
