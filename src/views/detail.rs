//! Show detail page state: the watched-episode set with optimistic updates.
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{error_message, SeasonSummary, ShowDetails, ShowId, ShowStatus, TrackerApi};
use crate::progress::{percentage, WatchedSet};

pub struct ShowDetailView {
    api: Arc<dyn TrackerApi>,
    show_id: ShowId,
    show: Option<ShowDetails>,
    watched: WatchedSet,
    is_loading: bool,
    error: Option<String>,
    in_list: bool,
}

impl ShowDetailView {
    pub fn new(api: Arc<dyn TrackerApi>, show_id: ShowId) -> Self {
        Self {
            api,
            show_id,
            show: None,
            watched: WatchedSet::new(),
            is_loading: true,
            error: None,
            in_list: false,
        }
    }

    pub fn show_id(&self) -> ShowId {
        self.show_id
    }

    pub fn show(&self) -> Option<&ShowDetails> {
        self.show.as_ref()
    }

    pub fn watched(&self) -> &WatchedSet {
        &self.watched
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_list(&self) -> bool {
        self.in_list
    }

    /// Fetches the show, then the user's watched episodes for it. A failed
    /// watched-list fetch means the show is not on the user's list.
    pub async fn load(&mut self) {
        if self.show_id <= 0 {
            return;
        }
        self.is_loading = true;
        self.error = None;

        match self.api.show_details(self.show_id).await {
            Ok(show) => {
                self.show = Some(show);
                match self.api.watched_episodes(self.show_id).await {
                    Ok(list) => {
                        self.watched = WatchedSet::from_watched(&list.episodes);
                        self.in_list = true;
                        debug!(
                            "Show {} has {} watched episodes",
                            self.show_id,
                            self.watched.len()
                        );
                    }
                    Err(e) => {
                        debug!("Show {} not in list: {}", self.show_id, e);
                        self.in_list = false;
                    }
                }
            }
            Err(e) => {
                self.error = Some(error_message(&e, "Failed to load show"));
            }
        }
        self.is_loading = false;
    }

    pub async fn add_to_list(&mut self) -> bool {
        match self
            .api
            .add_show(self.show_id, ShowStatus::default(), false)
            .await
        {
            Ok(_) => {
                self.in_list = true;
                info!("Added show {} to list", self.show_id);
                true
            }
            Err(e) => {
                self.error = Some(error_message(&e, "Failed to add show"));
                false
            }
        }
    }

    pub async fn remove_from_list(&mut self) -> bool {
        match self.api.remove_show(self.show_id).await {
            Ok(_) => {
                self.in_list = false;
                self.watched.clear();
                info!("Removed show {} from list", self.show_id);
                true
            }
            Err(e) => {
                self.error = Some(error_message(&e, "Failed to remove show"));
                false
            }
        }
    }

    /// Marks or unmarks one episode. The set changes before the request is
    /// sent; if the request fails only a key that actually changed is reverted. Returns whether the
    /// server accepted it.
    pub async fn toggle_episode(&mut self, season: u32, episode: u32, watched: bool) -> bool {
        let changed = if watched {
            self.watched.insert(season, episode)
        } else {
            self.watched.remove(season, episode)
        };

        let result = if watched {
            self.api
                .mark_episode_watched(self.show_id, season, episode)
                .await
        } else {
            self.api
                .unmark_episode_watched(self.show_id, season, episode)
                .await
        };

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    "Reverting S{:02}E{:02} of show {}: {}",
                    season, episode, self.show_id, e
                );
                if changed && watched {
                    self.watched.remove(season, episode);
                } else if changed {
                    self.watched.insert(season, episode);
                }
                false
            }
        }
    }

    /// Marks episodes `1..=episode_count` watched. On failure the whole view
    /// is reloaded from the server instead of reverting key by key.
    pub async fn mark_season_watched(&mut self, season: u32, episode_count: u32) -> bool {
        for episode in 1..=episode_count {
            self.watched.insert(season, episode);
        }

        match self
            .api
            .mark_season_watched(self.show_id, season, episode_count)
            .await
        {
            Ok(_) => {
                info!(
                    "Marked season {} of show {} watched ({} episodes)",
                    season, self.show_id, episode_count
                );
                true
            }
            Err(e) => {
                warn!(
                    "Season {} of show {} failed, reloading: {}",
                    season, self.show_id, e
                );
                self.load().await;
                false
            }
        }
    }

    /// Regular seasons of the show. When the backend did not send a season
    /// list, episodes are spread evenly over `total_seasons` seasons.
    pub fn seasons(&self) -> Vec<SeasonSummary> {
        let Some(show) = &self.show else {
            return Vec::new();
        };
        if let Some(seasons) = &show.seasons {
            return seasons
                .iter()
                .filter(|s| s.season_number > 0)
                .cloned()
                .collect();
        }
        let total_seasons = show.total_seasons();
        if total_seasons == 0 {
            return Vec::new();
        }
        let per_season = show.total_episodes().div_ceil(total_seasons);
        (1..=total_seasons)
            .map(|n| SeasonSummary {
                season_number: n,
                episode_count: per_season,
                name: format!("Season {n}"),
            })
            .collect()
    }

    /// `(watched, total, percent)` for the progress bar.
    pub fn progress(&self) -> (u32, u32, u32) {
        let watched = self.watched.len() as u32;
        let total = self.show.as_ref().map(|s| s.total_episodes()).unwrap_or(0);
        (watched, total, percentage(watched, total))
    }
}
