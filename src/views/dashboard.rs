use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::api::{error_message, ProgressEntry, ShowStatus, TrackerApi};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ShowStatus),
}

impl StatusFilter {
    pub fn matches(self, status: ShowStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<ShowStatus>()
            .map(StatusFilter::Only)
            .map_err(|_| anyhow!("filter must be all, watching, completed, paused or dropped"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardEntry {
    pub progress: ProgressEntry,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub watching: usize,
    pub completed: usize,
    pub episodes_watched: u32,
}

pub struct DashboardView {
    api: Arc<dyn TrackerApi>,
    shows: Vec<DashboardEntry>,
    is_loading: bool,
    error: Option<String>,
}

impl DashboardView {
    pub fn new(api: Arc<dyn TrackerApi>) -> Self {
        Self {
            api,
            shows: Vec::new(),
            is_loading: true,
            error: None,
        }
    }

    pub fn shows(&self) -> &[DashboardEntry] {
        &self.shows
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Progress for every tracked show, with posters taken from the user's
    /// list since the progress endpoint does not carry them.
    pub async fn load(&mut self) {
        self.is_loading = true;
        self.error = None;
        match self.fetch().await {
            Ok(shows) => {
                debug!("Dashboard loaded {} shows", shows.len());
                self.shows = shows;
            }
            Err(e) => self.error = Some(error_message(&e, "Failed to load progress")),
        }
        self.is_loading = false;
    }

    async fn fetch(&self) -> Result<Vec<DashboardEntry>> {
        let progress = self.api.all_progress().await?;
        let user_shows = self.api.user_shows().await?;
        let posters: HashMap<_, _> = user_shows
            .shows
            .into_iter()
            .map(|s| (s.show_id, s.poster_path))
            .collect();
        Ok(progress
            .shows
            .into_iter()
            .map(|p| DashboardEntry {
                poster_path: posters.get(&p.show_id).cloned().flatten(),
                progress: p,
            })
            .collect())
    }

    pub fn filtered(&self, filter: StatusFilter) -> Vec<&DashboardEntry> {
        self.shows
            .iter()
            .filter(|s| filter.matches(s.progress.status))
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        let count = |status: ShowStatus| {
            self.shows
                .iter()
                .filter(|s| s.progress.status == status)
                .count()
        };
        DashboardStats {
            total: self.shows.len(),
            watching: count(ShowStatus::Watching),
            completed: count(ShowStatus::Completed),
            episodes_watched: self.shows.iter().map(|s| s.progress.watched_episodes).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parses_all_and_statuses() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Paused".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(ShowStatus::Paused)
        );
        assert!("later".parse::<StatusFilter>().is_err());
        assert!(StatusFilter::All.matches(ShowStatus::Dropped));
        assert!(!StatusFilter::Only(ShowStatus::Watching).matches(ShowStatus::Dropped));
    }
}
