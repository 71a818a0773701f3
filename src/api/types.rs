use anyhow::anyhow;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ShowId = i32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowStatus {
    #[default]
    Watching,
    Completed,
    Paused,
    Dropped,
}

impl ShowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ShowStatus::Watching => "watching",
            ShowStatus::Completed => "completed",
            ShowStatus::Paused => "paused",
            ShowStatus::Dropped => "dropped",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShowStatus::Watching => "Watching",
            ShowStatus::Completed => "Completed",
            ShowStatus::Paused => "Paused",
            ShowStatus::Dropped => "Dropped",
        }
    }
}

impl fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShowStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "watching" => Ok(ShowStatus::Watching),
            "completed" => Ok(ShowStatus::Completed),
            "paused" => Ok(ShowStatus::Paused),
            "dropped" => Ok(ShowStatus::Dropped),
            other => Err(anyhow!(
                "unknown status '{}' (expected watching, completed, paused or dropped)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingWindow {
    Day,
    #[default]
    Week,
}

impl TrendingWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendingWindow::Day => "day",
            TrendingWindow::Week => "week",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSearchResult {
    pub id: ShowId,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl ShowSearchResult {
    pub fn year(&self) -> Option<&str> {
        self.first_air_date
            .as_deref()
            .and_then(|d| d.get(..4))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    pub results: Vec<ShowSearchResult>,
    pub page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingPage {
    #[serde(default)]
    pub results: Vec<ShowSearchResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
}

/// Cached shows carry genres as a comma-separated string, fresh catalog
/// lookups as a list of objects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Genres {
    Text(String),
    List(Vec<Genre>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u32,
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowDetails {
    pub id: ShowId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub total_seasons: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub genres: Option<Genres>,
    #[serde(default)]
    pub tmdb_rating: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub seasons: Option<Vec<SeasonSummary>>,
}

impl ShowDetails {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("Unknown Show")
    }

    pub fn total_episodes(&self) -> u32 {
        non_zero(self.total_episodes)
            .or(non_zero(self.number_of_episodes))
            .unwrap_or(0)
    }

    pub fn total_seasons(&self) -> u32 {
        non_zero(self.total_seasons)
            .or(non_zero(self.number_of_seasons))
            .unwrap_or(0)
    }

    pub fn rating(&self) -> f64 {
        self.tmdb_rating
            .filter(|r| *r > 0.0)
            .or(self.vote_average)
            .unwrap_or(0.0)
    }

    pub fn genre_names(&self) -> Vec<String> {
        match &self.genres {
            Some(Genres::Text(text)) => text
                .split(',')
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
            Some(Genres::List(list)) => list.iter().map(|g| g.name.clone()).collect(),
            None => Vec::new(),
        }
    }
}

fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeInfo {
    pub episode_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonDetails {
    #[serde(default)]
    pub episodes: Vec<EpisodeInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserShow {
    pub show_id: ShowId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub status: ShowStatus,
    #[serde(default, deserialize_with = "flag")]
    pub favorite: bool,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_episodes: u32,
    #[serde(default)]
    pub total_seasons: Option<u32>,
    #[serde(default)]
    pub watched_episodes: Option<u32>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

/// SQLite rows carry booleans as `0`/`1`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        None => false,
    })
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserShowList {
    pub shows: Vec<UserShow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedEpisode {
    pub season: u32,
    pub episode: u32,
    #[serde(default)]
    pub watched_at: Option<String>,
}

impl WatchedEpisode {
    /// The backend stores naive UTC timestamps; RFC 3339 is accepted too.
    pub fn watched_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.watched_at.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchedEpisodes {
    pub show_id: ShowId,
    #[serde(default)]
    pub episodes: Vec<WatchedEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowProgress {
    pub show_id: ShowId,
    pub watched: u32,
    pub total: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressEntry {
    pub show_id: ShowId,
    pub title: String,
    pub total_episodes: u32,
    pub watched_episodes: u32,
    pub percentage: f64,
    pub status: ShowStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressOverview {
    pub shows: Vec<ProgressEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddShowRequest {
    pub show_id: ShowId,
    pub status: ShowStatus,
    pub favorite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeRef {
    pub show_id: ShowId,
    pub season: u32,
    pub episode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonMarkRequest {
    pub show_id: ShowId,
    pub season: u32,
    pub episode_count: u32,
}

/// Acknowledgement body returned by mutating endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub marked_count: Option<u32>,
}
