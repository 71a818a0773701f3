use std::collections::BTreeSet;

use crate::api::WatchedEpisode;

/// Share of watched episodes as a whole percent. No episodes means 0%.
pub fn percentage(watched: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((f64::from(watched) / f64::from(total)) * 100.0).round() as u32
}

/// `S01E02` style key, both numbers padded to at least two digits.
pub fn episode_key(season: u32, episode: u32) -> String {
    format!("S{season:02}E{episode:02}")
}

pub fn parse_episode_key(key: &str) -> Option<(u32, u32)> {
    let rest = key.strip_prefix('S')?;
    let (season, episode) = rest.split_once('E')?;
    if season.is_empty() || episode.is_empty() {
        return None;
    }
    Some((season.parse().ok()?, episode.parse().ok()?))
}

/// Watched episodes of one show, keyed by [`episode_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchedSet {
    keys: BTreeSet<String>,
}

impl WatchedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_watched(episodes: &[WatchedEpisode]) -> Self {
        Self {
            keys: episodes
                .iter()
                .map(|e| episode_key(e.season, e.episode))
                .collect(),
        }
    }

    pub fn contains(&self, season: u32, episode: u32) -> bool {
        self.keys.contains(&episode_key(season, episode))
    }

    /// Returns false when the episode was already present.
    pub fn insert(&mut self, season: u32, episode: u32) -> bool {
        self.keys.insert(episode_key(season, episode))
    }

    /// Returns false when the episode was not present.
    pub fn remove(&mut self, season: u32, episode: u32) -> bool {
        self.keys.remove(&episode_key(season, episode))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// How many of episodes `1..=episode_count` of `season` are watched.
    pub fn watched_in_season(&self, season: u32, episode_count: u32) -> u32 {
        (1..=episode_count)
            .filter(|ep| self.contains(season, *ep))
            .count() as u32
    }
}
