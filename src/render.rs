//! Plain-text renderings for the terminal.
use std::fmt::Write;

use crate::api::{SeasonSummary, ShowStatus};
use crate::progress::{episode_key, percentage, WatchedSet};

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w300";
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/300x450?text=No+Image";
const BAR_WIDTH: usize = 24;

pub fn poster_url(poster_path: Option<&str>) -> String {
    match poster_path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{POSTER_BASE}{path}"),
        None => PLACEHOLDER_POSTER.to_string(),
    }
}

/// `[######------]  3 / 10 episodes  30%`
pub fn progress_bar(watched: u32, total: u32) -> String {
    let pct = percentage(watched, total);
    let filled = (pct.min(100) as usize * BAR_WIDTH) / 100;
    format!(
        "[{}{}]  {} / {} episodes  {}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        watched,
        total,
        pct
    )
}

pub fn rating(value: f64) -> String {
    format!("\u{2b50} {value:.1}")
}

#[derive(Debug, Clone, Default)]
pub struct Card<'a> {
    pub id: i32,
    pub title: &'a str,
    pub year: Option<&'a str>,
    pub rating: Option<f64>,
    pub status: Option<ShowStatus>,
    pub favorite: bool,
    pub added: bool,
    /// Watched, total and the backend's percentage, shown as sent.
    pub progress: Option<(u32, u32, f64)>,
    pub poster: Option<&'a str>,
}

/// One or two lines describing a show in a list.
pub fn show_card(card: &Card<'_>) -> String {
    let mut line = format!("{:>7}  {}", card.id, card.title);
    if let Some(year) = card.year {
        let _ = write!(line, " ({year})");
    }
    if let Some(r) = card.rating {
        let _ = write!(line, "  {}", rating(r));
    }
    if let Some(status) = card.status {
        let _ = write!(line, "  [{}]", status.label());
    }
    if card.favorite {
        line.push_str("  \u{2665}");
    }
    if card.added {
        line.push_str("  (in list)");
    }
    if let Some((watched, total, pct)) = card.progress {
        let _ = write!(line, "\n         {watched}/{total}  {pct}%");
    }
    if let Some(poster) = card.poster {
        let _ = write!(line, "\n         {poster}");
    }
    line
}

/// Per season a header with the watched count, then one cell per episode.
pub fn episode_grid(seasons: &[SeasonSummary], watched: &WatchedSet) -> String {
    let mut out = String::new();
    for season in seasons {
        let count = season.episode_count;
        let seen = watched.watched_in_season(season.season_number, count);
        let name = if season.name.is_empty() {
            format!("Season {}", season.season_number)
        } else {
            season.name.clone()
        };
        let _ = writeln!(out, "{name}  {seen}/{count} watched");
        let cells: Vec<String> = (1..=count)
            .map(|ep| {
                let mark = if watched.contains(season.season_number, ep) {
                    'x'
                } else {
                    ' '
                };
                format!("[{mark}] {}", episode_key(season.season_number, ep))
            })
            .collect();
        for row in cells.chunks(6) {
            let _ = writeln!(out, "  {}", row.join("  "));
        }
    }
    out
}
