use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use showtrack::api::{ApiClient, ShowId, ShowStatus, TrackerApi, TrendingWindow};
use showtrack::callback;
use showtrack::config::Config;
use showtrack::render::{self, Card};
use showtrack::token::FileTokenStore;
use showtrack::views::{
    DashboardView, LibraryView, SearchView, Session, ShowDetailView, StatusFilter,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Parser)]
#[command(name = "showtrack", version, about = "Track which TV episodes you have watched")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in through the backend's OAuth flow
    Login {
        /// Store a token you already have instead of opening the OAuth flow
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show whether a token is stored
    Whoami,
    /// Search the show catalog
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Shows trending today or this week
    Trending {
        #[arg(long, default_value = "week", value_parser = parse_window)]
        window: TrendingWindow,
    },
    /// Show details, progress and episode grid
    Show { id: ShowId },
    /// List the episodes of one season
    Season { id: ShowId, season: u32 },
    /// Add a show to your list
    Add {
        id: ShowId,
        #[arg(long, default_value = "watching", value_parser = parse_status)]
        status: ShowStatus,
        #[arg(long)]
        favorite: bool,
    },
    /// Your tracked shows
    List,
    /// Change the tracking status of a show
    Status {
        id: ShowId,
        #[arg(value_parser = parse_status)]
        status: ShowStatus,
    },
    /// Remove a show from your list
    Remove { id: ShowId },
    /// Mark an episode watched
    Watch { id: ShowId, season: u32, episode: u32 },
    /// Mark an episode unwatched
    Unwatch { id: ShowId, season: u32, episode: u32 },
    /// Mark every episode of a season watched
    WatchSeason {
        id: ShowId,
        season: u32,
        /// Episode count, when the show's season list does not provide it
        #[arg(long)]
        count: Option<u32>,
    },
    /// Progress for one show, or for all tracked shows
    Progress { id: Option<ShowId> },
    /// Stats and progress cards for your list
    Dashboard {
        #[arg(long, default_value = "all", value_parser = parse_filter)]
        filter: StatusFilter,
    },
}

fn parse_status(s: &str) -> Result<ShowStatus, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_filter(s: &str) -> Result<StatusFilter, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_window(s: &str) -> Result<TrendingWindow, String> {
    match s.to_lowercase().as_str() {
        "day" => Ok(TrendingWindow::Day),
        "week" => Ok(TrendingWindow::Week),
        _ => Err("window must be 'day' or 'week'".to_string()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn fail_on(error: Option<&str>) -> Result<()> {
    match error {
        Some(msg) => Err(anyhow!("{msg}")),
        None => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = dotenv();
    init_tracing();
    match env_file {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) => debug!("No .env file loaded ({})", e),
    }

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store = Arc::new(FileTokenStore::new(&config.token_file));
    let api: Arc<dyn TrackerApi> = Arc::new(ApiClient::from_config(&config, store)?);
    info!("Using tracker backend at {}", config.api_url);

    run(cli.command, api, &config).await
}

async fn run(command: Command, api: Arc<dyn TrackerApi>, config: &Config) -> Result<()> {
    match command {
        Command::Login { token } => login(api, config, token).await,
        Command::Logout => {
            let mut session = Session::restore(api);
            session.logout()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let session = Session::restore(api);
            if session.is_authenticated() {
                println!("Signed in (token stored in {}).", config.token_file.display());
            } else {
                println!("Not signed in. Run `showtrack login`.");
            }
            Ok(())
        }
        Command::Search { query, page } => search(api, &query.join(" "), page).await,
        Command::Trending { window } => {
            let trending = api.trending_shows(window).await?;
            for show in &trending.results {
                println!(
                    "{}",
                    render::show_card(&Card {
                        id: show.id,
                        title: &show.name,
                        year: show.year(),
                        rating: show.vote_average,
                        ..Card::default()
                    })
                );
            }
            Ok(())
        }
        Command::Show { id } => show(api, id).await,
        Command::Season { id, season } => {
            let details = api.season_details(id, season).await?;
            for ep in &details.episodes {
                println!(
                    "{}  {}{}",
                    showtrack::progress::episode_key(season, ep.episode_number),
                    ep.name.as_deref().unwrap_or("TBA"),
                    ep.air_date
                        .as_deref()
                        .map(|d| format!("  ({d})"))
                        .unwrap_or_default()
                );
            }
            Ok(())
        }
        Command::Add {
            id,
            status,
            favorite,
        } => {
            api.add_show(id, status, favorite).await?;
            println!("Added show {id} as {status}.");
            Ok(())
        }
        Command::List => {
            let mut library = LibraryView::new(api);
            library.fetch_shows().await;
            fail_on(library.error())?;
            if library.shows().is_empty() {
                println!("You haven't added any shows yet.");
            }
            for show in library.shows() {
                println!(
                    "{}",
                    render::show_card(&Card {
                        id: show.show_id,
                        title: &show.title,
                        status: Some(show.status),
                        favorite: show.favorite,
                        ..Card::default()
                    })
                );
            }
            Ok(())
        }
        Command::Status { id, status } => {
            let mut library = LibraryView::new(api);
            if !library.update_status(id, status).await {
                fail_on(library.error())?;
            }
            println!("Show {id} is now {status}.");
            Ok(())
        }
        Command::Remove { id } => {
            let mut library = LibraryView::new(api);
            if !library.remove_show(id).await {
                fail_on(library.error())?;
            }
            println!("Removed show {id}.");
            Ok(())
        }
        Command::Watch {
            id,
            season,
            episode,
        } => toggle(api, id, season, episode, true).await,
        Command::Unwatch {
            id,
            season,
            episode,
        } => toggle(api, id, season, episode, false).await,
        Command::WatchSeason { id, season, count } => watch_season(api, id, season, count).await,
        Command::Progress { id: Some(id) } => {
            let progress = api.show_progress(id).await?;
            println!("{}", render::progress_bar(progress.watched, progress.total));
            Ok(())
        }
        Command::Progress { id: None } => {
            let overview = api.all_progress().await?;
            for entry in &overview.shows {
                println!(
                    "{:>7}  {:<40} {}",
                    entry.show_id,
                    entry.title,
                    render::progress_bar(entry.watched_episodes, entry.total_episodes)
                );
            }
            Ok(())
        }
        Command::Dashboard { filter } => dashboard(api, filter).await,
    }
}

async fn login(api: Arc<dyn TrackerApi>, config: &Config, token: Option<String>) -> Result<()> {
    if let Some(token) = token {
        api.set_token(Some(token))?;
        println!("Token stored.");
        return Ok(());
    }

    let session = Session::restore(api.clone());
    let listener = callback::bind(config.callback_addr).await?;
    let url = session.login().await?;
    println!("Open this URL in your browser to sign in:\n\n  {url}\n");

    let redirect = callback::wait_for_redirect(listener, LOGIN_TIMEOUT).await?;
    let (session, _) = Session::from_url(api, &redirect)?;
    if !session.is_authenticated() {
        bail!("login callback did not carry a token");
    }
    println!("Signed in.");
    Ok(())
}

async fn search(api: Arc<dyn TrackerApi>, query: &str, page: u32) -> Result<()> {
    let mut library = LibraryView::new(api.clone());
    library.fetch_shows().await;

    let mut view = SearchView::new(api);
    view.search(query, page).await;
    fail_on(view.error())?;
    if view.results().is_empty() {
        println!("No shows found for '{}'.", query.trim());
        return Ok(());
    }
    for show in view.results() {
        println!(
            "{}",
            render::show_card(&Card {
                id: show.id,
                title: &show.name,
                year: show.year(),
                rating: show.vote_average,
                added: library.contains(show.id),
                ..Card::default()
            })
        );
    }
    println!("\npage {}/{}", view.page(), view.total_pages());
    Ok(())
}

async fn show(api: Arc<dyn TrackerApi>, id: ShowId) -> Result<()> {
    let mut view = ShowDetailView::new(api, id);
    view.load().await;
    fail_on(view.error())?;
    let show = view.show().ok_or_else(|| anyhow!("Show not found"))?;

    println!("{}", show.display_title());
    let mut facts = Vec::new();
    if show.rating() > 0.0 {
        facts.push(render::rating(show.rating()));
    }
    facts.push(format!("{} Seasons", show.total_seasons()));
    facts.push(format!("{} Episodes", show.total_episodes()));
    println!("{}", facts.join("  "));
    let genres = show.genre_names();
    if !genres.is_empty() {
        println!("{}", genres.join(" \u{b7} "));
    }
    println!("Poster: {}", render::poster_url(show.poster_path.as_deref()));
    if let Some(overview) = show.overview.as_deref().filter(|o| !o.is_empty()) {
        println!("\n{overview}");
    }

    if !view.in_list() {
        println!("\nNot in your list. Add it with `showtrack add {id}`.");
        return Ok(());
    }
    let (watched, total, _) = view.progress();
    println!("\nProgress\n{}", render::progress_bar(watched, total));
    let seasons = view.seasons();
    if !seasons.is_empty() {
        println!("\nEpisodes\n{}", render::episode_grid(&seasons, view.watched()));
    }
    Ok(())
}

async fn toggle(
    api: Arc<dyn TrackerApi>,
    id: ShowId,
    season: u32,
    episode: u32,
    watched: bool,
) -> Result<()> {
    let mut view = ShowDetailView::new(api, id);
    view.load().await;
    fail_on(view.error())?;
    let key = showtrack::progress::episode_key(season, episode);
    if !view.toggle_episode(season, episode, watched).await {
        bail!(
            "Could not mark {key} {}; nothing was changed",
            if watched { "watched" } else { "unwatched" }
        );
    }
    let (seen, total, _) = view.progress();
    println!(
        "{key} marked {}.\n{}",
        if watched { "watched" } else { "unwatched" },
        render::progress_bar(seen, total)
    );
    Ok(())
}

async fn watch_season(
    api: Arc<dyn TrackerApi>,
    id: ShowId,
    season: u32,
    count: Option<u32>,
) -> Result<()> {
    let mut view = ShowDetailView::new(api, id);
    view.load().await;
    fail_on(view.error())?;
    let episode_count = match count {
        Some(count) => count,
        None => view
            .seasons()
            .iter()
            .find(|s| s.season_number == season)
            .map(|s| s.episode_count)
            .filter(|c| *c > 0)
            .with_context(|| format!("season {season} has no known episode count; pass --count"))?,
    };
    if !view.mark_season_watched(season, episode_count).await {
        bail!("Could not mark season {season} watched");
    }
    let (seen, total, _) = view.progress();
    println!(
        "Season {season} marked watched ({episode_count} episodes).\n{}",
        render::progress_bar(seen, total)
    );
    Ok(())
}

async fn dashboard(api: Arc<dyn TrackerApi>, filter: StatusFilter) -> Result<()> {
    let mut view = DashboardView::new(api);
    view.load().await;
    fail_on(view.error())?;

    let stats = view.stats();
    println!(
        "Shows: {}  Watching: {}  Completed: {}  Episodes watched: {}\n",
        stats.total, stats.watching, stats.completed, stats.episodes_watched
    );
    let shows = view.filtered(filter);
    if shows.is_empty() {
        match filter {
            StatusFilter::All => println!("You haven't added any shows yet."),
            StatusFilter::Only(status) => println!("No shows with status \"{status}\"."),
        }
        return Ok(());
    }
    for entry in shows {
        let p = &entry.progress;
        let poster = render::poster_url(entry.poster_path.as_deref());
        println!(
            "{}",
            render::show_card(&Card {
                id: p.show_id,
                title: &p.title,
                status: Some(p.status),
                progress: Some((p.watched_episodes, p.total_episodes, p.percentage)),
                poster: Some(&poster),
                ..Card::default()
            })
        );
    }
    Ok(())
}
