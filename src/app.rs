use anyhow::{bail, Context, Result};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::config::Config;
use crate::connectivity::Connectivity;
use crate::detail::{DetailLoader, DetailState, PREVIEW_CLIP_URL};
use crate::favorites::FavoritesStore;
use crate::models::{Movie, MovieDetail};
use crate::omdb::{self, OmdbApi, OmdbClient};
use crate::recent::RecentSearches;
use crate::search::SearchController;
use crate::store::{JsonFileStore, KeyValueStore};
use crate::theme::ThemePreference;
use crate::view;

const HELP: &str = "\
Commands:
  search <title>     search movies (empty title clears the list)
  more               load the next page of results
  show <n|imdbID>    open a movie from the last list
  play               play the preview of the open movie
  fav [n|imdbID]     toggle a favorite (no argument: the open movie)
  favs               list favorites
  recent [n]         list recent searches, or search the n-th again
  theme              switch between light and dark
  online | offline   report connectivity
  help | quit
";

/// Long-lived state shared by every screen, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub provider: Arc<dyn OmdbApi>,
    pub favorites: Arc<FavoritesStore>,
    pub recent: Arc<RecentSearches>,
    pub theme: Arc<ThemePreference>,
    pub connectivity: Arc<Connectivity>,
}

impl AppContext {
    /// Loads every persisted value once.
    pub async fn bootstrap(
        config: Config,
        provider: Arc<dyn OmdbApi>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let theme = ThemePreference::load(store.clone(), config.system_theme).await;
        let favorites = FavoritesStore::load(store.clone()).await;
        let recent = RecentSearches::load(store).await;
        Self {
            config,
            provider,
            favorites: Arc::new(favorites),
            recent: Arc::new(recent),
            theme: Arc::new(theme),
            connectivity: Arc::new(Connectivity::default()),
        }
    }

    pub fn search_controller(&self) -> SearchController {
        SearchController::new(
            self.provider.clone(),
            self.recent.clone(),
            self.connectivity.subscribe(),
            self.config.debounce,
        )
    }

    pub fn detail_loader(&self) -> DetailLoader {
        DetailLoader::new(self.provider.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// 1-based position in the last rendered list.
    Index(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    More,
    Show(Target),
    Play,
    Favorite(Option<Target>),
    Favorites,
    Recent(Option<usize>),
    ToggleTheme,
    Online,
    Offline,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (head, rest) = match s.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (s, ""),
        };
        let command = match head.to_lowercase().as_str() {
            "search" | "s" => Command::Search(rest.to_string()),
            "more" | "m" => Command::More,
            "show" | "open" => Command::Show(parse_target(rest)?),
            "play" => Command::Play,
            "fav" | "f" => {
                if rest.is_empty() {
                    Command::Favorite(None)
                } else {
                    Command::Favorite(Some(parse_target(rest)?))
                }
            }
            "favs" | "favorites" => Command::Favorites,
            "recent" | "r" => {
                if rest.is_empty() {
                    Command::Recent(None)
                } else {
                    let n = rest
                        .parse::<usize>()
                        .with_context(|| format!("'{}' is not a number", rest))?;
                    Command::Recent(Some(n))
                }
            }
            "theme" | "t" => Command::ToggleTheme,
            "online" => Command::Online,
            "offline" => Command::Offline,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => bail!("Unknown command '{}' (try 'help')", head),
        };
        Ok(command)
    }
}

fn parse_target(raw: &str) -> Result<Target> {
    if raw.is_empty() {
        bail!("Expected a result number or an IMDb id");
    }
    if let Ok(n) = raw.parse::<usize>() {
        if n == 0 {
            bail!("Result numbers start at 1");
        }
        return Ok(Target::Index(n));
    }
    if let Some(id) = omdb::parse_imdb_id(raw) {
        return Ok(Target::Id(id));
    }
    bail!("'{}' is neither a result number nor an IMDb id", raw)
}

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    let provider: Arc<dyn OmdbApi> = Arc::new(OmdbClient::from_config(&config)?);
    info!("Using data directory {}", config.data_dir.display());
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(config.data_dir.clone()));
    let ctx = AppContext::bootstrap(config, provider, store).await;

    let input = BufReader::new(tokio::io::stdin());
    tokio::select! {
        res = run_cli(&ctx, input, tokio::io::stdout()) => res,
        _ = shutdown_signal() => Ok(()),
    }
}

/// Reads commands line by line and re-renders the result list whenever the
/// search session changes. Returns on `quit` or end of input.
pub async fn run_cli<R, W>(ctx: &AppContext, input: R, output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut controller = ctx.search_controller();
    let mut session_rx = controller.subscribe();
    let mut repl = Repl {
        ctx,
        detail: ctx.detail_loader(),
        shown: Vec::new(),
        open: None,
        out: output,
    };
    let mut lines = input.lines();

    repl.header().await?;
    let recent = ctx.recent.list().await;
    repl.emit(&view::render_recent(&recent)).await?;
    if !ctx.config.initial_query.trim().is_empty() {
        controller.set_query(&ctx.config.initial_query);
    }

    loop {
        tokio::select! {
            changed = session_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = session_rx.borrow_and_update().clone();
                if session.loading {
                    repl.emit(&format!("Searching '{}' (page {})...\n", session.query, session.page)).await?;
                    continue;
                }
                let ids = ctx.favorites.ids().await;
                repl.emit(&view::render_results(&session, &ids)).await?;
                repl.shown = session.results;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => repl.handle(command, &mut controller).await?,
                    Err(e) => repl.emit(&format!("{e:#}\n")).await?,
                }
            }
        }
    }
    repl.out.flush().await.context("Failed to flush output")?;
    Ok(())
}

struct Repl<'a, W> {
    ctx: &'a AppContext,
    detail: DetailLoader,
    /// Last list rendered, for resolving `show 3`-style targets.
    shown: Vec<Movie>,
    open: Option<MovieDetail>,
    out: W,
}

impl<W: AsyncWrite + Unpin> Repl<'_, W> {
    async fn emit(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.out
            .write_all(text.as_bytes())
            .await
            .context("Failed to write output")?;
        self.out.flush().await.context("Failed to flush output")
    }

    async fn header(&mut self) -> Result<()> {
        let theme = self.ctx.theme.current().await;
        let connected = self.ctx.connectivity.is_connected();
        self.emit(&view::render_header(theme, connected)).await
    }

    async fn handle(&mut self, command: Command, controller: &mut SearchController) -> Result<()> {
        match command {
            Command::Search(text) => controller.set_query(&text),
            Command::More => {
                let session = controller.session();
                if !session.has_more {
                    self.emit("No more results.\n").await?;
                } else if !self.ctx.connectivity.is_connected() {
                    self.emit("Offline, cannot load more.\n").await?;
                } else {
                    controller.load_more().await;
                }
            }
            Command::Show(target) => {
                let Some(id) = self.resolve_id(&target) else {
                    return self.emit("No such result.\n").await;
                };
                self.emit(&view::render_detail(&DetailState::Loading, false))
                    .await?;
                let state = self.detail.load(&id).await;
                self.open = state.detail().cloned();
                let favorite = self.ctx.favorites.is_favorite(&id).await;
                self.emit(&view::render_detail(&state, favorite)).await?;
            }
            Command::Play => match &self.open {
                Some(detail) => {
                    let msg = format!("Playing preview for {}: {}\n", detail.title, PREVIEW_CLIP_URL);
                    self.emit(&msg).await?;
                }
                None => self.emit("Open a movie first ('show <n>').\n").await?,
            },
            Command::Favorite(target) => {
                let Some(movie) = self.resolve_movie(target.as_ref()).await else {
                    return self.emit("Nothing to favorite.\n").await;
                };
                let title = movie.title.clone();
                let msg = if self.ctx.favorites.toggle(movie).await {
                    format!("Added '{title}' to favorites.\n")
                } else {
                    format!("Removed '{title}' from favorites.\n")
                };
                self.emit(&msg).await?;
            }
            Command::Favorites => {
                let favorites = self.ctx.favorites.list().await;
                self.emit(&view::render_favorites(&favorites)).await?;
                self.shown = favorites;
            }
            Command::Recent(None) => {
                let recent = self.ctx.recent.list().await;
                if recent.is_empty() {
                    self.emit("No recent searches.\n").await?;
                } else {
                    self.emit(&view::render_recent(&recent)).await?;
                }
            }
            Command::Recent(Some(n)) => {
                let recent = self.ctx.recent.list().await;
                match n.checked_sub(1).and_then(|i| recent.get(i)) {
                    Some(term) => controller.set_query(term),
                    None => self.emit("No such recent search.\n").await?,
                }
            }
            Command::ToggleTheme => {
                self.ctx.theme.toggle().await;
                self.header().await?;
            }
            Command::Online => {
                self.ctx.connectivity.set(true);
                self.header().await?;
            }
            Command::Offline => {
                self.ctx.connectivity.set(false);
                self.header().await?;
            }
            Command::Help => self.emit(HELP).await?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn nth_shown(&self, n: usize) -> Option<&Movie> {
        n.checked_sub(1).and_then(|i| self.shown.get(i))
    }

    fn resolve_id(&self, target: &Target) -> Option<String> {
        match target {
            Target::Index(n) => self.nth_shown(*n).map(|m| m.id.clone()),
            Target::Id(id) => Some(id.clone()),
        }
    }

    async fn resolve_movie(&self, target: Option<&Target>) -> Option<Movie> {
        let id = match target {
            None => return self.open.as_ref().map(MovieDetail::as_movie),
            Some(Target::Index(n)) => return self.nth_shown(*n).cloned(),
            Some(Target::Id(id)) => id,
        };
        if let Some(movie) = self.shown.iter().find(|m| &m.id == id) {
            return Some(movie.clone());
        }
        if let Some(detail) = self.open.as_ref().filter(|d| &d.id == id) {
            return Some(detail.as_movie());
        }
        if let Some(movie) = self
            .ctx
            .favorites
            .list()
            .await
            .into_iter()
            .find(|m| &m.id == id)
        {
            return Some(movie);
        }
        match self.ctx.provider.fetch_details(id).await {
            Ok(detail) if detail.found => Some(detail.as_movie()),
            Ok(_) => None,
            Err(e) => {
                warn!("Could not look up {}: {:#}", id, e);
                None
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
