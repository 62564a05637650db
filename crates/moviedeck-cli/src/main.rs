//! moviedeck - movie catalog browser and watchlist CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moviedeck_api::catalog::images::{
    OVERVIEW_EXCERPT_CHARS, backdrop_url, excerpt, poster_url, profile_url,
};
use moviedeck_api::catalog::{
    CatalogClient, CatalogRequest, LocalCatalogApi, MovieCategory, MoviePage, MovieSummary,
    TrailerLookup,
};
use moviedeck_api::fetch::{FetchError, FetchState, ResourceDescriptor, ResourceFetcher};
use moviedeck_api::session::{Session, SessionStatus, SessionStore};
use moviedeck_api::watchlist::{
    CachedWatchlist, LocalWatchlistApi, RemoveOutcome, WatchlistClient, WatchlistEntry,
    WatchlistError,
};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, ENV_CATALOG_API_KEY, resolve_config_path, resolve_session_path};

/// User-Agent sent to both services.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/session directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse the movie catalog.
    Movies(MoviesCommand),
    /// Log in, register or log out.
    Auth(AuthCommand),
    /// Manage your watchlist.
    Watchlist(WatchlistCommand),
}

/// Arguments for the `movies` subcommand.
#[derive(clap::Args)]
struct MoviesCommand {
    /// Movies subcommand to run.
    #[command(subcommand)]
    command: MoviesSubcommands,
}

/// Available movies subcommands.
#[derive(Subcommand)]
enum MoviesSubcommands {
    /// List movies in a category.
    List(MoviesListArgs),
    /// Show details, cast, trailer and recommendations for a movie.
    Show(MovieIdArgs),
    /// Search movies by title.
    Search(MoviesSearchArgs),
}

/// Arguments for the `movies list` subcommand.
#[derive(clap::Args)]
struct MoviesListArgs {
    /// Category: `now_playing`, `popular`, `top_rated` or `upcoming`.
    #[arg(long, default_value = "now_playing")]
    category: MovieCategory,
    /// Page number (starting at 1).
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `movies search` subcommand.
#[derive(clap::Args)]
struct MoviesSearchArgs {
    /// Search query (e.g. "Heat").
    #[arg(long, required = true)]
    query: String,
}

/// Arguments identifying a movie.
#[derive(clap::Args)]
struct MovieIdArgs {
    /// Catalog movie ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `auth` subcommand.
#[derive(clap::Args)]
struct AuthCommand {
    /// Auth subcommand to run.
    #[command(subcommand)]
    command: AuthSubcommands,
}

/// Available auth subcommands.
#[derive(Subcommand)]
enum AuthSubcommands {
    /// Sign in and store the session.
    Login(CredentialsArgs),
    /// Create an account.
    Register(CredentialsArgs),
    /// Forget the stored session.
    Logout,
    /// Show who is logged in.
    Status,
}

/// Username and password.
#[derive(clap::Args)]
struct CredentialsArgs {
    /// Account name.
    #[arg(long, required = true)]
    username: String,
    /// Account password.
    #[arg(long, required = true)]
    password: String,
}

/// Arguments for the `watchlist` subcommand.
#[derive(clap::Args)]
struct WatchlistCommand {
    /// Watchlist subcommand to run.
    #[command(subcommand)]
    command: WatchlistSubcommands,
}

/// Available watchlist subcommands.
#[derive(Subcommand)]
enum WatchlistSubcommands {
    /// Show saved movies.
    List,
    /// Save a movie.
    Add(MovieIdArgs),
    /// Remove a saved movie.
    Remove(MovieIdArgs),
}

/// Loads `config.toml` and applies environment overrides.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    Ok(config.with_env(|key| std::env::var(key).ok()))
}

/// Opens the persisted session store.
///
/// # Errors
///
/// Returns an error if the session path cannot be resolved.
fn open_session(dir: Option<&PathBuf>) -> Result<SessionStore> {
    let path = resolve_session_path(dir).context("failed to resolve session path")?;
    Ok(SessionStore::open(path))
}

/// Builds a catalog client. A missing API key is reported when a read is attempted.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the client fails to build.
#[instrument(skip_all)]
fn build_catalog_client(config: &AppConfig) -> Result<CatalogClient> {
    let base_url = Url::parse(&config.catalog.base_url)
        .with_context(|| format!("invalid catalog.base_url: {}", config.catalog.base_url))?;

    let mut builder = CatalogClient::builder()
        .base_url(base_url)
        .user_agent(USER_AGENT)
        .timeout(config.http.timeout());
    if let Some(key) = config.catalog_api_key() {
        builder = builder.api_key(key);
    } else {
        tracing::debug!("{ENV_CATALOG_API_KEY} is not set and catalog.api_key is empty");
    }
    builder.build().context("failed to build catalog client")
}

/// Builds a watchlist client over `session`.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the client fails to build.
#[instrument(skip_all)]
fn build_watchlist_client(config: &AppConfig, session: SessionStore) -> Result<WatchlistClient> {
    let base_url = Url::parse(&config.watchlist.base_url)
        .with_context(|| format!("invalid watchlist.base_url: {}", config.watchlist.base_url))?;

    WatchlistClient::builder()
        .base_url(base_url)
        .user_agent(USER_AGENT)
        .timeout(config.http.timeout())
        .session(session)
        .build()
        .context("failed to build watchlist client")
}

/// Subscribes `fetcher` to `descriptor` and waits for the outcome.
async fn load<P>(
    fetcher: &mut ResourceFetcher<CatalogClient, P>,
    descriptor: ResourceDescriptor,
) -> Result<P, FetchError>
where
    P: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let rx = fetcher.subscribe(Some(descriptor));
    if matches!(*rx.borrow(), FetchState::Loading) {
        tracing::debug!("Loading...");
    }
    fetcher.settled().await.into_result().unwrap_or_else(|| {
        Err(FetchError::InvalidDescriptor(String::from(
            "subscription was detached",
        )))
    })
}

/// Logs one movie row of a listing.
fn log_summary(movie: &MovieSummary) {
    tracing::info!(
        "{}\t{}\t{}\t{:.1}",
        movie.id,
        movie.title,
        movie
            .release_year()
            .map_or_else(|| String::from("-"), |y| y.to_string()),
        movie.vote_average,
    );
    if let Some(overview) = movie.overview.as_deref().filter(|o| !o.is_empty()) {
        tracing::info!("\t{}", excerpt(overview, OVERVIEW_EXCERPT_CHARS));
    }
    tracing::info!("\t{}", poster_url(movie.poster_path.as_deref()));
}

/// Logs a page of results with its totals.
fn log_page(page: &MoviePage) {
    tracing::info!("ID\tTitle\tYear\tRating");
    for movie in &page.results {
        log_summary(movie);
    }
    tracing::info!(
        "Page {} of {} ({} results)",
        page.page,
        page.total_pages,
        page.total_results
    );
}

/// Runs the `movies list` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the listing cannot be loaded.
#[instrument(skip_all)]
async fn run_movies_list(args: &MoviesListArgs, config: &AppConfig) -> Result<()> {
    let client = Arc::new(build_catalog_client(config)?);
    let mut fetcher: ResourceFetcher<_, MoviePage> = ResourceFetcher::new(client);

    let page = load(&mut fetcher, CatalogRequest::listing(args.category, args.page))
        .await
        .with_context(|| format!("failed to load {} movies", args.category.title()))?;

    tracing::info!("{}", args.category.title());
    log_page(&page);
    Ok(())
}

/// Runs the `movies search` subcommand.
///
/// # Errors
///
/// Returns an error if the query is blank or the search fails.
#[instrument(skip_all)]
async fn run_movies_search(args: &MoviesSearchArgs, config: &AppConfig) -> Result<()> {
    let client = Arc::new(build_catalog_client(config)?);
    let mut fetcher: ResourceFetcher<_, MoviePage> = ResourceFetcher::new(client);

    let page = load(&mut fetcher, CatalogRequest::search(&args.query))
        .await
        .context("search failed")?;

    if page.results.is_empty() {
        tracing::info!("No movies found for \"{}\"", args.query.trim());
        return Ok(());
    }
    log_page(&page);
    Ok(())
}

/// Runs the `movies show` subcommand.
///
/// Detail is required; cast, trailer and recommendations are loaded
/// concurrently and reported individually when unavailable.
///
/// # Errors
///
/// Returns an error if the detail record cannot be loaded.
#[instrument(skip_all)]
async fn run_movies_show(args: &MovieIdArgs, config: &AppConfig) -> Result<()> {
    let client = build_catalog_client(config)?;
    let id = args.id;

    let (details, cast, trailer, recommendations) = futures::join!(
        client.movie_details(id),
        client.top_cast(id),
        client.trailer(id),
        client.recommendations(id),
    );
    let details = details.with_context(|| format!("failed to load movie {id}"))?;

    tracing::info!(
        "{} ({})",
        details.title,
        details
            .release_year()
            .map_or_else(|| String::from("-"), |y| y.to_string()),
    );
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        tracing::info!("\"{tagline}\"");
    }
    let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
    tracing::info!(
        "Rating: {:.1}  Runtime: {}  Genres: {}",
        details.vote_average,
        details
            .runtime
            .map_or_else(|| String::from("-"), |m| format!("{m} min")),
        genres.join(", "),
    );
    tracing::info!("{}", details.overview.as_deref().unwrap_or("-"));
    tracing::info!("Poster: {}", poster_url(details.poster_path.as_deref()));
    if let Some(backdrop) = backdrop_url(details.backdrop_path.as_deref()) {
        tracing::info!("Backdrop: {backdrop}");
    }

    match trailer {
        Ok(TrailerLookup::Found(video)) => tracing::info!(
            "Trailer: {} {}",
            video.name,
            video.watch_url().unwrap_or_default()
        ),
        Ok(TrailerLookup::NoTrailer) => tracing::info!("Trailer: not available"),
        Err(e) => tracing::warn!(error = %e, "Trailer unavailable"),
    }

    match cast {
        Ok(cast) => {
            tracing::info!("Top cast:");
            for member in &cast {
                tracing::info!(
                    "  {} as {}\t{}",
                    member.name,
                    member.character.as_deref().unwrap_or("-"),
                    profile_url(member.profile_path.as_deref()),
                );
            }
        }
        Err(e) => tracing::warn!(error = %e, "Cast unavailable"),
    }

    match recommendations {
        Ok(movies) if movies.is_empty() => tracing::info!("No recommendations"),
        Ok(movies) => {
            tracing::info!("Recommendations:");
            for movie in &movies {
                log_summary(movie);
            }
        }
        Err(e) => tracing::warn!(error = %e, "Recommendations unavailable"),
    }

    Ok(())
}

/// Warns when a call ended the session (the `LoggedIn -> LoggedOut` transition).
fn report_session_change(rx: &mut watch::Receiver<Session>) {
    if !rx.has_changed().unwrap_or(false) {
        return;
    }
    if rx.borrow_and_update().status() == SessionStatus::LoggedOut {
        tracing::warn!("Session is no longer valid. Run `moviedeck auth login` to sign in again.");
    }
}

/// Runs the `auth` subcommands.
///
/// # Errors
///
/// Returns an error if login or registration fails.
#[instrument(skip_all)]
async fn run_auth(
    command: &AuthSubcommands,
    config: &AppConfig,
    session: SessionStore,
) -> Result<()> {
    let client = build_watchlist_client(config, session)?;

    match command {
        AuthSubcommands::Login(args) => {
            let session = client
                .login(&args.username, &args.password)
                .await
                .context("login failed")?;
            tracing::info!(
                "Logged in as {}",
                session.username.as_deref().unwrap_or(&args.username)
            );
        }
        AuthSubcommands::Register(args) => {
            client
                .register(&args.username, &args.password)
                .await
                .context("registration failed")?;
            tracing::info!("Account created! Run `moviedeck auth login` to sign in.");
        }
        AuthSubcommands::Logout => {
            client.logout();
            tracing::info!("Logged out");
        }
        AuthSubcommands::Status => match client.session().snapshot().status() {
            SessionStatus::LoggedIn { username } => {
                tracing::info!("Logged in as {}", username.as_deref().unwrap_or("-"));
            }
            SessionStatus::LoggedOut => tracing::info!("Not logged in"),
        },
    }
    Ok(())
}

/// Runs the `watchlist list` subcommand.
///
/// # Errors
///
/// Returns an error if the watchlist cannot be loaded.
#[instrument(skip_all)]
async fn run_watchlist_list(cached: &mut CachedWatchlist<WatchlistClient>) -> Result<()> {
    let entries = cached.refresh().await.context("failed to load watchlist")?;

    if entries.is_empty() {
        tracing::info!("Your watchlist is empty.");
        return Ok(());
    }
    tracing::info!("ID\tTitle\tRating\tPoster");
    for entry in entries {
        tracing::info!(
            "{}\t{}\t{:.1}\t{}",
            entry.movie_id,
            entry.title,
            entry.vote_average,
            poster_url(entry.poster_path.as_deref()),
        );
    }
    tracing::info!("Total: {} movies", entries.len());
    Ok(())
}

/// Runs the `watchlist add` subcommand.
///
/// Looks up the detail record first so the saved entry carries title,
/// poster and rating.
///
/// # Errors
///
/// Returns an error if no session is stored, the movie cannot be loaded, or
/// the backend rejects the entry.
#[instrument(skip_all)]
async fn run_watchlist_add(
    args: &MovieIdArgs,
    config: &AppConfig,
    cached: &mut CachedWatchlist<WatchlistClient>,
) -> Result<()> {
    if !cached.client().session().is_logged_in() {
        return Err(WatchlistError::Unauthenticated).context("cannot add to watchlist");
    }

    let catalog = build_catalog_client(config)?;
    let details = catalog
        .movie_details(args.id)
        .await
        .with_context(|| format!("failed to load movie {}", args.id))?;
    let entry = WatchlistEntry::from(&details);

    match cached.add(&entry).await {
        Ok(()) => tracing::info!("Added \"{}\" to your watchlist", entry.title),
        Err(WatchlistError::AlreadyExists) => {
            tracing::warn!("\"{}\" is already in your watchlist", entry.title);
        }
        Err(e) => return Err(e).context("cannot add to watchlist"),
    }
    Ok(())
}

/// Runs the `watchlist remove` subcommand.
///
/// # Errors
///
/// Returns an error if the backend call fails.
#[instrument(skip_all)]
async fn run_watchlist_remove(
    args: &MovieIdArgs,
    cached: &mut CachedWatchlist<WatchlistClient>,
) -> Result<()> {
    let outcome = cached
        .remove(args.id)
        .await
        .with_context(|| format!("failed to remove movie {}", args.id))?;

    match outcome {
        RemoveOutcome::Removed { status } => {
            tracing::info!("Removed movie {} (HTTP {status})", args.id);
        }
        RemoveOutcome::NotPresent { status } => {
            tracing::warn!("Movie {} was not in your watchlist (HTTP {status})", args.id);
        }
    }
    Ok(())
}

/// Runs the `watchlist` subcommands.
///
/// # Errors
///
/// Returns an error if the selected subcommand fails.
async fn run_watchlist(
    command: &WatchlistSubcommands,
    config: &AppConfig,
    session: SessionStore,
) -> Result<()> {
    let mut session_rx = session.watch();
    let mut cached = CachedWatchlist::new(build_watchlist_client(config, session)?);

    let result = match command {
        WatchlistSubcommands::List => run_watchlist_list(&mut cached).await,
        WatchlistSubcommands::Add(args) => run_watchlist_add(args, config, &mut cached).await,
        WatchlistSubcommands::Remove(args) => run_watchlist_remove(args, &mut cached).await,
    };
    report_session_change(&mut session_rx);
    result
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let config = load_config(cli.dir.as_ref())?;
    match cli.command {
        Commands::Movies(movies) => match movies.command {
            MoviesSubcommands::List(args) => run_movies_list(&args, &config).await,
            MoviesSubcommands::Show(args) => run_movies_show(&args, &config).await,
            MoviesSubcommands::Search(args) => run_movies_search(&args, &config).await,
        },
        Commands::Auth(auth) => {
            let session = open_session(cli.dir.as_ref())?;
            run_auth(&auth.command, &config, session).await
        }
        Commands::Watchlist(watchlist) => {
            let session = open_session(cli.dir.as_ref())?;
            run_watchlist(&watchlist.command, &config, session).await
        }
    }
}
