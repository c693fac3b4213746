//! Douban Lookup
//!
//! Manual catalog lookups from the command line. Prints JSON on stdout and
//! logs on stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use douban_meta::{
    ClientConfig, DoubanClient, EpisodeSubject, IMDB_ID, LookupQuery, MovieSubject, PERSONAGE_ID, PROVIDER_ID,
    SeasonOutcome, TitleResolver,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Default config file location
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("douban-lookup").join("config.toml"))
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "douban-lookup")]
#[command(about = "Resolve movies, series, episodes and people against Douban")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (TOML)
    #[arg(short, long, env = "DOUBAN_LOOKUP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Session cookie
    #[arg(long, env = "DOUBAN_COOKIE", global = true, hide_env_values = true)]
    cookie: Option<String>,

    /// Minimum delay between requests in milliseconds
    #[arg(long, env = "DOUBAN_REQUEST_INTERVAL_MS", global = true)]
    request_interval_ms: Option<u64>,

    /// Request timeout in milliseconds
    #[arg(long, env = "DOUBAN_TIMEOUT_MS", global = true)]
    timeout_ms: Option<u64>,

    /// Image CDN host
    #[arg(long, env = "DOUBAN_CDN_SERVER", global = true)]
    cdn_server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List search results for a title
    Search(TitleArgs),
    /// Fetch the best matching subject
    Subject(TitleArgs),
    /// Resolve one season of a series
    Season {
        /// Season folder or display name
        name: String,
        /// Season number
        #[arg(short, long)]
        index: Option<u32>,
        /// Parent series name
        #[arg(long)]
        series_name: Option<String>,
        /// Parent series Douban id
        #[arg(long)]
        series_id: Option<String>,
        /// Season folder path
        #[arg(long)]
        path: Option<String>,
    },
    /// Resolve one episode
    Episode {
        /// Series or episode display name
        name: String,
        /// Episode number; read from the file name when omitted
        #[arg(short, long)]
        index: Option<u32>,
        /// Season number
        #[arg(short, long)]
        season: Option<u32>,
        /// Season Douban id
        #[arg(long)]
        season_id: Option<String>,
        /// Episode file path
        #[arg(long)]
        path: Option<String>,
    },
    /// List cast and crew of a subject
    Cast(TitleArgs),
    /// List images of a subject
    Images(TitleArgs),
    /// Resolve a person
    Person {
        /// Person name
        name: String,
        /// Personage id
        #[arg(long)]
        personage_id: Option<String>,
        /// Legacy celebrity id
        #[arg(long)]
        celebrity_id: Option<String>,
        /// Print search results instead of the best match
        #[arg(long)]
        search: bool,
    },
}

#[derive(Args)]
struct TitleArgs {
    /// Display name
    name: String,
    /// Entity kind
    #[arg(short, long, value_enum, default_value_t = TitleKind::Movie)]
    kind: TitleKind,
    /// Production year
    #[arg(short, long)]
    year: Option<u16>,
    /// Original-language title
    #[arg(long)]
    original_title: Option<String>,
    /// Douban subject id
    #[arg(long)]
    id: Option<String>,
    /// IMDb id
    #[arg(long)]
    imdb: Option<String>,
    /// Media file or folder path
    #[arg(long)]
    path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TitleKind {
    Movie,
    Series,
}

impl TitleArgs {
    fn query(&self) -> LookupQuery {
        let mut query = match self.kind {
            TitleKind::Movie => LookupQuery::movie(&self.name),
            TitleKind::Series => LookupQuery::series(&self.name),
        };
        if let Some(year) = self.year {
            query = query.with_year(year);
        }
        if let Some(title) = &self.original_title {
            query = query.with_original_title(title);
        }
        if let Some(id) = &self.id {
            query = query.with_provider_id(PROVIDER_ID, id);
        }
        if let Some(imdb) = &self.imdb {
            query = query.with_provider_id(IMDB_ID, imdb);
        }
        if let Some(path) = &self.path {
            query = query.with_path(path);
        }
        query
    }
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum SeasonOutput<'a> {
    Specials { folder: &'a str },
    Matched { subject: &'a MovieSubject },
    NotFound,
}

impl<'a> From<&'a SeasonOutcome> for SeasonOutput<'a> {
    fn from(outcome: &'a SeasonOutcome) -> Self {
        match outcome {
            SeasonOutcome::Specials { folder } => Self::Specials { folder },
            SeasonOutcome::Matched(subject) => Self::Matched { subject },
            SeasonOutcome::NotFound => Self::NotFound,
        }
    }
}

#[derive(Serialize)]
struct EpisodeOutput<'a> {
    provider_id: &'a str,
    index: u32,
    subject: &'a MovieSubject,
    episode: &'a EpisodeSubject,
}

/// Log filter for a `-v` count; `RUST_LOG` wins when set.
fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Reads the config file, if any, and applies flag and environment overrides.
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => match default_config_path().filter(|path| path.is_file()) {
            Some(path) => read_config(&path)?,
            None => ClientConfig::default(),
        },
    };

    if let Some(cookie) = &cli.cookie {
        config = config.with_cookie(cookie);
    }
    if let Some(ms) = cli.request_interval_ms {
        config = config.with_request_interval(Duration::from_millis(ms));
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    if let Some(cdn) = &cli.cdn_server {
        config = config.with_cdn_server(cdn);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<ClientConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: ClientConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

async fn run(command: Commands, resolver: &TitleResolver, token: &CancellationToken) -> Result<()> {
    match command {
        Commands::Search(args) => {
            let results = resolver.search_results(&args.query(), token).await?;
            info!(count = results.len(), "search finished");
            print_json(&results)
        }
        Commands::Subject(args) => {
            let subject = resolver.resolve_subject(&args.query(), token).await?;
            if !subject.is_found() {
                bail!("no subject found for {:?}", args.name);
            }
            print_json(&subject)
        }
        Commands::Season {
            name,
            index,
            series_name,
            series_id,
            path,
        } => {
            let mut query = LookupQuery::season(name, index);
            if let Some(series_name) = series_name {
                query = query.with_series_name(series_name);
            }
            if let Some(id) = series_id {
                query = query.with_series_id(PROVIDER_ID, id);
            }
            if let Some(path) = path {
                query = query.with_path(path);
            }
            let outcome = resolver.resolve_season(&query, token).await?;
            print_json(&SeasonOutput::from(&outcome))
        }
        Commands::Episode {
            name,
            index,
            season,
            season_id,
            path,
        } => {
            let mut query = LookupQuery::episode(&name, index, season);
            if let Some(id) = season_id {
                query = query.with_season_id(PROVIDER_ID, id);
            }
            if let Some(path) = path {
                query = query.with_path(path);
            }
            let Some(resolved) = resolver.resolve_episode(&query, token).await? else {
                bail!("no episode found for {name:?}");
            };
            print_json(&EpisodeOutput {
                provider_id: &resolved.provider_id,
                index: resolved.index,
                subject: &resolved.subject,
                episode: &resolved.episode,
            })
        }
        Commands::Cast(args) => {
            let subject = resolver.resolve_subject(&args.query(), token).await?;
            if !subject.is_found() {
                bail!("no subject found for {:?}", args.name);
            }
            print_json(&resolver.resolve_cast(&subject, token).await?)
        }
        Commands::Images(args) => print_json(&resolver.resolve_images(&args.query(), token).await?),
        Commands::Person {
            name,
            personage_id,
            celebrity_id,
            search,
        } => {
            let mut query = LookupQuery::person(&name);
            if let Some(pid) = personage_id {
                query = query.with_provider_id(PERSONAGE_ID, pid);
            }
            if let Some(cid) = celebrity_id {
                query = query.with_provider_id(PROVIDER_ID, cid);
            }
            if search {
                return print_json(&resolver.search_person_results(&query, token).await?);
            }
            let person = resolver.resolve_person(&query, token).await?;
            if !person.is_found() {
                bail!("no person found for {name:?}");
            }
            print_json(&person)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let client = DoubanClient::new(config).context("failed to build Douban client")?;
    let resolver = TitleResolver::new(Arc::new(client)).context("failed to build resolver")?;

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    run(cli.command, &resolver, &token).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn title_args_build_query() {
        let cli = Cli::try_parse_from([
            "douban-lookup",
            "search",
            "三体",
            "--kind",
            "series",
            "--year",
            "2024",
            "--imdb",
            "tt20242042",
        ])
        .unwrap();

        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        let query = args.query();
        assert_eq!(query.kind_name(), "series");
        assert_eq!(query.year, Some(2024));
        assert_eq!(query.provider_ids.get(IMDB_ID).map(String::as_str), Some("tt20242042"));
    }

    #[test]
    fn verbosity_is_counted() {
        let cli = Cli::try_parse_from(["douban-lookup", "-vv", "person", "张鲁一"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn flags_override_file_config() {
        let dir = std::env::temp_dir().join(format!("douban-lookup-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "request_interval_ms = 5000\ncookie = \"bid=file\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "douban-lookup",
            "--config",
            path.to_str().unwrap(),
            "--cookie",
            "bid=flag",
            "search",
            "三体",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.request_interval_ms, 5000);
        assert_eq!(config.cookie, "bid=flag");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = Cli::try_parse_from(["douban-lookup", "--config", "/nonexistent/douban.toml", "search", "x"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
