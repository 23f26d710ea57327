//! Flag parsing, bootstrap, and the interactive prompt loop.

use crate::actions;
use crate::client::{ClientOptions, HttpMethod, SearxngClient};
use crate::command::{self, ActionTarget, Command, SessionEffect};
use crate::config;
use crate::logging;
use crate::query::{Category, QueryContext, SafeSearch, SetEdit, TimeRange};
use crate::render;
use crate::session::{DisplayFlags, Session};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::time::Duration;

/// Perform a search using SearXNG
#[derive(Debug, Parser)]
#[command(
    name = "searxngr",
    version,
    disable_version_flag = true,
    about = "Search a SearXNG instance from the terminal"
)]
pub struct Args {
    /// Search query
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Show program's version number and exit
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// SearXNG instance URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    pub searxng_url: Option<String>,

    /// Categories to search in
    #[arg(short = 'c', long = "categories", value_name = "CATEGORY", num_args = 1..)]
    pub categories: Option<Vec<String>>,

    /// Engines to use for the search (default: all available engines)
    #[arg(short = 'e', long = "engines", value_name = "ENGINE", num_args = 1..)]
    pub engines: Option<Vec<String>>,

    /// Show N results per page; 0 uses the server's default
    #[arg(short = 'n', long = "num", value_name = "N")]
    pub num: Option<usize>,

    /// Safe search filter: none, moderate, or strict
    #[arg(long, value_name = "FILTER")]
    pub safe_search: Option<String>,

    /// Allow unsafe results (same as --safe-search none)
    #[arg(long = "unsafe")]
    pub unsafe_results: bool,

    /// Search results within a time range: day, week, month, or year
    #[arg(short = 't', long, value_name = "TIME_RANGE")]
    pub time_range: Option<String>,

    /// Search a site using the site: operator
    #[arg(short = 'w', long, value_name = "SITE")]
    pub site: Option<String>,

    /// Search results in a specific language (e.g. 'en', 'de', 'fr')
    #[arg(short = 'l', long, value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// Show complete urls in search results
    #[arg(short = 'x', long)]
    pub expand: bool,

    /// Show debug output
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// HTTP method for search requests: GET or POST
    #[arg(long, value_name = "METHOD")]
    pub http_method: Option<String>,

    /// Do not verify SSL certificates (not recommended)
    #[arg(long)]
    pub no_verify_ssl: bool,

    /// Disable the User-Agent header
    #[arg(long)]
    pub noua: bool,

    /// Just search and exit, do not prompt
    #[arg(long = "np", alias = "no-prompt")]
    pub no_prompt: bool,

    /// Open the first result in the browser and exit
    #[arg(long)]
    pub first: bool,

    /// Open a random result in the browser and exit
    #[arg(long)]
    pub lucky: bool,

    /// Command used to open URLs in the browser
    #[arg(long, value_name = "UTIL")]
    pub url_handler: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List the instance's engines and exit
    #[arg(long)]
    pub list_engines: bool,

    /// Show results from the news section
    #[arg(short = 'N', long)]
    pub news: bool,

    /// Show results from the videos section
    #[arg(short = 'V', long)]
    pub videos: bool,

    /// Show results from the music section
    #[arg(short = 'M', long)]
    pub music: bool,

    /// Show results from the files section
    #[arg(short = 'F', long)]
    pub files: bool,

    /// Show results from the social media section
    #[arg(short = 'S', long)]
    pub social: bool,
}

pub async fn run() -> Result<()> {
    let args = Args::parse();
    let settings = config::load_or_create_settings()?;

    let debug = args.debug || settings.debug;
    let _log_guard = logging::init(debug)?;

    let base_url = args
        .searxng_url
        .clone()
        .or_else(|| settings.searxng_url.clone())
        .with_context(|| {
            let path = config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the config file".to_string());
            format!("searxng_url is not set; add it to {path} or pass --searxng-url")
        })?;

    let http_method: HttpMethod = args
        .http_method
        .as_deref()
        .unwrap_or(&settings.http_method)
        .parse()?;

    let mut options = ClientOptions {
        timeout: Duration::from_secs(settings.timeout_secs),
        verify_ssl: !(args.no_verify_ssl || settings.no_verify_ssl),
        username: settings.username.clone(),
        password: settings.password.clone(),
        http_method,
        ..ClientOptions::default()
    };
    if args.noua || settings.no_user_agent {
        options.user_agent = None;
    }

    let client = SearxngClient::new(&base_url, options)?;

    if args.list_engines {
        let engines = client.fetch_engines().await?;
        render::engine_table(&engines);
        return Ok(());
    }

    if args.query.is_empty() {
        Args::command().print_help()?;
        return Ok(());
    }

    let flags = DisplayFlags {
        expand: args.expand || settings.expand,
        color: !(args.no_color || settings.no_color),
        debug,
    };
    render::set_color(flags.color);

    let context = build_context(&args, &settings)?;
    let url_handler = args
        .url_handler
        .clone()
        .or_else(|| settings.url_handler.clone())
        .unwrap_or_else(|| actions::default_url_handler().to_string());

    let mut session = Session::new(Box::new(client));
    session.bootstrap(context, flags)?;
    let mut rng = rand::thread_rng();

    // One-shot open modes skip rendering entirely.
    if args.first || args.lucky {
        session.search().await?;
        let target = if args.first {
            ActionTarget::First
        } else {
            ActionTarget::Random
        };
        let effect = command::apply(&mut session, Command::Open(target), &mut rng)?;
        if let SessionEffect::OpenUrl(url) = effect {
            actions::open_url(&url_handler, &url)?;
        }
        return Ok(());
    }

    match session.search().await {
        Ok(()) => render_current(&session),
        Err(e) => render::error(&e),
    }

    if args.no_prompt {
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        write!(
            stdout,
            "{} {} ",
            "searxngr".bold(),
            "(? for help)".dimmed()
        )?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // End of input closes the session like an explicit quit.
            session.close();
            break;
        }
        session.push_history(&line);

        let command = match command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                render::error(&e);
                continue;
            }
        };

        let effect = match command::apply(&mut session, command, &mut rng) {
            Ok(effect) => effect,
            Err(e) => {
                render::error(&e);
                continue;
            }
        };

        match effect {
            SessionEffect::Requery => match session.search().await {
                Ok(()) => render_current(&session),
                Err(e) => render::error(&e),
            },
            SessionEffect::Page(direction) => match session.turn_page(direction).await {
                Ok(()) => render_current(&session),
                Err(e) => render::error(&e),
            },
            SessionEffect::Redisplay => {
                render::set_color(session.flags().color);
                if let Some(page) = session.page() {
                    render::page(page, session.flags());
                }
            }
            SessionEffect::ShowSettings => {
                if let Some(context) = session.context() {
                    render::settings(context, session.flags());
                }
            }
            SessionEffect::ShowRaw(index) => match session.result_at(index) {
                Ok(result) => render::raw(result),
                Err(e) => render::error(&e),
            },
            SessionEffect::ShowHelp => render::help(),
            SessionEffect::OpenUrl(url) => {
                if let Err(e) = actions::open_url(&url_handler, &url) {
                    render::warn(&e.to_string());
                }
            }
            SessionEffect::CopyText(text) => match actions::copy_to_clipboard(&text) {
                Ok(()) => render::notice("copied to clipboard"),
                Err(e) => render::warn(&e.to_string()),
            },
            SessionEffect::Exit => break,
        }
    }

    Ok(())
}

/// Merge config defaults, flags, and category shortcuts into the
/// initial context. Explicitly-given invalid values fail loudly.
fn build_context(args: &Args, settings: &config::Settings) -> Result<QueryContext> {
    let mut context = QueryContext::new(args.query.join(" "))?;

    let mut categories = Vec::new();
    let tokens = args
        .categories
        .clone()
        .unwrap_or_else(|| settings.categories.clone());
    for token in &tokens {
        categories.push(token.parse::<Category>()?);
    }
    // Shortcut flags add their category to the set, they never replace it.
    for (enabled, category) in [
        (args.news, Category::News),
        (args.videos, Category::Videos),
        (args.music, Category::Music),
        (args.files, Category::Files),
        (args.social, Category::SocialMedia),
    ] {
        if enabled {
            categories.push(category);
        }
    }
    context.apply_categories(&SetEdit::Replace(categories));

    let engines = args
        .engines
        .clone()
        .unwrap_or_else(|| settings.engines.clone());
    context.apply_engines(&SetEdit::Replace(engines));

    let safe_search: SafeSearch = if args.unsafe_results {
        SafeSearch::None
    } else {
        args.safe_search
            .as_deref()
            .unwrap_or(&settings.safe_search)
            .parse()?
    };
    context.set_safe_search(safe_search);

    if let Some(token) = &args.time_range {
        context.set_time_range(TimeRange::parse_token(token)?);
    }
    context.set_site(args.site.clone())?;
    context.set_language(args.language.clone().or_else(|| settings.language.clone()));

    let page_size = if args.first { 1 } else { args.num.unwrap_or(settings.result_count) };
    context.set_page_size(page_size);

    Ok(context)
}

fn render_current(session: &Session) {
    let flags = session.flags();
    if let Some(page) = session.page() {
        if flags.debug {
            if let Some(context) = session.context() {
                render::debug_line(context, page.len());
            }
        }
        render::page(page, flags);
    }
}
