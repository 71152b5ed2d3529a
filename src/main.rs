use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use multinetics_search::config::{
    default_config_path, find_config_file, load_config, Config, LogFormat, LoggingConfig,
};
use multinetics_search::engine::insights::{
    stats, suggestions, topic_keywords, DEFAULT_SUGGESTIONS, DEFAULT_TOPICS,
};
use multinetics_search::engine::{Corpus, FilterValue, QueryPipeline};
use multinetics_search::loader::load_corpus;
use multinetics_search::models::ResultSet;
use multinetics_search::ui::{self, Status};
use multinetics_search::utils::{is_terminal, terminal_width};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Multinetics Search - Search and filter the journal's article catalog
#[derive(Parser, Debug)]
#[command(name = "multinetics-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Search and filter a journal's article catalog", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Articles data file (overrides the configured path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the catalog
    #[command(alias = "s")]
    Search {
        /// Search text (matched case-insensitively against title, abstract, keywords and authors)
        query: String,

        /// Filter as KEY=VALUE, e.g. volume=9 (repeatable; VALUE "none" clears)
        #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
        filters: Vec<FilterArg>,

        /// Maximum number of results to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Show matched text with highlights
        #[arg(long)]
        highlight: bool,
    },

    /// Show one article in full
    Show {
        /// Article id
        id: String,
    },

    /// List the selectable values for each filter
    Filters,

    /// Catalog statistics
    Stats,

    /// Suggest search keywords
    Suggest {
        /// Number of keywords
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Show topic keywords with their counts
        #[arg(long)]
        topics: bool,
    },

    /// Read queries from stdin, one per line, with live filtering
    #[command(alias = "i")]
    Interactive,

    /// Print the effective configuration
    Config {
        /// Write the default configuration file instead
        #[arg(long)]
        init: bool,
    },
}

/// A `--filter KEY=VALUE` argument
#[derive(Debug, Clone, PartialEq)]
struct FilterArg {
    key: String,
    value: Option<FilterValue>,
}

fn parse_filter(raw: &str) -> Result<FilterArg, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter key in '{}'", raw));
    }

    Ok(FilterArg {
        key: key.to_string(),
        value: parse_filter_value(value),
    })
}

fn parse_filter_value(raw: &str) -> Option<FilterValue> {
    match raw.trim() {
        "" | "none" | "all" => None,
        value => Some(FilterValue::parse(value)),
    }
}

/// One line of interactive input
#[derive(Debug, PartialEq)]
enum Input {
    Query(String),
    Filter { key: String, value: Option<FilterValue> },
    Reset,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("filter" | "f") => match (parts.next(), parts.next()) {
            (Some(key), value) => Input::Filter {
                key: key.to_string(),
                value: value.and_then(parse_filter_value),
            },
            (None, _) => Input::Unknown(line.trim().to_string()),
        },
        Some("reset" | "r") => Input::Reset,
        Some("help" | "h" | "?") => Input::Help,
        Some("quit" | "q" | "exit") => Input::Quit,
        _ => Input::Unknown(line.trim().to_string()),
    }
}

const INTERACTIVE_HELP: &str = "\
Type to search. Commands:
  :filter KEY VALUE   constrain a filter (VALUE 'none' clears it)
  :reset              clear all filters
  :quit               exit";

fn init_tracing(cli: &Cli, logging: &LoggingConfig) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => logging.level.as_str(),
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("multinetics_search={}", level)),
    );
    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_results(
    results: &ResultSet,
    format: OutputFormat,
    highlight: bool,
    quiet: bool,
) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    let color = format == OutputFormat::Table && is_terminal();
    if !quiet || results.is_empty() {
        let status = if results.is_empty() { Status::Warning } else { Status::Search };
        println!("{}", ui::status_line(status, &ui::results_summary(results), color));
    }
    if results.is_empty() {
        return Ok(());
    }

    let width = terminal_width();
    match format {
        OutputFormat::Table if !highlight => {
            println!("{}", ui::format_results_table(results, width))
        }
        _ => print!("{}", ui::format_results_cards(results, width, highlight, color)),
    }
    Ok(())
}

fn build_pipeline(corpus: Corpus, config: &Config) -> QueryPipeline {
    QueryPipeline::new(corpus, config.search.matcher(), config.filters.filter_set())
        .with_debounce(config.search.debounce())
}

async fn run_interactive(pipeline: QueryPipeline, format: OutputFormat, quiet: bool) -> Result<()> {
    let color = format == OutputFormat::Table && is_terminal();
    pipeline.subscribe(move |results: &ResultSet| {
        let printed = if format == OutputFormat::Json {
            serde_json::to_string(results)
                .map(|line| println!("{}", line))
                .map_err(anyhow::Error::from)
        } else {
            print_results(results, format, true, quiet)
        };
        if let Err(e) = printed {
            tracing::error!("Failed to print results: {}", e);
        }
    });

    if !quiet && format != OutputFormat::Json {
        eprintln!("{}", ui::status_line(Status::Info, INTERACTIVE_HELP, color));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match parse_input(&line) {
            Input::Query(query) => pipeline.set_query(query),
            Input::Filter { key, value } => {
                if let Err(e) = pipeline.set_filter(&key, value) {
                    eprintln!("{}", ui::status_line(Status::Error, &e.to_string(), color));
                }
            }
            Input::Reset => pipeline.reset_filters(),
            Input::Help => eprintln!("{}", INTERACTIVE_HELP),
            Input::Quit => break,
            Input::Unknown(command) => eprintln!(
                "{}",
                ui::status_line(Status::Warning, &format!("Unknown command: {}", command), color)
            ),
        }
    }

    pipeline.flush();
    tracing::debug!(searches = pipeline.search_count(), "interactive session ended");
    Ok(())
}

fn write_default_config(path: Option<PathBuf>) -> Result<()> {
    let path = path
        .or_else(default_config_path)
        .context("Could not determine a config directory; pass --config")?;
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }

    Config::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = match &cli.command {
        // --init may point --config at a file that does not exist yet
        Some(Commands::Config { init: true }) => Config::default(),
        _ => load_config(config_path.as_deref()).context("Failed to load configuration")?,
    };
    if let Some(data) = &cli.data {
        config.data.path = data.clone();
    }

    init_tracing(&cli, &config.logging);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    let format = cli.output.resolve();
    let color = format == OutputFormat::Table && is_terminal();

    if let Commands::Config { init } = command {
        if init {
            return write_default_config(cli.config);
        }
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let corpus = load_corpus(&config.data.path)
        .with_context(|| format!("Failed to load articles from {}", config.data.path.display()))?;

    if corpus.is_empty() && !matches!(command, Commands::Interactive) {
        println!("{}", ui::status_line(Status::Warning, ui::NO_DATA_MESSAGE, color));
        return Ok(());
    }

    match command {
        Commands::Search {
            query,
            filters,
            limit,
            highlight,
        } => {
            let pipeline = build_pipeline(corpus, &config);
            for filter in filters {
                pipeline
                    .set_filter(&filter.key, filter.value)
                    .with_context(|| format!("Invalid filter '{}'", filter.key))?;
            }
            pipeline.set_query(query);
            pipeline.flush();

            let mut results = (*pipeline.get_results()).clone();
            if let Some(limit) = limit {
                results.results.truncate(limit);
            }
            print_results(&results, format, highlight, cli.quiet)?;
        }

        Commands::Show { id } => {
            let Some(record) = corpus.get(&id) else {
                bail!("No article with id '{}'", id);
            };
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
                _ => {
                    print!("{}", ui::format_record(record, color));
                    if !cli.quiet {
                        if let Some(position) = corpus.position(&id) {
                            let msg = format!("Article {} of {}", position + 1, corpus.len());
                            eprintln!("{}", ui::status_line(Status::Info, &msg, color));
                        }
                    }
                }
            }
        }

        Commands::Filters => {
            let filters = config.filters.filter_set();
            match format {
                OutputFormat::Json => {
                    let options: serde_json::Map<String, serde_json::Value> = filters
                        .keys()
                        .map(|key| (key.name().to_string(), filters.options(key, &corpus).into()))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&options)?);
                }
                _ => print!("{}", ui::format_filter_options(&filters, &corpus, color)),
            }
        }

        Commands::Stats => {
            let stats = stats(&corpus);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                _ => print!("{}", ui::format_stats(&stats, color)),
            }
        }

        Commands::Suggest { limit, topics } => {
            if topics {
                let topics = topic_keywords(&corpus, limit.unwrap_or(DEFAULT_TOPICS));
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&topics)?),
                    _ => print!("{}", ui::format_topics(&topics)),
                }
            } else {
                let keywords = suggestions(&corpus, limit.unwrap_or(DEFAULT_SUGGESTIONS));
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&keywords)?),
                    _ => keywords.iter().for_each(|k| println!("{}", k)),
                }
            }
        }

        Commands::Interactive => {
            let pipeline = build_pipeline(corpus, &config);
            run_interactive(pipeline, format, cli.quiet).await?;
        }

        // Handled before the corpus is loaded.
        Commands::Config { .. } => {}
    }

    Ok(())
}
