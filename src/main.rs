use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use readnext::config::Config;
use readnext::corpus::loader::CorpusError;
use readnext::corpus::{Corpus, TitleMatch};
use readnext::pipeline::prepare::{self, MatrixSource, Prepared};

/// readnext: pick an article, see the ones most like it.
///
/// Reads articles from a CSV file (Title and Article columns), compares them
/// with TF-IDF and cosine similarity, and recommends the closest matches.
#[derive(Parser)]
#[command(name = "readnext", version, about)]
struct Cli {
    /// CSV file to read (default: articles.csv or data.csv in --data-dir)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Directory searched for articles.csv / data.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Always recompute the similarity matrix and don't persist it
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse articles interactively
    Browse {
        /// Start at this title (default: the first article)
        title: Option<String>,

        /// Number of recommendations to show
        #[arg(long)]
        k: Option<usize>,

        /// Ignore the cached matrix and rebuild it
        #[arg(long)]
        rebuild: bool,
    },

    /// Show one article and its recommendations
    Show {
        /// Article title (exact, or a unique part of it)
        title: Option<String>,

        /// Select the article by position instead of title
        #[arg(long, conflicts_with = "title")]
        index: Option<usize>,

        /// Number of recommendations to show
        #[arg(long)]
        k: Option<usize>,
    },

    /// Print the similarity ranking for one article
    Similar {
        /// Article title (exact, or a unique part of it)
        title: Option<String>,

        /// Select the article by position instead of title
        #[arg(long, conflicts_with = "title")]
        index: Option<usize>,

        /// Number of entries to print
        #[arg(long)]
        k: Option<usize>,
    },

    /// List every article title
    List {
        /// Also show the start of each article's text
        #[arg(long)]
        preview: bool,
    },

    /// Build the similarity matrix and save it to the cache
    Build {
        /// Rebuild even if the cache matches the data file
        #[arg(long)]
        force: bool,
    },

    /// Delete the cached similarity matrix
    ClearCache,

    /// Show data file and cache status
    Status,
}

fn main() {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("readnext=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        // A missing data file is the one expected failure: show it plainly
        if let Some(CorpusError::DataSourceNotFound { .. }) = e.downcast_ref::<CorpusError>() {
            eprintln!("{} {}", "Error:".red().bold(), e);
            eprintln!("Put articles.csv or data.csv in the data directory, or pass --data <FILE>.");
        } else {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(data) = cli.data {
        config.data_file = Some(data);
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if cli.no_cache {
        config.use_cache = false;
    }

    match cli.command {
        Commands::Browse { title, k, rebuild } => {
            let prepared = prepare::run(&config, rebuild)?;
            report_source(&prepared);
            let snapshot = prepared.index.snapshot();
            let start = match title {
                Some(t) => select(snapshot.corpus(), Some(t.as_str()), None)?,
                None => 0,
            };
            readnext::browse::session::run(&prepared.index, start, k.unwrap_or(config.top_k))?;
        }

        Commands::Show { title, index, k } => {
            let prepared = prepare::run(&config, false)?;
            let snapshot = prepared.index.snapshot();
            let idx = select(snapshot.corpus(), title.as_deref(), index)?;
            let recommendations = snapshot.top_similar(idx, k.unwrap_or(config.top_k))?;
            readnext::output::terminal::display_article(snapshot.corpus(), idx, &recommendations);
        }

        Commands::Similar { title, index, k } => {
            let prepared = prepare::run(&config, false)?;
            let snapshot = prepared.index.snapshot();
            let idx = select(snapshot.corpus(), title.as_deref(), index)?;
            let ranking = snapshot.top_similar(idx, k.unwrap_or(config.top_k))?;
            readnext::output::terminal::display_ranking(snapshot.corpus(), idx, &ranking);
        }

        Commands::List { preview } => {
            let path = readnext::corpus::loader::resolve(
                config.data_file.as_deref(),
                &config.data_dir,
            )?;
            let loaded = readnext::corpus::loader::load(&path)?;
            readnext::output::terminal::display_titles(&loaded.corpus, preview);
        }

        Commands::Build { force } => {
            if !config.use_cache {
                println!(
                    "{}",
                    "Note: caching is disabled, the matrix will not be saved.".yellow()
                );
            }
            let prepared = prepare::run(&config, force)?;
            report_source(&prepared);
            println!("\n{}", "Similarity matrix ready.".bold());
            println!("  Articles: {}", prepared.index.snapshot().corpus().len());
            if config.use_cache {
                println!("  Cache: {}", config.db_path);
            }
        }

        Commands::ClearCache => {
            let removed = match readnext::db::open_existing(&config.db_path)? {
                Some(conn) => readnext::db::queries::clear_cache(&conn)
                    .with_context(|| format!("Cache at {} is unreadable", config.db_path))?,
                None => false,
            };
            if removed {
                info!(path = %config.db_path, "Cleared similarity cache");
                println!("Cached similarity matrix removed.");
            } else {
                println!("Nothing cached at {}.", config.db_path);
            }
        }

        Commands::Status => {
            readnext::status::show(&config)?;
        }
    }

    Ok(())
}

/// Pick a document by position or title. Neither selects the first article.
fn select(corpus: &Corpus, title: Option<&str>, index: Option<usize>) -> Result<usize> {
    if let Some(idx) = index {
        if idx >= corpus.len() {
            anyhow::bail!(
                "No article at index {idx} (the corpus has {} articles)",
                corpus.len()
            );
        }
        return Ok(idx);
    }

    let Some(title) = title else {
        return Ok(0);
    };

    match corpus.find_title(title) {
        TitleMatch::Found(idx) => Ok(idx),
        TitleMatch::Ambiguous(hits) => {
            let titles: Vec<&str> = hits
                .iter()
                .filter_map(|&i| corpus.get(i).map(|d| d.title.as_str()))
                .collect();
            anyhow::bail!(
                "\"{title}\" matches {} articles: {}",
                hits.len(),
                titles.join(" | ")
            )
        }
        TitleMatch::NotFound => {
            anyhow::bail!("No article titled \"{title}\". Run `readnext list` to see them all.")
        }
    }
}

fn report_source(prepared: &Prepared) {
    let what = match prepared.source {
        MatrixSource::Cache => "cached similarity matrix",
        MatrixSource::Built => "freshly built similarity matrix",
    };
    println!(
        "{}",
        format!(
            "Loaded {} articles from {} ({}), using {}.",
            prepared.index.snapshot().corpus().len(),
            prepared.data_path.display(),
            prepared.encoding,
            what
        )
        .dimmed()
    );
}
