//! Quotelab CLI: drive the annotation task engine over a SQLite database.
//!
//! Usage:
//!   quotelab import <article.json> [--db path]
//!   quotelab next [--session uuid] [--admin]
//!   quotelab submit <article> <sentence> --labels 0,1,1 --authors 4

use clap::{Parser, Subcommand};
use quotelab::{
    AnnotationApi, AnnotationEngine, Annotator, ArticleDraft, ArticleId, EngineConfig, OpenStore,
    SessionId, SqliteStore,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "quotelab",
    version,
    about = "Annotation task engine for reported-speech corpora"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Engine configuration (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(clap::Args)]
struct Who {
    /// Annotator session (a fresh one if omitted)
    #[arg(long)]
    session: Option<SessionId>,
    /// Act as an admin
    #[arg(long)]
    admin: bool,
}

impl Who {
    fn annotator(&self) -> Annotator {
        let session = self.session.unwrap_or_default();
        if self.admin {
            Annotator::admin(session)
        } else {
            Annotator::new(session)
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import a tokenized article from a JSON file
    Import {
        path: PathBuf,
        /// Only offer this article to admins
        #[arg(long)]
        admin_only: bool,
    },
    /// List stored articles
    List,
    /// Show the next task for an annotator
    Next {
        #[command(flatten)]
        who: Who,
    },
    /// Load context above a sentence
    Above { article: u64, first_sentence: usize },
    /// Load context below a sentence
    Below { article: u64, last_sentence: usize },
    /// Submit labels for one sentence (empty labels: could not decide)
    Submit {
        article: u64,
        sentence: usize,
        #[arg(long, value_delimiter = ',')]
        labels: Vec<u8>,
        /// Speaker token indices, article coordinates
        #[arg(long, value_delimiter = ',')]
        authors: Vec<usize>,
        #[command(flatten)]
        who: Who,
    },
    /// Show the consensus of a sentence
    Consensus { article: u64, sentence: usize },
    /// Replace an article's confidence values
    Confidence {
        article: u64,
        #[arg(required = true, value_delimiter = ',', allow_negative_numbers = true)]
        values: Vec<i32>,
    },
}

/// Get the default database path (~/.local/share/quotelab/quotelab.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let quotelab_dir = data_dir.join("quotelab");
    std::fs::create_dir_all(&quotelab_dir).ok();
    quotelab_dir.join("quotelab.db")
}

fn open_api(db: Option<PathBuf>, config: Option<PathBuf>) -> Result<AnnotationApi, String> {
    let config = match config {
        Some(path) => EngineConfig::load(&path)
            .map_err(|e| format!("Failed to load config '{}': {}", path.display(), e))?,
        None => EngineConfig::default(),
    };
    let db_path = db.unwrap_or_else(default_db_path);
    let store = SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    let engine = AnnotationEngine::with_config(Arc::new(store), config);
    Ok(AnnotationApi::new(Arc::new(engine)))
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn report<T: Serialize>(result: quotelab::EngineResult<T>) -> i32 {
    match result {
        Ok(value) => print_json(&value),
        Err(e) => {
            eprintln!("Error: {}", e);
            match e.kind() {
                quotelab::ErrorKind::NotFound => 2,
                quotelab::ErrorKind::Validation => 3,
                quotelab::ErrorKind::Storage => 1,
            }
        }
    }
}

fn cmd_import(api: &AnnotationApi, path: &Path, admin_only: bool) -> i32 {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", path.display(), e);
            return 1;
        }
    };
    let mut draft: ArticleDraft = match serde_json::from_str(&text) {
        Ok(draft) => draft,
        Err(e) => {
            eprintln!("Error: '{}' is not an article: {}", path.display(), e);
            return 3;
        }
    };
    draft.admin_only |= admin_only;
    match api.import_article(draft) {
        Ok(id) => {
            println!("Imported article {}", id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            3
        }
    }
}

fn cmd_list(api: &AnnotationApi) -> i32 {
    match api.list_articles() {
        Ok(articles) if articles.is_empty() => {
            println!("No articles imported.");
            0
        }
        Ok(articles) => {
            for info in articles {
                println!("{}", info);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_next(api: &AnnotationApi, who: &Who) -> i32 {
    let annotator = who.annotator();
    match api.next_task(&annotator) {
        Ok(Some(task)) => print_json(&task),
        Ok(None) => {
            println!("No task left for session {}", annotator.session);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let api = match open_api(cli.db, cli.config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Import { path, admin_only } => cmd_import(&api, &path, admin_only),
        Commands::List => cmd_list(&api),
        Commands::Next { who } => cmd_next(&api, &who),
        Commands::Above {
            article,
            first_sentence,
        } => report(api.context_above(ArticleId::new(article), first_sentence)),
        Commands::Below {
            article,
            last_sentence,
        } => report(api.context_below(ArticleId::new(article), last_sentence)),
        Commands::Submit {
            article,
            sentence,
            labels,
            authors,
            who,
        } => report(api.submit_labels(
            ArticleId::new(article),
            sentence,
            labels,
            authors,
            &who.annotator(),
        )),
        Commands::Consensus { article, sentence } => {
            report(api.consensus(ArticleId::new(article), sentence))
        }
        Commands::Confidence { article, values } => {
            report(api.update_confidence(ArticleId::new(article), &values))
        }
    };
    std::process::exit(code);
}
