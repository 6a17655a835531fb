mod chat;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use songbook_core::{
    Catalogue, CatalogueHandle, CatalogueOptions, DispatcherOptions, GeminiClient,
    PaginationState, SearchDispatcher, SearchMode, SearchOutcome, Songbook,
    DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, DEFAULT_MATCH_CUTOFF,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "songbook", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Folder with song documents (.docx)
    #[arg(long, env = "SONGS_DIR", default_value = "songs")]
    songs_dir: PathBuf,

    /// Folder with chord sheets (.pdf)
    #[arg(long, env = "CHORDS_DIR", default_value = "chords")]
    chords_dir: PathBuf,

    /// Minimum similarity for binding a chord sheet to a song title
    #[arg(long, env = "CHORD_MATCH_CUTOFF", default_value_t = DEFAULT_MATCH_CUTOFF)]
    match_cutoff: f64,

    /// Google AI Studio API key used for semantic search
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    gemini_model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_ENDPOINT", default_value = DEFAULT_GEMINI_ENDPOINT)]
    gemini_endpoint: String,

    /// Seconds to wait for a semantic search answer
    #[arg(long, env = "SEARCH_TIMEOUT_SECS", default_value = "30")]
    search_timeout_secs: u64,

    /// Songs per page when browsing
    #[arg(long, env = "PAGE_SIZE", default_value = "10")]
    page_size: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Load the catalogue and report songs, chord bindings, and skipped files.
    Index {
        /// Print the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the alphabet, the songs for one letter, or every page of titles.
    Browse {
        /// Only list titles starting with this letter.
        #[arg(long)]
        letter: Option<char>,
    },
    /// Search the catalogue once.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Use exact substring search instead of semantic search.
        #[arg(long, default_value_t = false)]
        exact: bool,
        /// Print the outcome as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Talk to the catalogue from the console, one line per message.
    Chat {
        /// Session key for the in-memory session store.
        #[arg(long, default_value = "console")]
        session: String,
    },
}

impl Cli {
    fn catalogue_options(&self) -> CatalogueOptions {
        CatalogueOptions {
            songs_dir: self.songs_dir.clone(),
            chords_dir: self.chords_dir.clone(),
            match_cutoff: self.match_cutoff,
            ..CatalogueOptions::default()
        }
    }

    fn dispatcher(&self) -> anyhow::Result<SearchDispatcher<GeminiClient>> {
        let client = GeminiClient::new(
            &self.gemini_endpoint,
            &self.gemini_model,
            self.google_api_key.clone(),
        )
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

        if !client.is_configured() {
            warn!("GOOGLE_API_KEY is not set; semantic search will report an error");
        }

        Ok(SearchDispatcher::with_options(
            client,
            DispatcherOptions {
                timeout: Duration::from_secs(self.search_timeout_secs),
            },
        ))
    }
}

fn load_catalogue(options: &CatalogueOptions) -> anyhow::Result<Catalogue> {
    let catalogue =
        Catalogue::build(options).map_err(|error| anyhow::anyhow!(error.to_string()))?;
    log_catalogue(&catalogue);
    Ok(catalogue)
}

pub(crate) fn log_catalogue(catalogue: &Catalogue) {
    if !catalogue.skipped().is_empty() {
        warn!(skipped_files = catalogue.skipped().len(), "some files were not loaded");
        for skipped in catalogue.skipped() {
            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped file");
        }
    }
    for duplicate in catalogue.duplicate_chords() {
        warn!(
            key = %duplicate.key,
            path = %duplicate.path.display(),
            kept = %duplicate.kept.display(),
            "chord sheet resolves to an already bound title"
        );
    }

    info!(
        songs = catalogue.song_count(),
        chords = catalogue.chord_count(),
        fingerprint = %catalogue.fingerprint(),
        "catalogue loaded"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "songbook boot"
    );

    let options = cli.catalogue_options();

    match &cli.command {
        Command::Index { json } => {
            let catalogue = load_catalogue(&options)?;
            let unmatched: Vec<_> = catalogue
                .chord_bindings()
                .filter(|binding| !binding.is_matched())
                .map(|binding| binding.key.clone())
                .collect();

            if *json {
                let report = json!({
                    "songs": catalogue.song_count(),
                    "chords": catalogue.chord_count(),
                    "unmatched_chords": unmatched,
                    "skipped": catalogue.skipped(),
                    "fingerprint": catalogue.fingerprint(),
                    "loaded_at": catalogue.loaded_at().to_rfc3339(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} songs, {} chord sheets ({} unmatched), {} skipped files",
                    catalogue.song_count(),
                    catalogue.chord_count(),
                    unmatched.len(),
                    catalogue.skipped().len()
                );
                println!("fingerprint: {}", catalogue.fingerprint());
                for key in unmatched {
                    println!("  unmatched chords: {key}");
                }
            }
        }
        Command::Browse { letter } => {
            let catalogue = load_catalogue(&options)?;
            match letter {
                Some(letter) => {
                    for title in catalogue.titles_starting_with(*letter) {
                        println!("{title}");
                    }
                }
                None => {
                    let letters: String = catalogue.available_letters().into_iter().collect();
                    println!("letters: {letters}");

                    let mut cursor = PaginationState::default();
                    let mut number = 1;
                    loop {
                        let page = cursor.advance(catalogue.all_titles(), cli.page_size);
                        if page.titles.is_empty() {
                            break;
                        }
                        println!("page {number}:");
                        for title in &page.titles {
                            let marker = if catalogue.has_chords(title) { " 🎸" } else { "" };
                            println!("  {title}{marker}");
                        }
                        if !page.has_next {
                            break;
                        }
                        number += 1;
                    }
                }
            }
        }
        Command::Search { query, exact, json } => {
            let catalogue = load_catalogue(&options)?;
            let dispatcher = cli.dispatcher()?;
            let mode = if *exact {
                SearchMode::Exact
            } else {
                SearchMode::Semantic
            };

            let outcome = dispatcher.search(&catalogue, query, mode).await;
            if *json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match outcome {
                    SearchOutcome::Matches(songs) => {
                        for song in songs {
                            println!("== {}", song.title);
                            println!("{}", song.lyrics);
                        }
                    }
                    SearchOutcome::NoMatches => println!("no matches"),
                    SearchOutcome::Answer(answer) => println!("{answer}"),
                    SearchOutcome::Failed(message) => {
                        return Err(anyhow::anyhow!(message));
                    }
                }
            }
        }
        Command::Chat { session } => {
            let catalogue = load_catalogue(&options)?;
            let songbook = Songbook::new(CatalogueHandle::new(catalogue), cli.dispatcher()?)
                .with_page_size(cli.page_size);
            chat::run(&songbook, &options, session).await?;
        }
    }

    Ok(())
}
