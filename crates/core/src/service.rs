use crate::catalogue::{Catalogue, CatalogueHandle};
use crate::dispatcher::SearchDispatcher;
use crate::error::NotFound;
use crate::models::{SearchMode, SearchOutcome, Song, DEFAULT_PAGE_SIZE};
use crate::pagination::PaginationState;
use crate::render::{
    main_menu, render_alphabet_keyboard, render_letter_keyboard, render_navigation, render_page,
    render_song_result, Button, Keyboard, LABEL_CHORDS, MENU_ALL_SONGS, MENU_ALPHABET,
    MENU_TOGGLE_PREFIX,
};
use crate::request::{PageAction, Request};
use crate::traits::TextCompletion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TAP_BELOW: &str = "Tap 👇:";

/// Per-session state. The transport keeps it between turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub pagination: PaginationState,
    /// Free text goes to semantic search when set, to exact search otherwise.
    pub semantic_search: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            pagination: PaginationState::default(),
            semantic_search: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Menu,
    AllSongs,
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        let name = text.trim().strip_prefix('/')?;
        // Group chats append the bot name: /menu@songbook_bot
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" => Some(Self::Start),
            "menu" => Some(Self::Menu),
            "all_songs" => Some(Self::AllSongs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    /// Replaces the message whose button was pressed.
    Edit { text: String, keyboard: Keyboard },
    Document { path: PathBuf },
    /// Persistent menu shown under the input field.
    Menu { text: String, options: Vec<String> },
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Self::Text { keyboard, .. } => keyboard.as_ref(),
            Self::Edit { keyboard, .. } => Some(keyboard),
            _ => None,
        }
    }
}

pub struct Songbook<C>
where
    C: TextCompletion,
{
    catalogue: CatalogueHandle,
    dispatcher: SearchDispatcher<C>,
    page_size: usize,
}

impl<C> Songbook<C>
where
    C: TextCompletion + Send + Sync,
{
    pub fn new(catalogue: CatalogueHandle, dispatcher: SearchDispatcher<C>) -> Self {
        Self {
            catalogue,
            dispatcher,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn catalogue(&self) -> &CatalogueHandle {
        &self.catalogue
    }

    pub async fn handle_command(&self, state: &mut SessionState, command: Command) -> Vec<Reply> {
        info!(?command, "command");
        match command {
            Command::Start => {
                state.semantic_search = true;
                vec![Reply::Menu {
                    text: "Choose an action or type a request to find a song:".to_string(),
                    options: main_menu(state.semantic_search),
                }]
            }
            Command::Menu => self.show_menu(),
            Command::AllSongs => self.show_page(state, PageAction::First),
        }
    }

    pub async fn handle_text(&self, state: &mut SessionState, text: &str) -> Vec<Reply> {
        if let Some(command) = Command::parse(text) {
            return self.handle_command(state, command).await;
        }

        let text = text.trim();
        if text == MENU_ALPHABET {
            return self.show_menu();
        }
        if text == MENU_ALL_SONGS {
            return self.show_page(state, PageAction::First);
        }
        if text.starts_with(MENU_TOGGLE_PREFIX) {
            return toggle_semantic_search(state);
        }

        let mode = if state.semantic_search {
            SearchMode::Semantic
        } else {
            SearchMode::Exact
        };
        self.search(text, mode).await
    }

    pub async fn handle_request(&self, state: &mut SessionState, request: Request) -> Vec<Reply> {
        info!(request = %request, "request");
        match request {
            Request::ShowMenu => self.show_menu(),
            Request::ShowPage(action) => self.show_page(state, action),
            Request::ShowLetter(letter) => self.show_letter(letter),
            Request::ShowSong(title) => self.show_song(&title),
            Request::ShowChords(title) => self.show_chords(&title),
            Request::ShowGuidance(title) => self.show_guidance(&title).await,
        }
    }

    /// Decodes a raw button payload first; unknown payloads are answered
    /// with a short notice.
    pub async fn handle_callback(&self, state: &mut SessionState, raw: &str) -> Vec<Reply> {
        match Request::decode(raw) {
            Ok(request) => self.handle_request(state, request).await,
            Err(error) => {
                warn!(payload = %raw, error = %error, "undecodable button payload");
                vec![Reply::with_keyboard(
                    "This button is no longer valid.",
                    render_navigation(),
                )]
            }
        }
    }

    pub async fn search(&self, query: &str, mode: SearchMode) -> Vec<Reply> {
        let catalogue = self.catalogue.snapshot();
        match self.dispatcher.search(&catalogue, query, mode).await {
            SearchOutcome::Matches(songs) => songs
                .iter()
                .flat_map(|song| deliver_song(&catalogue, song))
                .collect(),
            SearchOutcome::NoMatches => vec![Reply::with_keyboard(
                "No songs matched your request.",
                render_navigation(),
            )],
            SearchOutcome::Answer(answer) | SearchOutcome::Failed(answer) => vec![
                Reply::text(answer),
                Reply::with_keyboard(TAP_BELOW, render_navigation()),
            ],
        }
    }

    fn show_menu(&self) -> Vec<Reply> {
        let catalogue = self.catalogue.snapshot();
        let letters = catalogue.available_letters();
        if letters.is_empty() {
            return vec![Reply::text("The catalogue is empty.")];
        }
        vec![Reply::with_keyboard(
            "Choose a letter or type a song title:",
            render_alphabet_keyboard(&letters),
        )]
    }

    fn show_page(&self, state: &mut SessionState, action: PageAction) -> Vec<Reply> {
        let catalogue = self.catalogue.snapshot();
        let titles = catalogue.all_titles();
        let cursor = &mut state.pagination;

        let page = match action {
            PageAction::First => cursor.reset_and_show_first_page(titles, self.page_size),
            PageAction::Next => cursor.advance(titles, self.page_size),
            PageAction::Previous => cursor.retreat(titles, self.page_size),
        };

        if page.titles.is_empty() {
            return vec![Reply::text("The catalogue is empty.")];
        }

        let text = "Song list:".to_string();
        let keyboard = render_page(&page);
        match action {
            PageAction::First => vec![Reply::with_keyboard(text, keyboard)],
            PageAction::Next | PageAction::Previous => vec![Reply::Edit { text, keyboard }],
        }
    }

    fn show_letter(&self, letter: char) -> Vec<Reply> {
        let catalogue = self.catalogue.snapshot();
        let titles = catalogue.titles_starting_with(letter);
        if titles.is_empty() {
            return vec![Reply::with_keyboard(
                format!("No songs start with {letter}."),
                render_navigation(),
            )];
        }
        vec![Reply::Edit {
            text: format!("Songs starting with {letter}:"),
            keyboard: render_letter_keyboard(&titles),
        }]
    }

    fn show_song(&self, title: &str) -> Vec<Reply> {
        let catalogue = self.catalogue.snapshot();
        match catalogue.lookup_song(title) {
            Ok(song) => deliver_song(&catalogue, song),
            Err(missing) => not_found(missing),
        }
    }

    fn show_chords(&self, title: &str) -> Vec<Reply> {
        let catalogue = self.catalogue.snapshot();
        let mut replies = match catalogue.lookup_chord(title).and_then(existing_file) {
            Ok(path) => vec![Reply::Document { path }],
            Err(missing) => {
                warn!(title = %title, reason = %missing, "chords unavailable");
                vec![Reply::text(not_found_text(&missing))]
            }
        };
        replies.push(Reply::with_keyboard(TAP_BELOW, render_navigation()));
        replies
    }

    async fn show_guidance(&self, title: &str) -> Vec<Reply> {
        let catalogue = self.catalogue.snapshot();
        let song = match catalogue.lookup_song(title) {
            Ok(song) => song,
            Err(missing) => return not_found(missing),
        };

        let guidance = self.dispatcher.guidance(song).await;
        let mut keyboard = render_navigation();
        if catalogue.has_chords(title) {
            keyboard.rows.insert(
                0,
                vec![Button::new(LABEL_CHORDS, Request::ShowChords(title.to_string()))],
            );
        }

        vec![
            Reply::text(format!("Spiritual reflection:\n\n{}", guidance.reflection)),
            Reply::text(format!("A fitting Bible verse:\n\n{}", guidance.verse)),
            Reply::with_keyboard(TAP_BELOW, keyboard),
        ]
    }
}

fn toggle_semantic_search(state: &mut SessionState) -> Vec<Reply> {
    state.semantic_search = !state.semantic_search;
    let text = if state.semantic_search {
        "Semantic search is on. Your requests will be answered with AI."
    } else {
        "Semantic search is off. Exact text search will be used."
    };
    vec![Reply::Menu {
        text: text.to_string(),
        options: main_menu(state.semantic_search),
    }]
}

/// Lyrics, the source document, and the follow-up buttons.
fn deliver_song(catalogue: &Catalogue, song: &Song) -> Vec<Reply> {
    let mut replies = vec![Reply::text(song.lyrics.clone())];

    match existing_file(&song.source_path) {
        Ok(path) => replies.push(Reply::Document { path }),
        Err(missing) => {
            warn!(title = %song.title, reason = %missing, "song document unavailable");
            replies.push(Reply::text(not_found_text(&missing)));
        }
    }

    replies.push(Reply::with_keyboard(
        TAP_BELOW,
        render_song_result(song, catalogue.has_chords(&song.title)),
    ));
    replies
}

fn existing_file(path: &Path) -> Result<PathBuf, NotFound> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(NotFound::File(path.to_path_buf()))
    }
}

fn not_found_text(missing: &NotFound) -> String {
    match missing {
        NotFound::Song(_) => "Song not found.".to_string(),
        NotFound::Chords(_) => "Chords for this song were not found.".to_string(),
        NotFound::File(path) => {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            format!("File {name} not found.")
        }
    }
}

fn not_found(missing: NotFound) -> Vec<Reply> {
    vec![Reply::with_keyboard(not_found_text(&missing), render_navigation())]
}
